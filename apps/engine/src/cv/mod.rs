pub mod dates;
pub mod handlers;
pub mod hybrid;
pub mod models;
pub mod sanitize;
pub mod validation;

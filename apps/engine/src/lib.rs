//! Résumé structuring and one-page fitting.
//!
//! The core (`parsing`, `cv`, `layout`, `render`) is synchronous and total over string input.
//! `preview` adds the optional AI extractor and its cache; the remaining modules are the
//! HTTP service around it.

pub mod config;
pub mod cv;
pub mod errors;
pub mod layout;
pub mod llm_client;
pub mod parsing;
pub mod preview;
pub mod render;
pub mod routes;
pub mod state;

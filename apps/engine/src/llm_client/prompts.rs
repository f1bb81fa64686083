// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it and pulls the
// cross-cutting pieces from here.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise résumé analyst. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every extraction prompt.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the résumé text. Do NOT invent employers, dates, \
    degrees, figures or skills. Keep the résumé's original language. \
    Leave a field as an empty string or empty array when the text does not support it.";

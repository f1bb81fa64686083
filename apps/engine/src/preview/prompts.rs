// Prompts for the structure-preview extractor.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Structured extraction. Placeholders: {fidelity_instruction}, {job_text}, {cv_text}.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"Extract the résumé below into structured JSON.

{fidelity_instruction}

Return exactly this shape:
{
  "contact": { "fullName": "", "email": "", "phone": "", "city": "", "website": "" },
  "summary": "",
  "experiences": [
    { "title": "", "company": "", "date": "", "location": "", "bullets": [""] }
  ],
  "education": [""],
  "skills": [""],
  "languages": [""],
  "additional": [""]
}

Rules:
- "date" keeps the résumé's wording, e.g. "2020 - Present" or "03/2019 - 06/2021".
- At most 4 bullets per experience, most impactful first.
- List experiences most recent first.

Target job (context only, do not copy from it):
{job_text}

Résumé:
{cv_text}"#;

/// One-sentence summary per experience. Placeholders: {fidelity_instruction}, {job_text}, {cv_text}.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"For each professional experience in the résumé below,
most recent first, write one factual sentence (max 30 words) summarizing the mission,
angled toward the target job.

{fidelity_instruction}

Return exactly: { "summaries": ["...", "..."] }

Target job:
{job_text}

Résumé:
{cv_text}"#;

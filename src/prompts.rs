//! Prompts for language-model skill extraction.
//!
//! Kept in one place so the wording can change without touching the call or
//! parsing code, and so tests can inspect it without a live model.
//!
//! Callers can override the instruction via
//! [`crate::config::SearchConfig::system_prompt`].

/// Instruction sent as the system message of the skill-extraction call.
///
/// The reply is expected (but not guaranteed) to be a list literal of
/// snake_case strings; [`crate::pipeline::normalize`] copes with the rest.
pub const SKILL_EXTRACTION_PROMPT: &str = r#"Analyze the technical skills in the resume provided by the user.
Return ONLY a list of the top 10-12 most prominent and relevant technical skills.
Format strictly as a list of snake_case strings: ["skill_1", "skill_2", ..., "skill_12"]
Example: return "python_programming" not "Python Programming".
Do NOT add commentary or explanations."#;

/// Build the user message carrying the resume text.
pub fn skill_prompt(resume_text: &str) -> String {
    format!("Resume:\n\"\"\"\n{}\n\"\"\"", resume_text)
}

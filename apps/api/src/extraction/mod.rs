// Text extraction: resumes → structured profiles, job listings → structured requirements.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod handlers;
pub mod job_enricher;
pub mod json;
pub mod prompts;
pub mod resume_parser;

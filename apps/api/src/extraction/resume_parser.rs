//! Resume Parser — turns raw resume text into a structured profile mapping.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::extraction::json::extract_json_map;
use crate::extraction::prompts::RESUME_PARSE_PROMPT_TEMPLATE;
use crate::llm_client::prompts::NO_EXTRA_TEXT;
use crate::llm_client::{complete_within, TextCompletion};

/// Extracts a structured profile (skills, education, experience, ...) from a resume.
///
/// `extract` never fails: when the adapter is unavailable or its reply holds no
/// JSON object, the result is a degraded profile carrying the original text
/// under `raw_text` and the cause under `parsing_error`.
#[derive(Clone)]
pub struct ResumeExtractor {
    llm: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl ResumeExtractor {
    pub fn new(llm: Arc<dyn TextCompletion>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn extract(&self, resume_text: &str) -> Map<String, Value> {
        let prompt = RESUME_PARSE_PROMPT_TEMPLATE
            .replace("{no_extra_text}", NO_EXTRA_TEXT)
            .replace("{resume_text}", resume_text);

        let reply = match complete_within(self.llm.as_ref(), &prompt, self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Resume extraction failed, keeping raw text: {e}");
                return degraded_profile(resume_text, &e.to_string());
            }
        };

        let profile = extract_json_map(&reply);
        if profile.is_empty() {
            warn!("Resume extraction returned no JSON object, keeping raw text");
            return degraded_profile(resume_text, "LLM response contained no JSON object");
        }

        debug!("Extracted resume profile with {} fields", profile.len());
        profile
    }
}

fn degraded_profile(resume_text: &str, cause: &str) -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("raw_text".into(), Value::String(resume_text.to_string()));
    profile.insert("parsing_error".into(), Value::String(cause.to_string()));
    profile
}

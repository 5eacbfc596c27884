//! Job Enricher — extracts structured requirements from a job listing.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::extraction::json::extract_json_map;
use crate::extraction::prompts::JOB_ENRICH_PROMPT_TEMPLATE;
use crate::llm_client::prompts::NO_EXTRA_TEXT;
use crate::llm_client::{complete_within, TextCompletion};

/// The parts of a job record the enricher reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub description: String,
    /// Skills supplied by whoever posted the job. Kept as the fallback.
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Produces structured requirements (required skills, seniority, ...) for a job.
///
/// Never fails. On adapter failure the result is
/// `{ "skills": <listing skills>, "error": <cause> }`.
#[derive(Clone)]
pub struct JobEnricher {
    llm: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl JobEnricher {
    pub fn new(llm: Arc<dyn TextCompletion>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn enrich(&self, listing: &JobListing) -> Map<String, Value> {
        let prompt = JOB_ENRICH_PROMPT_TEMPLATE
            .replace("{no_extra_text}", NO_EXTRA_TEXT)
            .replace("{title}", &listing.title)
            .replace("{company}", &listing.company)
            .replace("{description}", &listing.description);

        let reply = match complete_within(self.llm.as_ref(), &prompt, self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Job enrichment failed for '{}': {e}", listing.title);
                return basic_requirements(listing, &format!("Failed to process with AI: {e}"));
            }
        };

        let requirements = extract_json_map(&reply);
        if requirements.is_empty() {
            warn!("Job enrichment for '{}' returned no JSON object", listing.title);
            return basic_requirements(listing, "Failed to process with AI: no JSON object in response");
        }

        debug!(
            "Enriched job '{}' with {} fields",
            listing.title,
            requirements.len()
        );
        requirements
    }
}

fn basic_requirements(listing: &JobListing, cause: &str) -> Map<String, Value> {
    let skills = listing
        .skills
        .iter()
        .map(|s| Value::String(s.clone()))
        .collect();
    let mut requirements = Map::new();
    requirements.insert("skills".into(), Value::Array(skills));
    requirements.insert("error".into(), Value::String(cause.to_string()));
    requirements
}

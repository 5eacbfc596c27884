//! Score Calculator — asks the adapter for a compatibility assessment and
//! falls back to a neutral result whenever that answer cannot be trusted.
//!
//! Fallback triggers:
//! - adapter error or timeout
//! - `match_score` missing, non-numeric, non-finite or outside [0, 1]
//!
//! The fallback is always score 0.5 with details `{match_score: 0.5, error}`,
//! so a missing answer neither fails the request nor moves a candidate up or
//! down a ranking.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::extraction::json::extract_json_map;
use crate::llm_client::prompts::NO_EXTRA_TEXT;
use crate::llm_client::{complete_within, TextCompletion};
use crate::scoring::prompts::MATCH_SCORE_PROMPT_TEMPLATE;

/// Neutral score used whenever the adapter's answer is unavailable.
pub const FALLBACK_SCORE: f64 = 0.5;

/// Score plus the details mapping it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub details: Map<String, Value>,
    pub is_fallback: bool,
}

impl Assessment {
    fn fallback(cause: String) -> Self {
        let mut details = Map::new();
        details.insert("match_score".into(), Value::from(FALLBACK_SCORE));
        details.insert("error".into(), Value::String(cause));
        Self {
            score: FALLBACK_SCORE,
            details,
            is_fallback: true,
        }
    }
}

#[derive(Clone)]
pub struct ScoreCalculator {
    llm: Arc<dyn TextCompletion>,
    timeout: Duration,
}

impl ScoreCalculator {
    pub fn new(llm: Arc<dyn TextCompletion>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// One adapter round-trip producing both the score and the details.
    pub async fn assess(
        &self,
        profile: &Map<String, Value>,
        requirements: &Map<String, Value>,
    ) -> Assessment {
        let prompt = MATCH_SCORE_PROMPT_TEMPLATE
            .replace("{no_extra_text}", NO_EXTRA_TEXT)
            .replace("{candidate_json}", &Value::Object(profile.clone()).to_string())
            .replace("{job_json}", &Value::Object(requirements.clone()).to_string());

        let reply = match complete_within(self.llm.as_ref(), &prompt, self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Match scoring failed, using neutral score: {e}");
                return Assessment::fallback(format!("Failed to generate match details: {e}"));
            }
        };

        let mut details = extract_json_map(&reply);
        let score = match coerce_score(details.get("match_score")) {
            Ok(score) => score,
            Err(cause) => {
                warn!("Match scoring reply rejected, using neutral score: {cause}");
                return Assessment::fallback(cause);
            }
        };

        details.insert("match_score".into(), Value::from(score));
        debug!("Match scored at {score:.3}");

        Assessment {
            score,
            details,
            is_fallback: false,
        }
    }

    pub async fn compute_score(
        &self,
        profile: &Map<String, Value>,
        requirements: &Map<String, Value>,
    ) -> f64 {
        self.assess(profile, requirements).await.score
    }

    pub async fn compute_details(
        &self,
        profile: &Map<String, Value>,
        requirements: &Map<String, Value>,
    ) -> Map<String, Value> {
        self.assess(profile, requirements).await.details
    }
}

/// Reads `match_score` as a float in [0, 1]. Numeric strings are accepted.
fn coerce_score(value: Option<&Value>) -> Result<f64, String> {
    let score = match value {
        None => return Err("LLM response has no match_score".to_string()),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match score {
        Some(s) if s.is_finite() && (0.0..=1.0).contains(&s) => Ok(s),
        Some(s) => Err(format!("match_score {s} is outside [0, 1]")),
        None => Err(format!(
            "match_score is not numeric: {}",
            value.map(Value::to_string).unwrap_or_default()
        )),
    }
}

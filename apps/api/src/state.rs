use std::sync::Arc;
use std::time::Duration;

use crate::directory::{CandidateStore, JobStore};
use crate::extraction::job_enricher::JobEnricher;
use crate::extraction::resume_parser::ResumeExtractor;
use crate::llm_client::TextCompletion;
use crate::matching::engine::MatchEngine;
use crate::matching::store::MatchStore;
use crate::scoring::ScoreCalculator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchEngine,
    pub resume_extractor: ResumeExtractor,
    pub job_enricher: JobEnricher,
}

impl AppState {
    /// Wires every component to the same completion adapter and call timeout.
    pub fn new(
        llm: Arc<dyn TextCompletion>,
        llm_timeout: Duration,
        matches: Arc<dyn MatchStore>,
        candidates: Arc<dyn CandidateStore>,
        jobs: Arc<dyn JobStore>,
    ) -> Self {
        let scorer = ScoreCalculator::new(llm.clone(), llm_timeout);
        Self {
            engine: MatchEngine::new(matches, candidates, jobs, scorer),
            resume_extractor: ResumeExtractor::new(llm.clone(), llm_timeout),
            job_enricher: JobEnricher::new(llm, llm_timeout),
        }
    }
}

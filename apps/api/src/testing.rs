//! In-memory collaborators for unit and router tests.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::directory::{CandidateRecord, CandidateStore, JobRecord, JobStore};
use crate::errors::AppError;
use crate::llm_client::{LlmError, TextCompletion};
use crate::matching::engine::MatchEngine;
use crate::matching::models::{Match, MatchUpdate, NewMatch, DEFAULT_STATUS};
use crate::matching::store::MatchStore;
use crate::scoring::ScoreCalculator;

enum Script {
    Reply(String),
    Unreachable,
    Hang,
}

/// Completion adapter that plays back one fixed behavior and records prompts.
pub struct ScriptedCompletion {
    script: Script,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    fn new(script: Script) -> Self {
        Self {
            script,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    /// Behaves like an upstream outage (HTTP 503).
    pub fn unreachable() -> Self {
        Self::new(Script::Unreachable)
    }

    /// Never answers.
    pub fn hang() -> Self {
        Self::new(Script::Hang)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Unreachable => Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            }),
            Script::Hang => std::future::pending().await,
        }
    }
}

/// Same order as the SQL `ORDER BY score DESC, id ASC`.
pub fn rank_order(a: &Match, b: &Match) -> Ordering {
    b.score.total_cmp(&a.score).then(a.id.cmp(&b.id))
}

#[derive(Default)]
struct MatchTable {
    next_id: i64,
    rows: BTreeMap<i64, Match>,
}

/// Match store backed by a mutex-guarded map. The pair check and the insert
/// happen under one lock, mirroring the database's unique constraint.
#[derive(Default)]
pub struct InMemoryMatchStore {
    table: Mutex<MatchTable>,
}

impl InMemoryMatchStore {
    fn ranked<F>(&self, keep: F) -> Vec<Match>
    where
        F: Fn(&Match) -> bool,
    {
        let table = self.table.lock().unwrap();
        let mut found: Vec<Match> = table.rows.values().filter(|m| keep(m)).cloned().collect();
        found.sort_by(rank_order);
        found
    }

    fn by_id<F>(&self, keep: F) -> Vec<Match>
    where
        F: Fn(&Match) -> bool,
    {
        let table = self.table.lock().unwrap();
        table.rows.values().filter(|m| keep(m)).cloned().collect()
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn create(&self, new_match: NewMatch) -> Result<Match, AppError> {
        let mut table = self.table.lock().unwrap();
        let taken = table
            .rows
            .values()
            .any(|m| m.candidate_id == new_match.candidate_id && m.job_id == new_match.job_id);
        if taken {
            return Err(AppError::Conflict(format!(
                "Match already exists between candidate {} and job {}",
                new_match.candidate_id, new_match.job_id
            )));
        }

        table.next_id += 1;
        let now = Utc::now();
        let created = Match {
            id: table.next_id,
            candidate_id: new_match.candidate_id,
            job_id: new_match.job_id,
            score: new_match.score,
            details: new_match.details,
            feedback: new_match.feedback,
            status: new_match.status,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Match>, AppError> {
        Ok(self.table.lock().unwrap().rows.get(&id).cloned())
    }

    async fn update(&self, id: i64, update: &MatchUpdate) -> Result<Match, AppError> {
        let mut table = self.table.lock().unwrap();
        let existing = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))?;
        update.merge_into(existing, Utc::now());
        Ok(existing.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.table
            .lock()
            .unwrap()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))
    }

    async fn list_all(&self) -> Result<Vec<Match>, AppError> {
        Ok(self.by_id(|_| true))
    }

    async fn find_by_candidate(&self, candidate_id: i64) -> Result<Vec<Match>, AppError> {
        Ok(self.by_id(|m| m.candidate_id == candidate_id))
    }

    async fn find_by_job(&self, job_id: i64) -> Result<Vec<Match>, AppError> {
        Ok(self.by_id(|m| m.job_id == job_id))
    }

    async fn find_by_pair(
        &self,
        candidate_id: i64,
        job_id: i64,
    ) -> Result<Option<Match>, AppError> {
        Ok(self
            .by_id(|m| m.candidate_id == candidate_id && m.job_id == job_id)
            .into_iter()
            .next())
    }

    async fn find_by_min_score(&self, threshold: f64) -> Result<Vec<Match>, AppError> {
        Ok(self.ranked(|m| m.score >= threshold))
    }

    async fn list_top_for_candidate(
        &self,
        candidate_id: i64,
        limit: u32,
    ) -> Result<Vec<Match>, AppError> {
        let mut ranked = self.ranked(|m| m.candidate_id == candidate_id);
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn list_top_for_job(&self, job_id: i64, limit: u32) -> Result<Vec<Match>, AppError> {
        let mut ranked = self.ranked(|m| m.job_id == job_id);
        ranked.truncate(limit as usize);
        Ok(ranked)
    }
}

/// Candidates and jobs keyed by id.
#[derive(Default)]
pub struct InMemoryDirectory {
    candidates: HashMap<i64, CandidateRecord>,
    jobs: HashMap<i64, JobRecord>,
}

impl InMemoryDirectory {
    pub fn with_candidate(mut self, id: i64, profile: Option<Value>) -> Self {
        self.candidates.insert(
            id,
            CandidateRecord {
                id,
                structured_profile: profile.and_then(object),
            },
        );
        self
    }

    pub fn with_job(mut self, id: i64, requirements: Option<Value>) -> Self {
        self.jobs.insert(
            id,
            JobRecord {
                id,
                structured_requirements: requirements.and_then(object),
            },
        );
        self
    }
}

#[async_trait]
impl CandidateStore for InMemoryDirectory {
    async fn get_by_id(&self, id: i64) -> Result<Option<CandidateRecord>, AppError> {
        Ok(self.candidates.get(&id).cloned())
    }
}

#[async_trait]
impl JobStore for InMemoryDirectory {
    async fn get_by_id(&self, id: i64) -> Result<Option<JobRecord>, AppError> {
        Ok(self.jobs.get(&id).cloned())
    }
}

fn object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// A `NewMatch` with empty details and the default status.
pub fn new_match(candidate_id: i64, job_id: i64, score: f64) -> NewMatch {
    NewMatch {
        candidate_id,
        job_id,
        score,
        details: Map::new(),
        feedback: None,
        status: DEFAULT_STATUS.to_string(),
    }
}

/// Engine wired to in-memory stores and the given adapter.
pub fn engine_with(
    directory: InMemoryDirectory,
    llm: ScriptedCompletion,
) -> (MatchEngine, Arc<InMemoryMatchStore>) {
    let matches = Arc::new(InMemoryMatchStore::default());
    let directory = Arc::new(directory);
    let engine = MatchEngine::new(
        matches.clone(),
        directory.clone(),
        directory,
        ScoreCalculator::new(Arc::new(llm), Duration::from_secs(5)),
    );
    (engine, matches)
}

//! Read-only access to candidate and job records.
//!
//! Candidates and jobs are owned by the CRUD service; the matching engine only
//! needs to know that a record exists and what structured data it carries.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub id: i64,
    pub structured_profile: Option<Map<String, Value>>,
}

impl CandidateRecord {
    /// Structured profile, or an empty mapping when the resume was never parsed.
    pub fn profile(&self) -> Map<String, Value> {
        self.structured_profile.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: i64,
    pub structured_requirements: Option<Map<String, Value>>,
}

impl JobRecord {
    /// Structured requirements, or an empty mapping when the job was never enriched.
    pub fn requirements(&self) -> Map<String, Value> {
        self.structured_requirements.clone().unwrap_or_default()
    }
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<CandidateRecord>, AppError>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<JobRecord>, AppError>;
}

/// Postgres-backed lookups against the `candidates` and `jobs` tables.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgDirectory {
    async fn get_by_id(&self, id: i64) -> Result<Option<CandidateRecord>, AppError> {
        let row: Option<(i64, Option<Value>)> =
            sqlx::query_as("SELECT id, structured_profile FROM candidates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, profile)| CandidateRecord {
            id,
            structured_profile: profile.and_then(into_object),
        }))
    }
}

#[async_trait]
impl JobStore for PgDirectory {
    async fn get_by_id(&self, id: i64) -> Result<Option<JobRecord>, AppError> {
        let row: Option<(i64, Option<Value>)> =
            sqlx::query_as("SELECT id, structured_requirements FROM jobs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, requirements)| JobRecord {
            id,
            structured_requirements: requirements.and_then(into_object),
        }))
    }
}

/// JSONB columns are written by another service; anything but an object is
/// treated as absent.
fn into_object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

//! Shared helpers for router tests: an in-memory store implementing every
//! repository trait, and request plumbing around `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use metier_api::{build_router, AppState};
use metier_core::{
    AutomationScore, CreateSimulationRequest, Error, Horizon, NewOccupation, NewTask, Occupation,
    OccupationRepository, Result, ScoreRepository, ScoreSource, SimulationRepository, Task,
    TaskKind, TaskRepository, TaskWithScore, UpsertScoreRequest, UserSimulation,
};

#[derive(Default)]
struct Tables {
    occupations: Vec<Occupation>,
    tasks: Vec<Task>,
    scores: Vec<AutomationScore>,
    simulations: Vec<UserSimulation>,
}

/// In-memory stand-in for the PostgreSQL repositories.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_score_writes: AtomicBool,
    fail_task_inserts: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_occupation(&self, code: &str, title: &str, slug: Option<&str>, sector: Option<&str>) {
        let now = Utc::now();
        self.tables.lock().unwrap().occupations.push(Occupation {
            code: code.to_string(),
            title: title.to_string(),
            sector: sector.map(String::from),
            description: None,
            slug: slug.map(String::from),
            created_at_utc: now,
            updated_at_utc: now,
        });
    }

    /// Add a task and return its id.
    pub fn add_task(&self, occupation_code: &str, label: &str) -> i64 {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.tasks.len() as i64 + 1;
        tables.tasks.push(Task {
            id,
            occupation_code: occupation_code.to_string(),
            label: label.to_string(),
            description: None,
            kind: None,
        });
        id
    }

    /// Store a `now` score for a task.
    pub fn set_score(&self, task_id: i64, score_pct: f64, analysis: Option<&str>) {
        let mut tables = self.tables.lock().unwrap();
        tables
            .scores
            .retain(|s| !(s.task_id == task_id && s.horizon == Horizon::Now));
        tables.scores.push(AutomationScore {
            task_id,
            horizon: Horizon::Now,
            score_pct,
            source: if analysis.is_some() {
                ScoreSource::AiCalculated
            } else {
                ScoreSource::Default
            },
            analysis: analysis.map(String::from),
            reasoning: None,
            updated_at_utc: Utc::now(),
        });
    }

    pub fn score(&self, task_id: i64) -> Option<AutomationScore> {
        self.tables
            .lock()
            .unwrap()
            .scores
            .iter()
            .find(|s| s.task_id == task_id && s.horizon == Horizon::Now)
            .cloned()
    }

    pub fn scores(&self) -> Vec<AutomationScore> {
        self.tables.lock().unwrap().scores.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tables.lock().unwrap().tasks.clone()
    }

    pub fn occupations(&self) -> Vec<Occupation> {
        self.tables.lock().unwrap().occupations.clone()
    }

    pub fn simulations(&self) -> Vec<UserSimulation> {
        self.tables.lock().unwrap().simulations.clone()
    }

    pub fn fail_score_writes(&self) {
        self.fail_score_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_task_inserts(&self) {
        self.fail_task_inserts.store(true, Ordering::SeqCst);
    }

    fn join(tables: &Tables, codes: &HashSet<&str>, horizon: Horizon) -> Vec<TaskWithScore> {
        let mut rows: Vec<TaskWithScore> = tables
            .tasks
            .iter()
            .filter(|t| codes.contains(t.occupation_code.as_str()))
            .map(|t| TaskWithScore {
                task: t.clone(),
                score: tables
                    .scores
                    .iter()
                    .find(|s| s.task_id == t.id && s.horizon == horizon)
                    .cloned(),
            })
            .collect();
        rows.sort_by_key(|r| r.task.id);
        rows
    }
}

#[async_trait]
impl OccupationRepository for InMemoryStore {
    async fn get(&self, code: &str) -> Result<Option<Occupation>> {
        Ok(self.occupations().into_iter().find(|o| o.code == code))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Occupation>> {
        Ok(self
            .occupations()
            .into_iter()
            .find(|o| o.slug.as_deref() == Some(slug)))
    }

    async fn list(&self) -> Result<Vec<Occupation>> {
        let mut all = self.occupations();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(all)
    }

    async fn upsert_batch(&self, occupations: &[NewOccupation]) -> Result<usize> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        for new in occupations {
            let slug = new.slug.as_ref().map(|s| s.trim().to_lowercase());
            match tables.occupations.iter_mut().find(|o| o.code == new.code) {
                Some(existing) => {
                    existing.title = new.title.clone();
                    existing.sector = new.sector.clone();
                    existing.description = new.description.clone();
                    if slug.is_some() {
                        existing.slug = slug;
                    }
                    existing.updated_at_utc = now;
                }
                None => tables.occupations.push(Occupation {
                    code: new.code.clone(),
                    title: new.title.clone(),
                    sector: new.sector.clone(),
                    description: new.description.clone(),
                    slug,
                    created_at_utc: now,
                    updated_at_utc: now,
                }),
            }
        }
        Ok(occupations.len())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn list_with_scores(
        &self,
        occupation_code: &str,
        horizon: Horizon,
    ) -> Result<Vec<TaskWithScore>> {
        let tables = self.tables.lock().unwrap();
        Ok(Self::join(&tables, &HashSet::from([occupation_code]), horizon))
    }

    async fn list_with_scores_for(
        &self,
        occupation_codes: &[String],
        horizon: Horizon,
    ) -> Result<Vec<TaskWithScore>> {
        let tables = self.tables.lock().unwrap();
        let codes: HashSet<&str> = occupation_codes.iter().map(String::as_str).collect();
        Ok(Self::join(&tables, &codes, horizon))
    }

    async fn insert_batch(&self, tasks: &[NewTask]) -> Result<Vec<Task>> {
        if self.fail_task_inserts.load(Ordering::SeqCst) {
            return Err(Error::Internal("task insert failed".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        let mut inserted = Vec::new();
        for new in tasks {
            let known_occupation = tables.occupations.iter().any(|o| o.code == new.occupation_code);
            if !known_occupation {
                return Err(Error::Internal(format!(
                    "foreign key violation: {}",
                    new.occupation_code
                )));
            }
            let duplicate = tables
                .tasks
                .iter()
                .any(|t| t.occupation_code == new.occupation_code && t.label == new.label);
            if duplicate {
                continue;
            }
            let task = Task {
                id: tables.tasks.len() as i64 + 1,
                occupation_code: new.occupation_code.clone(),
                label: new.label.clone(),
                description: new.description.clone(),
                kind: new.kind,
            };
            tables.tasks.push(task.clone());
            inserted.push(task);
        }
        Ok(inserted)
    }

    async fn list_all(&self) -> Result<Vec<Task>> {
        Ok(self.tasks())
    }

    async fn update_kinds(&self, kinds: &[(i64, TaskKind)]) -> Result<usize> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = 0;
        for (id, kind) in kinds {
            if let Some(task) = tables.tasks.iter_mut().find(|t| t.id == *id) {
                task.kind = Some(*kind);
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl ScoreRepository for InMemoryStore {
    async fn upsert_many(&self, scores: &[UpsertScoreRequest]) -> Result<()> {
        if self.fail_score_writes.load(Ordering::SeqCst) {
            return Err(Error::Internal("score write failed".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        for s in scores {
            tables
                .scores
                .retain(|row| !(row.task_id == s.task_id && row.horizon == s.horizon));
            tables.scores.push(AutomationScore {
                task_id: s.task_id,
                horizon: s.horizon,
                score_pct: s.score_pct,
                source: s.source,
                analysis: s.analysis.clone(),
                reasoning: s.reasoning.clone(),
                updated_at_utc: Utc::now(),
            });
        }
        Ok(())
    }

    async fn insert_defaults(&self, scores: &[UpsertScoreRequest]) -> Result<usize> {
        let mut tables = self.tables.lock().unwrap();
        let mut inserted = 0;
        for s in scores {
            let exists = tables
                .scores
                .iter()
                .any(|row| row.task_id == s.task_id && row.horizon == s.horizon);
            if exists {
                continue;
            }
            tables.scores.push(AutomationScore {
                task_id: s.task_id,
                horizon: s.horizon,
                score_pct: s.score_pct,
                source: s.source,
                analysis: s.analysis.clone(),
                reasoning: s.reasoning.clone(),
                updated_at_utc: Utc::now(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }
}

#[async_trait]
impl SimulationRepository for InMemoryStore {
    async fn insert(&self, req: CreateSimulationRequest) -> Result<UserSimulation> {
        let mut tables = self.tables.lock().unwrap();
        let saved = UserSimulation {
            id: tables.simulations.len() as i64 + 1,
            occupation_code: req.occupation_code,
            time_allocation: req.time_allocation,
            global_score: req.global_score,
            created_at_utc: Utc::now(),
        };
        tables.simulations.push(saved.clone());
        Ok(saved)
    }
}

/// State over `store` with no analyzer, admin token, or rate limit.
pub fn state(store: &Arc<InMemoryStore>) -> AppState {
    AppState::new(store.clone(), store.clone(), store.clone(), store.clone())
}

pub fn app(state: AppState) -> Router {
    build_router(state, Vec::new())
}

/// Send a request and decode the JSON body (Null when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_with_token(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

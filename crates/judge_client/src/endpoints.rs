use std::sync::Arc;

use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

use crate::api::{ApiProducer, ReqwestApi};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    #[serde(default)]
    pub memory_limit_mb: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub problems: Vec<ProblemSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumThread {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub reply_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub language: String,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Producers for the judge service's read endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    api: Arc<ReqwestApi>,
}

impl Endpoints {
    pub fn new(api: Arc<ReqwestApi>) -> Self {
        Self { api }
    }

    pub fn problems(&self) -> ApiProducer<Vec<ProblemSummary>> {
        ApiProducer::new(self.api.clone(), "problems")
    }

    pub fn problem(&self, id: &str) -> ApiProducer<Problem> {
        ApiProducer::new(self.api.clone(), format!("problems/{}", encode(id)))
    }

    pub fn submissions(&self, problem_id: &str) -> ApiProducer<Vec<Submission>> {
        ApiProducer::new(
            self.api.clone(),
            format!("problems/{}/submissions", encode(problem_id)),
        )
    }

    pub fn contests(&self) -> ApiProducer<Vec<ContestSummary>> {
        ApiProducer::new(self.api.clone(), "contests")
    }

    pub fn contest(&self, id: &str) -> ApiProducer<Contest> {
        ApiProducer::new(self.api.clone(), format!("contests/{}", encode(id)))
    }

    pub fn forum_threads(&self, category: Option<&str>) -> ApiProducer<Vec<ForumThread>> {
        let path = match category {
            Some(category) => format!("forum/threads?category={}", encode(category)),
            None => "forum/threads".to_string(),
        };
        ApiProducer::new(self.api.clone(), path)
    }
}

fn encode(segment: &str) -> String {
    byte_serialize(segment.as_bytes()).collect()
}

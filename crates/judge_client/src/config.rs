use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use judge_core::{BreadcrumbResolver, RouteEntry, RouteTable, RouteTableError, DEFAULT_HOME_TITLE};
use judge_logging::judge_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteTableError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub breadcrumbs: BreadcrumbConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreadcrumbConfig {
    pub base_path: String,
    pub home_title: String,
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub pattern: String,
    pub title: String,
    #[serde(default)]
    pub parent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let settings = ApiSettings::default();
        Self {
            base_url: settings.base_url,
            connect_timeout_ms: millis(settings.connect_timeout),
            request_timeout_ms: millis(settings.request_timeout),
            max_bytes: settings.max_bytes,
        }
    }
}

impl Default for BreadcrumbConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            home_title: DEFAULT_HOME_TITLE.to_string(),
            routes: default_routes(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            breadcrumbs: BreadcrumbConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        judge_info!(
            "Loaded client config from {:?} ({} routes)",
            path,
            config.breadcrumbs.routes.len()
        );
        Ok(config)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api.base_url.clone(),
            connect_timeout: Duration::from_millis(self.api.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.api.request_timeout_ms),
            max_bytes: self.api.max_bytes,
        }
    }

    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        let entries = self
            .breadcrumbs
            .routes
            .iter()
            .map(|route| {
                let entry = RouteEntry::new(&route.pattern, route.title.clone())?;
                match route.parent.as_deref() {
                    Some(parent) => entry.with_parent(parent),
                    None => Ok(entry),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTable::new(entries)?)
    }

    pub fn resolver(&self) -> Result<BreadcrumbResolver, ConfigError> {
        Ok(BreadcrumbResolver::new(self.route_table()?)
            .with_home_title(self.breadcrumbs.home_title.clone())
            .with_base_path(self.breadcrumbs.base_path.clone()))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn route(pattern: &str, title: &str, parent: Option<&str>) -> RouteConfig {
    RouteConfig {
        pattern: pattern.to_string(),
        title: title.to_string(),
        parent: parent.map(ToOwned::to_owned),
    }
}

/// Routes of the judge front end.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        route("/problems", "Problems", None),
        route("/problems/new", "New Problem", Some("/problems")),
        route("/problems/:id", "Problem Detail", Some("/problems")),
        route("/problems/:id/submissions", "Submissions", Some("/problems/:id")),
        route("/problems/:id/edit", "Edit Problem", Some("/problems/:id")),
        route("/contests", "Contests", None),
        route("/contests/:id", "Contest Detail", Some("/contests")),
        route("/contests/:id/problems", "Contest Problems", Some("/contests/:id")),
        route("/contests/:id/leaderboard", "Leaderboard", Some("/contests/:id")),
        route("/submissions", "Submissions", None),
        route("/submissions/:id", "Submission Detail", Some("/submissions")),
        route("/forum", "Forum", None),
        route("/forum/new", "New Thread", Some("/forum")),
        route("/forum/:slug", "Category", Some("/forum")),
        route("/forum/:slug/:id", "Thread", Some("/forum/:slug")),
        route("/profile", "Profile", None),
        route("/admin", "Admin", None),
    ]
}

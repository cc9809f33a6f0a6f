//! Judge client: async resource driver, REST producers, shared breadcrumb
//! overrides and configuration.
mod api;
mod config;
mod endpoints;
mod overrides;
mod producer;
mod resource;

pub use api::{ApiError, ApiProducer, ApiSettings, ReqwestApi};
pub use config::{
    default_routes, ApiConfig, BreadcrumbConfig, ClientConfig, ConfigError, RouteConfig,
};
pub use endpoints::{
    Contest, ContestSummary, Endpoints, ForumThread, Problem, ProblemSummary, Submission,
};
pub use overrides::{SharedOverrides, TitleRegistration};
pub use producer::{FnProducer, Producer};
pub use resource::{AsyncResource, ChannelStateSink, NullStateSink, ResourceBuilder, StateSink};

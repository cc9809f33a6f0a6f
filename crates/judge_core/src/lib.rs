//! Judge client core: pure resource state machine, failure normalization and
//! breadcrumb derivation.
mod breadcrumb;
mod deps;
mod effect;
mod failure;
mod msg;
mod overrides;
mod routes;
mod state;
mod update;
mod view_model;

pub use breadcrumb::{generated_title, BreadcrumbResolver, DEFAULT_HOME_TITLE};
pub use deps::{DepValue, DependencyKey};
pub use effect::ResourceEffect;
pub use failure::{FailureResponse, ProducerFailure, GENERIC_FAILURE_MESSAGE};
pub use msg::ResourceMsg;
pub use overrides::OverrideRegistry;
pub use routes::{
    canonical_path, is_hex_id, is_slug, PatternSegment, RouteEntry, RoutePattern, RouteTable,
    RouteTableError,
};
pub use state::{Generation, Phase, ResourceState};
pub use update::update_resource;
pub use view_model::{BreadcrumbItem, ResourceView};

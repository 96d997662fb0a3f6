// === PUBLIC CONTRACT ===
// Wire model and catalogs shared with every front end
pub mod contract;

pub use contract::{catalog, model};

// === MODULE WIRING ===
pub mod module;
pub use module::{build_service, build_service_with_sessions};

pub use config::ProfileSyncConfig;
pub use domain::editor::{MountOutcome, ProfileEditor};
pub use domain::error::DomainError;
pub use domain::service::{Service, ServiceConfig};

// === INTERNAL MODULES ===
// Exposed for integration tests and the CLI; only `contract` is a stable API.
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use url::Url;

use crate::config::ProfileSyncConfig;
use crate::domain::ports::SessionStore;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::http::{HttpProfileRemote, TracedClient};
use crate::infra::session::FileSessionStore;

/// Wire the REST adapter and the file session cache into a domain service.
pub fn build_service(config: &ProfileSyncConfig, home_dir: &Path) -> anyhow::Result<Service> {
    let session_path = session_path(config, home_dir);
    build_service_with_sessions(config, Arc::new(FileSessionStore::new(session_path)))
}

/// Same as [`build_service`] but with a caller-provided session cache.
pub fn build_service_with_sessions(
    config: &ProfileSyncConfig,
    sessions: Arc<dyn SessionStore>,
) -> anyhow::Result<Service> {
    info!("Initializing profile_sync");
    debug!(
        "Loaded profile_sync config: api_base_url={}, request_timeout={:?}",
        config.api_base_url, config.request_timeout
    );

    let base = Url::parse(&config.api_base_url)
        .with_context(|| format!("invalid api_base_url '{}'", config.api_base_url))?;
    if base.cannot_be_a_base() {
        anyhow::bail!("api_base_url '{}' cannot be used as a base URL", base);
    }

    let client =
        TracedClient::with_timeout(config.request_timeout).context("failed to build HTTP client")?;

    let remote = HttpProfileRemote::new(client, base);
    let service_config = ServiceConfig {
        default_rating: config.default_rating,
    };
    Ok(Service::new(Arc::new(remote), sessions, service_config))
}

/// Session file location; relative paths resolve against the app home dir.
pub fn session_path(config: &ProfileSyncConfig, home_dir: &Path) -> PathBuf {
    let p = PathBuf::from(&config.session_file);
    if p.is_absolute() {
        p
    } else {
        home_dir.join(p)
    }
}

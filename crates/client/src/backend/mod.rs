//! The client's side of the backend: the remote store, the process-wide app
//! registry, the context provider and the live-query hooks built on them.

pub mod actions;
pub mod hooks;
pub mod provider;
pub mod remote;


use std::sync::{Arc, OnceLock};

use ltdk_shared::{AppRegistry, BackendConfig, ConfigError, Connection, DocumentStore};

use crate::api_client::ApiClient;

pub use actions::submit_action;
pub use hooks::{use_collection, use_doc};
pub use provider::{use_connection, BackendHandle, BackendProvider};
pub use remote::RemoteStore;

static REGISTRY: OnceLock<AppRegistry> = OnceLock::new();

/// Registry shared by every provider in the process.
pub fn registry() -> &'static AppRegistry {
    REGISTRY.get_or_init(|| {
        AppRegistry::new(|config| {
            let api = ApiClient::for_current_origin();
            crate::log_info!("connecting project {} to {}", config.project_id, api.base_url());
            Arc::new(RemoteStore::connect(api)) as Arc<dyn DocumentStore>
        })
    })
}

/// Backend configuration compiled into the client. Unset values fall back to
/// the local development project.
pub fn client_config() -> BackendConfig {
    let local = BackendConfig::local("ltdk-maradi");
    let pick = |compiled: Option<&str>, fallback: String| compiled.map(str::to_string).unwrap_or(fallback);
    BackendConfig {
        api_key: pick(option_env!("LTDK_API_KEY"), local.api_key),
        app_id: pick(option_env!("LTDK_APP_ID"), local.app_id),
        project_id: pick(option_env!("LTDK_PROJECT_ID"), local.project_id),
        auth_domain: pick(option_env!("LTDK_AUTH_DOMAIN"), local.auth_domain),
        storage_bucket: pick(option_env!("LTDK_STORAGE_BUCKET"), local.storage_bucket),
        messaging_sender_id: pick(option_env!("LTDK_MESSAGING_SENDER_ID"), local.messaging_sender_id),
    }
}

/// Connect with the compiled-in configuration. Repeated calls share one app.
pub fn initialize() -> Result<Connection, ConfigError> {
    registry().initialize(&client_config())
}

//! Process-wide backend connection.
//!
//! An [`AppRegistry`] turns a [`BackendConfig`] into a [`Connection`] once per
//! distinct configuration. Every service on a connection is bound to the same
//! [`App`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::ConfigError;
use crate::store::DocumentStore;

pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

/// A registered backend application.
#[derive(Debug)]
pub struct App {
    name: String,
    options: BackendConfig,
    fingerprint: String,
}

impl App {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &BackendConfig {
        &self.options
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Authentication service of an app.
#[derive(Debug, Clone)]
pub struct Auth {
    app: Arc<App>,
    current_user: Arc<RwLock<Option<AuthUser>>>,
}

impl Auth {
    fn new(app: Arc<App>) -> Self {
        Self {
            app,
            current_user: Arc::new(RwLock::new(None)),
        }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.current_user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sign_in(&self, user: AuthUser) {
        tracing::info!(uid = %user.uid, "signed in");
        *self
            .current_user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) {
        self.current_user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}

/// Document store service of an app.
#[derive(Clone)]
pub struct Database {
    app: Arc<App>,
    store: Arc<dyn DocumentStore>,
}

impl Database {
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}

/// The shared handle every consumer works through. Cheap to clone.
#[derive(Clone)]
pub struct Connection {
    app: Arc<App>,
    auth: Auth,
    db: Database,
}

impl Connection {
    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.db.store()
    }

    /// Whether both handles were produced by the same registration.
    pub fn same_app(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.app, &other.app)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("app", &self.app.name)
            .field("project_id", &self.app.options.project_id)
            .finish()
    }
}

type StoreFactory = Box<dyn Fn(&BackendConfig) -> Arc<dyn DocumentStore> + Send + Sync>;

/// Registry of initialized apps, keyed by configuration fingerprint.
pub struct AppRegistry {
    factory: StoreFactory,
    apps: Mutex<HashMap<String, Connection>>,
}

impl AppRegistry {
    /// `factory` builds the document store for each newly registered app.
    pub fn new(factory: impl Fn(&BackendConfig) -> Arc<dyn DocumentStore> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            apps: Mutex::new(HashMap::new()),
        }
    }

    /// Registry whose apps all share one store.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(move |_| store.clone())
    }

    /// Return the connection for `config`, registering it on first use.
    pub fn initialize(&self, config: &BackendConfig) -> Result<Connection, ConfigError> {
        config.validate()?;
        let fingerprint = config.fingerprint();

        let mut apps = self.apps.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(existing) = apps.get(&fingerprint) {
            tracing::debug!(app = %existing.app.name, "reusing initialized app");
            return Ok(existing.clone());
        }

        let name = if apps.is_empty() {
            DEFAULT_APP_NAME.to_string()
        } else {
            format!("app-{}", &fingerprint[..12])
        };
        let app = Arc::new(App {
            name,
            options: config.clone(),
            fingerprint: fingerprint.clone(),
        });
        let connection = Connection {
            auth: Auth::new(app.clone()),
            db: Database {
                app: app.clone(),
                store: (self.factory)(config),
            },
            app,
        };
        tracing::info!(app = %connection.app.name, project_id = %config.project_id, "backend app initialized");
        apps.insert(fingerprint, connection.clone());
        Ok(connection)
    }

    pub fn len(&self) -> usize {
        self.apps.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> (AppRegistry, Arc<AtomicUsize>) {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let registry = AppRegistry::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>
        });
        (registry, built)
    }

    #[test]
    fn initialize_is_idempotent_per_config() {
        let (registry, built) = registry();
        let config = BackendConfig::local("ltdk");

        let first = registry.initialize(&config).unwrap();
        let second = registry.initialize(&config.clone()).unwrap();

        assert!(first.same_app(&second));
        assert_eq!(first.app().name(), DEFAULT_APP_NAME);
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn services_are_bound_to_their_app() {
        let (registry, _) = registry();
        let conn = registry.initialize(&BackendConfig::local("ltdk")).unwrap();
        assert!(Arc::ptr_eq(conn.auth().app(), conn.app()));
        assert!(Arc::ptr_eq(conn.db().app(), conn.app()));
    }

    #[test]
    fn distinct_configs_get_distinct_apps() {
        let (registry, built) = registry();
        let a = registry.initialize(&BackendConfig::local("ltdk")).unwrap();
        let b = registry.initialize(&BackendConfig::local("ltdk-staging")).unwrap();
        assert!(!a.same_app(&b));
        assert_ne!(b.app().name(), DEFAULT_APP_NAME);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_api_key_registers_nothing() {
        let (registry, built) = registry();
        let mut config = BackendConfig::local("ltdk");
        config.api_key.clear();
        assert_eq!(registry.initialize(&config).unwrap_err(), ConfigError::MissingApiKey);
        assert!(registry.is_empty());
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn auth_state_is_shared_between_clones() {
        let (registry, _) = registry();
        let config = BackendConfig::local("ltdk");
        let conn = registry.initialize(&config).unwrap();
        let again = registry.initialize(&config).unwrap();

        conn.auth().sign_in(AuthUser {
            uid: "u1".into(),
            email: Some("a@x.ne".into()),
            display_name: None,
            photo_url: None,
        });
        assert_eq!(again.auth().current_user().map(|u| u.uid), Some("u1".to_string()));
        again.auth().sign_out();
        assert_eq!(conn.auth().current_user(), None);
    }
}

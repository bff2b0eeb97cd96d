//! Backend connection configuration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ConfigError;

/// Static configuration of the hosted backend project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: String,
}

impl BackendConfig {
    /// Every field is required. A missing API key is reported on its own since
    /// it is the credential every backend call carries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let required = [
            ("appId", &self.app_id),
            ("projectId", &self.project_id),
            ("authDomain", &self.auth_domain),
            ("storageBucket", &self.storage_bucket),
            ("messagingSenderId", &self.messaging_sender_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Stable identity of this configuration, used to deduplicate initialization.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            &self.api_key,
            &self.app_id,
            &self.project_id,
            &self.auth_domain,
            &self.storage_bucket,
            &self.messaging_sender_id,
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Read the configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LTDK_API_KEY`, `LTDK_APP_ID`, `LTDK_PROJECT_ID`
    /// - `LTDK_AUTH_DOMAIN`, `LTDK_STORAGE_BUCKET`, `LTDK_MESSAGING_SENDER_ID`
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let config = Self {
            api_key: var("LTDK_API_KEY"),
            app_id: var("LTDK_APP_ID"),
            project_id: var("LTDK_PROJECT_ID"),
            auth_domain: var("LTDK_AUTH_DOMAIN"),
            storage_bucket: var("LTDK_STORAGE_BUCKET"),
            messaging_sender_id: var("LTDK_MESSAGING_SENDER_ID"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a single-machine development backend.
    pub fn local(project_id: &str) -> Self {
        Self {
            api_key: "local-dev-key".to_string(),
            app_id: format!("1:000000000000:web:{project_id}"),
            project_id: project_id.to_string(),
            auth_domain: format!("{project_id}.localhost"),
            storage_bucket: format!("{project_id}.localhost"),
            messaging_sender_id: "000000000000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_reported_first() {
        let config = BackendConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn empty_fields_are_rejected_by_name() {
        let mut config = BackendConfig::local("ltdk");
        config.storage_bucket = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingField("storageBucket")));
    }

    #[test]
    fn fingerprint_tracks_every_field() {
        let a = BackendConfig::local("ltdk");
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.messaging_sender_id = "1".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn deserializes_camel_case_keys() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "apiKey": "k",
            "appId": "a",
            "projectId": "p",
            "authDomain": "d",
            "storageBucket": "s",
            "messagingSenderId": "m"
        }))
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.project_id, "p");
    }
}

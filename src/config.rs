// src/config.rs
//! Delivery configuration: caller overrides merged over environment
//! defaults. The cloud name is the only mandatory value; missing it from
//! both sources is a fatal setup error, not a runtime condition.

use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_CLOUD_NAME: &str = "MEDIA_CDN_CLOUD_NAME";
pub const ENV_API_KEY: &str = "MEDIA_CDN_API_KEY";
pub const ENV_SECURE_DISTRIBUTION: &str = "MEDIA_CDN_SECURE_DISTRIBUTION";
pub const ENV_PRIVATE_CDN: &str = "MEDIA_CDN_PRIVATE_CDN";

/// Account/tenant identity on the CDN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
}

/// Delivery-domain options for generated asset URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Custom hostname serving secure URLs, when the account has one.
    pub secure_distribution: Option<String>,
    pub private_cdn: Option<bool>,
}

/// Partial settings supplied by the caller. Every field is optional;
/// anything unset falls back to the `MEDIA_CDN_*` environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub url: UrlConfig,
}

/// Fully resolved configuration handed to the asset-URL layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDeliveryConfig {
    pub cloud_name: String,
    pub api_key: Option<String>,
    pub secure_distribution: Option<String>,
    pub private_cdn: bool,
}

impl DeliveryConfig {
    /// Resolve against the environment. Caller-supplied values win
    /// field by field; the environment fills the gaps.
    pub fn resolve(overrides: Option<&DeliveryConfig>) -> anyhow::Result<ResolvedDeliveryConfig> {
        let cloud_name = overrides
            .and_then(|c| c.cloud.cloud_name.clone())
            .or_else(|| env_nonempty(ENV_CLOUD_NAME));

        let Some(cloud_name) = cloud_name else {
            anyhow::bail!(
                "A cloud name is required, please make sure {ENV_CLOUD_NAME} \
                 is set and configured in your environment."
            );
        };

        Ok(ResolvedDeliveryConfig {
            cloud_name,
            api_key: overrides
                .and_then(|c| c.cloud.api_key.clone())
                .or_else(|| env_nonempty(ENV_API_KEY)),
            secure_distribution: overrides
                .and_then(|c| c.url.secure_distribution.clone())
                .or_else(|| env_nonempty(ENV_SECURE_DISTRIBUTION)),
            private_cdn: overrides
                .and_then(|c| c.url.private_cdn)
                .or_else(|| env_flag(ENV_PRIVATE_CDN))
                .unwrap_or(false),
        })
    }
}

/// Read an env var, treating empty/whitespace-only values as unset.
fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(key: &str) -> Option<bool> {
    env_nonempty(key).map(|v| {
        matches!(
            v.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

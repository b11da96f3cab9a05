// src/analytics.rs
//! Analytics metadata stamped on outbound asset requests so the CDN can
//! attribute traffic to this integration layer.

use serde::{Deserialize, Serialize};

/// Fixed identifiers for this integration layer. Built once at process
/// start and passed by reference wherever metadata is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkIdentity {
    /// Product line code understood by the CDN's analytics pipeline.
    pub product: &'static str,
    /// Code identifying this SDK among the CDN's client libraries.
    pub sdk_code: &'static str,
    /// This crate's version.
    pub sdk_semver: &'static str,
    /// Version of the host rendering layer, supplied by the caller.
    pub tech_version: String,
}

impl SdkIdentity {
    pub fn new(tech_version: impl Into<String>) -> Self {
        Self {
            product: "A",
            sdk_code: "R",
            sdk_semver: env!("CARGO_PKG_VERSION"),
            tech_version: tech_version.into(),
        }
    }
}

/// Caller-supplied analytics fields. Anything set here wins over the
/// identity defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOptions {
    pub product: Option<String>,
    pub sdk_code: Option<String>,
    pub sdk_semver: Option<String>,
    pub tech_version: Option<String>,
    pub feature: Option<String>,
}

/// Fully resolved metadata object attached to an asset request.
/// Serializes in camelCase for the CDN's JS-shaped analytics surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsMetadata {
    pub product: String,
    pub sdk_code: String,
    pub sdk_semver: String,
    pub tech_version: String,
    pub feature: String,
}

/// Merge caller overrides over the fixed identity, field by field.
/// `feature` has no identity default and falls back to empty.
pub fn resolve_analytics(
    identity: &SdkIdentity,
    overrides: Option<&AnalyticsOptions>,
) -> AnalyticsMetadata {
    AnalyticsMetadata {
        product: overrides
            .and_then(|o| o.product.clone())
            .unwrap_or_else(|| identity.product.to_string()),
        sdk_code: overrides
            .and_then(|o| o.sdk_code.clone())
            .unwrap_or_else(|| identity.sdk_code.to_string()),
        sdk_semver: overrides
            .and_then(|o| o.sdk_semver.clone())
            .unwrap_or_else(|| identity.sdk_semver.to_string()),
        tech_version: overrides
            .and_then(|o| o.tech_version.clone())
            .unwrap_or_else(|| identity.tech_version.clone()),
        feature: overrides
            .and_then(|o| o.feature.clone())
            .unwrap_or_default(),
    }
}

// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analytics;
pub mod config;
pub mod poller;

// ---- Re-exports for stable public API ----
pub use crate::analytics::{resolve_analytics, AnalyticsMetadata, AnalyticsOptions, SdkIdentity};
pub use crate::config::{CloudConfig, DeliveryConfig, ResolvedDeliveryConfig, UrlConfig};
pub use crate::poller::{
    poll_for_processing_asset, AssetFetcher, AssetPoller, FetchedStatus, HttpFetcher, PollOutcome,
    PollRequest,
};

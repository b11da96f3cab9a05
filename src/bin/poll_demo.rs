//! Demo that resolves delivery config from the environment and polls one
//! asset URL until it is ready (or terminally failed).

use media_cdn_bridge::{resolve_analytics, AssetPoller, DeliveryConfig, PollRequest, SdkIdentity};

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let url = match std::env::args().nth(1) {
        Some(u) => u,
        None => {
            eprintln!("usage: poll_demo <asset-url>");
            std::process::exit(2);
        }
    };

    match DeliveryConfig::resolve(None) {
        Ok(cfg) => tracing::info!(cloud = %cfg.cloud_name, "delivery config resolved"),
        Err(e) => tracing::warn!(error = %e, "no delivery config; polling anyway"),
    }

    let identity = SdkIdentity::new("demo");
    let metadata = resolve_analytics(&identity, None);
    tracing::info!(sdk = %metadata.sdk_semver, "request metadata prepared");

    let outcome = AssetPoller::default().poll(&PollRequest::new(url)).await;
    let json = serde_json::to_string_pretty(&outcome).unwrap_or_else(|_| format!("{outcome:?}"));
    println!("{json}");
}

use std::time::Duration;
use tracing::{error, info, info_span, Instrument};

use capturing_log::{
    init_capture_with_config, CaptureConfig, CategoryStoreRegistry, LogStore, LoggerProvider,
};

async fn authenticate(user_id: u64, password: &str) -> bool {
    info!(user_id, "checking credentials");
    tokio::time::sleep(Duration::from_millis(5)).await;
    if password.is_empty() {
        error!(user_id, reason = "empty password", "authentication failed");
        return false;
    }
    true
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let registry = CategoryStoreRegistry::new();
    let provider = LoggerProvider::from_registry(registry.clone());
    let config = CaptureConfig {
        enable_stdout: true,
        ..CaptureConfig::from_env()
    };
    let _guard = init_capture_with_config(provider, config);

    authenticate(42, "hunter2")
        .instrument(info_span!("login", user_id = 42))
        .await;
    authenticate(7, "")
        .instrument(info_span!("login", user_id = 7))
        .await;

    for category in registry.categories() {
        let Ok(store) = registry.get(&category) else {
            continue;
        };
        println!("{} ({} records)", category, store.count());
        for record in store.iter() {
            println!("  {}", record.to_json());
        }
    }
}

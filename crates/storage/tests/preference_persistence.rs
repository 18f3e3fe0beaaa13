use shared::events::CACHED_PROVIDER_KEY;
use storage::{KeyValueStore, Storage};

#[tokio::test]
async fn cached_provider_survives_reopening_the_database() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("wallet_select_reopen_test_{suffix}"));
    let db_path = temp_root.join("prefs.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Storage::new(&database_url).await.expect("first open");
        storage
            .set(CACHED_PROVIDER_KEY, "walletconnect")
            .await
            .expect("store cached provider");
        storage.pool().close().await;
    }

    let reopened = Storage::new(&database_url).await.expect("second open");
    assert_eq!(
        reopened
            .get(CACHED_PROVIDER_KEY)
            .await
            .expect("load cached provider")
            .as_deref(),
        Some("walletconnect")
    );

    reopened
        .remove(CACHED_PROVIDER_KEY)
        .await
        .expect("clear cached provider");
    assert!(reopened
        .get(CACHED_PROVIDER_KEY)
        .await
        .expect("load after clear")
        .is_none());

    reopened.pool().close().await;
    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

//! Offline unit tests for itinera-db pool configuration and row types.
//! These tests do not require a live database connection.

use itinera_core::{AppConfig, Environment};
use itinera_db::{ActivityImageRow, PoolConfig};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        user_agent: "ua".to_string(),
        search_timeout_secs: 5,
        page_timeout_secs: 8,
        file_timeout_secs: 3,
        llm_timeout_secs: 60,
        max_concurrent_activities: 5,
        wikipedia_primary_lang: "zh".to_string(),
        wikipedia_secondary_lang: "en".to_string(),
        relevance_policy_path: None,
        unsplash_access_key: None,
        pexels_api_key: None,
        google_api_key: None,
        google_search_engine_id: None,
        bing_api_key: None,
        llm_api_key: None,
        llm_api_url: None,
        llm_model: "qwen-plus".to_string(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout, std::time::Duration::from_secs(9));
}

#[tokio::test]
async fn connect_without_database_url_fails_fast() {
    let mut config = app_config();
    config.database_url = None;
    let result = itinera_db::connect_pool_from_config(&config).await;
    assert!(matches!(result, Err(itinera_db::DbError::MissingDatabaseUrl)));
}

/// Compile-time smoke test: confirm that [`ActivityImageRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn activity_image_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ActivityImageRow {
        id: Uuid::new_v4(),
        plan_id: Uuid::new_v4(),
        activity_name: "West Lake".to_string(),
        image_url: "https://a.example/west-lake.jpg".to_string(),
        image_description: "West Lake (Hangzhou) - Wikipedia".to_string(),
        source: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.activity_name, "West Lake");
    assert!(row.source.is_none());
}

use crate::helpers::{basic_auth_header, email_body, spawn_postgres_app};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use wiremock::matchers::header;
use wiremock::{Mock, ResponseTemplate};

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    serde_json::from_value(value.clone()).expect("Failed to parse timestamp")
}

#[tokio::test]
async fn duplicate_site_returns_409_from_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.post_site("shop.example.com").await;

    // Act
    let response = test.app.post_site("Shop.Example.com").await;

    // Assert
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn duplicate_configuration_returns_409_from_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.configure_site("shop.example.com", "first-key").await;

    // Act
    let response = test
        .app
        .post_configuration(&serde_json::json!({
            "site": "shop.example.com",
            "api_key": "second-key",
        }))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 409);
    let stored = test.app.get_configuration("shop.example.com").await;
    let view: serde_json::Value = stored.json().await.unwrap();
    assert_eq!(view["api_key_hint"], "****-key");
    assert_eq!(view["from_email"], "noreply@shop.example.com");
}

#[tokio::test]
async fn deleting_a_site_cascades_to_its_configuration_in_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.configure_site("shop.example.com", "key").await;

    // Act
    let response = test.app.delete_site("shop.example.com").await;

    // Assert
    assert_eq!(response.status().as_u16(), 204);
    let response = test.app.get_configuration("shop.example.com").await;
    assert_eq!(response.status().as_u16(), 404);
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_configurations")
        .fetch_one(&test.db_pool)
        .await
        .expect("Failed to count email configurations.");
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn update_changes_updated_at_and_keeps_created_at_in_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.configure_site("shop.example.com", "old-key").await;
    let created: serde_json::Value = test
        .app
        .get_configuration("shop.example.com")
        .await
        .json()
        .await
        .unwrap();

    // Act
    let response = test
        .app
        .put_configuration(
            "shop.example.com",
            &serde_json::json!({ "api_key": "new-key", "from_name": "Shop" }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["api_key_hint"], "****-key");
    assert_eq!(updated["from_name"], "Shop");
    assert!(updated["from_email"].is_null());
    assert_eq!(
        timestamp(&updated["created_at"]),
        timestamp(&created["created_at"])
    );
    assert!(timestamp(&updated["updated_at"]) > timestamp(&created["updated_at"]));
}

#[tokio::test]
async fn update_for_a_site_without_configuration_returns_404_in_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.post_site("shop.example.com").await;

    // Act
    let response = test
        .app
        .put_configuration("shop.example.com", &serde_json::json!({ "api_key": "key" }))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn configuration_can_only_be_deleted_once_in_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.configure_site("shop.example.com", "key").await;

    // Act
    let first = test.app.delete_configuration("shop.example.com").await;
    let second = test.app.delete_configuration("shop.example.com").await;

    // Assert
    assert_eq!(first.status().as_u16(), 204);
    assert_eq!(second.status().as_u16(), 404);
}

#[tokio::test]
async fn stored_configuration_drives_dispatch_in_postgres() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.configure_site("alpha.com", "alpha-key").await;
    test.app.configure_site("beta.com", "beta-key").await;

    Mock::given(header("Authorization", basic_auth_header("beta-key").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test.app.email_server)
        .await;

    // Act
    let response = test
        .app
        .post_email_with_host(&email_body("customer@domain.com"), "beta.com", None)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn sites_with_invalid_stored_domains_are_skipped_when_listing() {
    // Arrange
    let test = spawn_postgres_app().await;
    test.app.post_site("shop.example.com").await;
    sqlx::query("INSERT INTO sites (id, domain, name, registered_at) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4())
        .bind("not a domain")
        .bind("Broken")
        .bind(Utc::now())
        .execute(&test.db_pool)
        .await
        .expect("Failed to insert a broken site.");

    // Act
    let response = test
        .app
        .api_client
        .get(&format!("{}/sites", &test.app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let sites: serde_json::Value = response.json().await.unwrap();
    let domains: Vec<&str> = sites
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["domain"].as_str().unwrap())
        .collect();
    assert_eq!(domains, vec!["shop.example.com"]);
}

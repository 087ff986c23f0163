use crate::helpers::{basic_auth_header, email_body, spawn_app, spawn_app_with_defaults};
use forward_email::domain::dispatch::models::email::EmailAddress;
use forward_email::domain::email_configuration::models::{ApiKey, EnvironmentDefaults};
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn send_email_returns_200_and_calls_the_provider_once() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("shop.example.com", "shop-key").await;

    Mock::given(path("/v1/emails"))
        .and(method("POST"))
        .and(header("Authorization", basic_auth_header("shop-key").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_email_for_site(&email_body("customer@domain.com"), "shop.example.com")
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn provider_receives_recipient_subject_and_bodies_verbatim() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("shop.example.com", "shop-key").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    app.post_email_for_site(&email_body("Customer <customer@domain.com>"), "shop.example.com")
        .await
        .error_for_status()
        .unwrap();

    // Assert
    let bodies = app.get_email_request_bodies().await;
    assert_eq!(bodies[0]["to"], "Customer <customer@domain.com>");
    assert_eq!(bodies[0]["subject"], "Welcome aboard");
    assert_eq!(bodies[0]["text"], "Thanks for signing up.");
    assert_eq!(bodies[0]["html"], "<p>Thanks for signing up.</p>");
    assert_eq!(bodies[0]["from"], "noreply@shop.example.com");
}

#[tokio::test]
async fn explicit_site_wins_over_the_request_host() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("alpha.com", "alpha-key").await;
    app.configure_site("beta.com", "beta-key").await;

    Mock::given(header("Authorization", basic_auth_header("alpha-key").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_email_with_host(&email_body("customer@domain.com"), "beta.com", Some("alpha.com"))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn request_host_selects_the_site_when_none_is_given() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("alpha.com", "alpha-key").await;
    app.configure_site("beta.com", "beta-key").await;

    Mock::given(header("Authorization", basic_auth_header("beta-key").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_email_with_host(&email_body("customer@domain.com"), "beta.com:8000", None)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn unknown_host_falls_back_to_the_first_registered_site() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("alpha.com", "alpha-key").await;
    app.configure_site("beta.com", "beta-key").await;

    Mock::given(header("Authorization", basic_auth_header("alpha-key").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_email(&email_body("customer@domain.com")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn environment_defaults_are_used_when_no_site_is_configured() {
    // Arrange
    let app = spawn_app_with_defaults(EnvironmentDefaults {
        api_key: Some(ApiKey::parse("env-key".into()).unwrap()),
        from_email: Some(EmailAddress::parse("webmaster@domain.com".into()).unwrap()),
        ..Default::default()
    })
    .await;

    Mock::given(header("Authorization", basic_auth_header("env-key").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_email(&email_body("customer@domain.com")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let bodies = app.get_email_request_bodies().await;
    assert_eq!(bodies[0]["from"], "webmaster@domain.com");
}

#[tokio::test]
async fn send_email_returns_400_for_invalid_input() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("shop.example.com", "shop-key").await;
    let test_cases = vec![
        (email_body("not-an-email"), "malformed recipient"),
        (
            serde_json::json!({ "to": "a@domain.com", "subject": "", "text": "Body" }),
            "empty subject",
        ),
        (
            serde_json::json!({ "to": "a@domain.com", "subject": "Hi", "text": "" }),
            "empty text body",
        ),
        (
            serde_json::json!({ "to": [], "subject": "Hi", "text": "Body" }),
            "no recipients",
        ),
    ];

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for (body, description) in test_cases {
        // Act
        let response = app.post_email_for_site(&body, "shop.example.com").await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload had {}.",
            description
        );
    }
}

#[tokio::test]
async fn send_email_returns_500_when_no_configuration_can_be_resolved() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_email(&email_body("customer@domain.com")).await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("configuration"));
}

#[tokio::test]
async fn send_email_returns_503_when_the_provider_fails() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("shop.example.com", "shop-key").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_email_for_site(&email_body("customer@domain.com"), "shop.example.com")
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn send_email_returns_502_when_the_provider_rejects_the_credentials() {
    // Arrange
    let app = spawn_app().await;
    app.configure_site("shop.example.com", "revoked-key").await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({ "message": "Invalid API token" })),
        )
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_email_for_site(&email_body("customer@domain.com"), "shop.example.com")
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid API token"));
}

#[tokio::test]
async fn send_email_returns_400_for_an_invalid_site_parameter() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_email_for_site(&email_body("customer@domain.com"), "not a domain")
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

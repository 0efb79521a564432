use serde_json::json;
use sqlx::{postgres::PgRow, Row};
use tournoi_prospects::routes::{alert_header, error_header, params_header};
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

#[tokio::test]
async fn create_prospect_returns_201_when_body_is_valid() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(1).await;

    let response = test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;

    assert_eq!(201, response.status().as_u16());
    assert_eq!(
        response.headers().get("Location").unwrap(),
        "/api/prospects/1"
    );
    assert_eq!(
        response.headers().get(alert_header().as_str()).unwrap(),
        "tournoiProspectsApp.prospect.created"
    );
    assert_eq!(response.headers().get(params_header().as_str()).unwrap(), "1");

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body, json!({ "id": 1, "email": "aaaa@aa.com" }));
}

#[tokio::test]
async fn create_prospect_persists_the_new_prospect() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(1).await;

    test_app
        .post_prospect(json!({ "email": "Aaaa@AA.com" }))
        .await;

    let saved = sqlx::query("SELECT id, email, created_date FROM prospect")
        .map(|row: PgRow| {
            (
                row.get::<i64, _>("id"),
                row.get::<String, _>("email"),
                row.get::<chrono::DateTime<chrono::Utc>, _>("created_date"),
            )
        })
        .fetch_one(&test_app.db_pool)
        .await
        .expect("Query to fetch prospects failed.");

    assert_eq!(saved.0, 1);
    assert_eq!(saved.1, "aaaa@aa.com");
    assert!(saved.2 <= chrono::Utc::now());
}

#[tokio::test]
async fn create_prospect_subscribes_the_email_to_the_mailing_list() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(1).await;

    test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;

    let received_requests = &test_app
        .mailing_list_server
        .received_requests()
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received_requests[0].body).unwrap();

    assert_eq!(received_requests.len(), 1);
    assert_eq!(body["email_address"], "aaaa@aa.com");
    assert_eq!(body["status"], "subscribed");
    assert!(body["timestamp_signup"].is_string());
}

#[tokio::test]
async fn create_prospect_returns_409_when_email_is_already_registered() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(1).await;

    let first = test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;
    let second = test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;

    assert_eq!(201, first.status().as_u16());
    assert_eq!(409, second.status().as_u16());
    assert_eq!(
        second.headers().get(error_header().as_str()).unwrap(),
        "error.emailexists"
    );
    assert_eq!(test_app.stored_emails().await, vec!["aaaa@aa.com"]);
}

#[tokio::test]
async fn concurrent_creations_of_the_same_email_store_a_single_prospect() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .expect(1)
        .mount(&test_app.mailing_list_server)
        .await;

    let (first, second) = tokio::join!(
        test_app.post_prospect(json!({ "email": "aaaa@aa.com" })),
        test_app.post_prospect(json!({ "email": "aaaa@aa.com" })),
    );
    let mut statuses = vec![first.status().as_u16(), second.status().as_u16()];
    statuses.sort();

    assert_eq!(statuses, vec![201, 409]);
    assert_eq!(test_app.stored_emails().await, vec!["aaaa@aa.com"]);
}

#[tokio::test]
async fn create_prospect_returns_400_when_id_is_present() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(0).await;

    let response = test_app
        .post_prospect(json!({ "id": 1, "email": "bbbb@bb.com" }))
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(
        response.headers().get(error_header().as_str()).unwrap(),
        "error.idexists"
    );
    assert!(test_app.stored_emails().await.is_empty());
}

#[tokio::test]
async fn create_prospect_returns_400_idexists_when_id_is_a_string() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(0).await;

    let response = test_app
        .post_prospect(json!({ "id": "1", "email": "bbbb@bb.com" }))
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(
        response.headers().get(error_header().as_str()).unwrap(),
        "error.idexists"
    );
    assert!(test_app.stored_emails().await.is_empty());
}

#[tokio::test]
async fn create_prospect_returns_400_with_alert_headers_when_body_is_not_json() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(0).await;

    let response = reqwest::Client::new()
        .post(&format!("{}/api/prospects", test_app.address))
        .header("Content-Type", "application/json")
        .body(r#"{"email": "aaaa@"#)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    assert_eq!(
        response.headers().get(error_header().as_str()).unwrap(),
        "error.malformedbody"
    );

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["errorKey"], "malformedbody");
    assert!(test_app.stored_emails().await.is_empty());
}

#[tokio::test]
async fn create_prospect_returns_400_when_body_is_present_but_not_valid() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(0).await;

    // Table-driven: every payload below must be rejected without touching the database.
    let test_cases = vec![
        (json!({}), "missing email parameter"),
        (json!({ "email": "" }), "empty email parameter"),
        (json!({ "email": "aaaa.com" }), "invalid email parameter"),
        (
            json!({ "email": format!("aaaa@{}.com", "a".repeat(100)) }),
            "email longer than 100 characters",
        ),
        (
            json!({ "email": format!("{}@{}.com", "a".repeat(60), "İ".repeat(20)) }),
            "email longer than 100 characters once lowercased",
        ),
        (json!({ "email": 42 }), "email is not a string"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_prospect(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }

    assert!(test_app.stored_emails().await.is_empty());
}

#[tokio::test]
async fn create_prospect_returns_502_and_keeps_no_record_when_mailing_list_fails() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.mailing_list_server)
        .await;

    let response = test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;

    assert_eq!(502, response.status().as_u16());
    assert_eq!(
        response.headers().get(error_header().as_str()).unwrap(),
        "error.mailinglist"
    );
    assert!(test_app.stored_emails().await.is_empty());
}

#[tokio::test]
async fn create_prospect_returns_500_when_database_is_broken() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(0).await;

    sqlx::query("ALTER TABLE prospect DROP COLUMN created_date;")
        .execute(&test_app.db_pool)
        .await
        .unwrap();

    let response = test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;

    assert_eq!(500, response.status().as_u16());
    assert_eq!(
        response.headers().get(error_header().as_str()).unwrap(),
        "error.persistence"
    );
}

#[tokio::test]
async fn get_prospect_returns_the_stored_prospect() {
    let test_app = TestApp::spawn_app().await;
    test_app.mailing_list_accepts(1).await;

    test_app
        .post_prospect(json!({ "email": "aaaa@aa.com" }))
        .await;

    let response = test_app.get_prospect(1).await;
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body, json!({ "id": 1, "email": "aaaa@aa.com" }));
}

#[tokio::test]
async fn get_prospect_returns_404_when_prospect_does_not_exist() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_prospect(i64::MAX).await;

    assert_eq!(404, response.status().as_u16());
}

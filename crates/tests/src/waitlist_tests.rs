use bson::doc;
use serde_json::{Value, json};
use wrenchly_db::models::WaitlistEntry;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn join_waitlist_stores_entry() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/waitlist"))
        .json(&json!({ "email": "Early@Example.com", "name": "Early Bird" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    // Email delivery is disabled in tests; flags report that faithfully
    assert_eq!(body["confirmationSent"], json!(false));
    assert_eq!(body["notificationSent"], json!(false));

    // Stored lowercased
    let entry = app
        .db
        .collection::<WaitlistEntry>(WaitlistEntry::COLLECTION)
        .find_one(doc! { "email": "early@example.com" })
        .await
        .unwrap()
        .expect("Waitlist entry not stored");
    assert_eq!(entry.name.as_deref(), Some("Early Bird"));
}

#[tokio::test]
async fn duplicate_signup_is_not_an_error() {
    let app = TestApp::spawn().await;

    for _ in 0..2 {
        let resp = app
            .client
            .post(app.url("/api/waitlist"))
            .json(&json!({ "email": "twice@example.com" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    let count = app
        .db
        .collection::<WaitlistEntry>(WaitlistEntry::COLLECTION)
        .count_documents(doc! { "email": "twice@example.com" })
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/waitlist"))
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

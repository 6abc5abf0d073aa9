use std::collections::{HashMap, HashSet};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// In-process stand-in for the identity provider's backend API.
///
/// Records every invitation creation and metadata patch so tests can
/// assert on what the application sent, and can be primed with
/// "existing" emails to trigger the email-taken branch.
#[derive(Clone, Default)]
pub struct StubState {
    invitations: Arc<Mutex<Vec<Value>>>,
    metadata_patches: Arc<Mutex<Vec<(String, Value)>>>,
    existing_emails: Arc<Mutex<HashSet<String>>>,
    counter: Arc<AtomicU64>,
}

pub struct ClerkStub {
    pub base_url: String,
    state: StubState,
}

impl ClerkStub {
    /// Prime the stub so invitation creation for this email fails with
    /// the provider's email-taken error.
    pub fn add_existing_user(&self, email: &str) {
        self.state
            .existing_emails
            .lock()
            .unwrap()
            .insert(email.to_string());
    }

    pub fn recorded_invitations(&self) -> Vec<Value> {
        self.state.invitations.lock().unwrap().clone()
    }

    pub fn recorded_patches(&self) -> Vec<(String, Value)> {
        self.state.metadata_patches.lock().unwrap().clone()
    }
}

pub async fn spawn() -> ClerkStub {
    let state = StubState::default();

    let app = Router::new()
        .route("/invitations", post(create_invitation))
        .route("/users", get(list_users))
        .route("/users/{user_id}/metadata", patch(patch_metadata))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind clerk stub");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ClerkStub {
        base_url: format!("http://{addr}"),
        state,
    }
}

async fn create_invitation(
    State(state): State<StubState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let email = body["email_address"].as_str().unwrap_or_default().to_string();

    if state.existing_emails.lock().unwrap().contains(&email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "errors": [{
                    "code": "form_identifier_exists",
                    "message": "That email address is taken. Please try another.",
                }]
            })),
        )
            .into_response();
    }

    state.invitations.lock().unwrap().push(body);
    let n = state.counter.fetch_add(1, Ordering::SeqCst);

    (
        StatusCode::OK,
        Json(json!({
            "id": format!("inv_stub_{n}"),
            "email_address": email,
            "status": "pending",
        })),
    )
        .into_response()
}

async fn list_users(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let email = params.get("email_address").cloned().unwrap_or_default();

    if state.existing_emails.lock().unwrap().contains(&email) {
        Json(json!([{
            "id": "user_stub_existing",
            "primary_email_address_id": "em_1",
            "email_addresses": [{ "id": "em_1", "email_address": email }],
            "public_metadata": {},
        }]))
    } else {
        Json(json!([]))
    }
}

async fn patch_metadata(
    State(state): State<StubState>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state
        .metadata_patches
        .lock()
        .unwrap()
        .push((user_id, body["public_metadata"].clone()));
    Json(json!({}))
}

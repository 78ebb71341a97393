use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::mail::{DeliveryMetadata, Notifier};

const HOME_HTML: &str = r#"
<h1>Form Submission Email Sender</h1>
<p>Visit <a href="/send-email">/send-email</a> to send the submission email.</p>
"#;

#[derive(Clone)]
pub struct TriggerState {
    pub notifier: Arc<dyn Notifier>,
    pub metadata: Arc<DeliveryMetadata>,
}

impl TriggerState {
    pub fn new(notifier: Arc<dyn Notifier>, metadata: DeliveryMetadata) -> Self {
        Self {
            notifier,
            metadata: Arc::new(metadata),
        }
    }
}

pub fn router(state: TriggerState) -> Router {
    Router::new()
        .route("/", get(|| async { Html(HOME_HTML) }))
        .route("/send-email", get(send_email))
        .with_state(state)
}

async fn send_email(State(state): State<TriggerState>) -> impl IntoResponse {
    match state.notifier.deliver(&state.metadata).await {
        Ok(message) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "message": message })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "email delivery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
        }
    }
}

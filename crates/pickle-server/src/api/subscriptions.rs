//! Subscription intake handler.

use axum::{extract::State, http::StatusCode, Extension, Json};
use pickle_core::SubscriptionStatus;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateSubscriptionRequest {
    pub email: String,
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SubscriptionData {
    pub email: String,
    pub topic: String,
    pub status: &'static str,
}

/// `POST /api/v1/subscriptions` — subscribe (or renew) an email for a topic.
///
/// A repeat subscribe for the same email replaces the stored topic and
/// pushes the expiry window forward; it never creates a second row.
pub(in crate::api) async fn create_subscription(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionData>>), ApiError> {
    let email = body.email.trim().to_lowercase();
    let topic = body.topic.trim().to_owned();

    if let Err(message) = validate_intake(&email, &topic) {
        return Err(ApiError::new(req_id.0, "validation_error", message));
    }

    pickle_db::upsert_subscription(&state.pool, &email, &topic, state.subscription_ttl_days)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(email = %email, topic = %topic, "subscription stored");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: SubscriptionData {
                email,
                topic,
                status: SubscriptionStatus::Active.as_str(),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

fn validate_intake(email: &str, topic: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("email must contain '@'");
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err("email address is not deliverable");
    }
    if topic.is_empty() {
        return Err("topic must not be blank");
    }
    Ok(())
}

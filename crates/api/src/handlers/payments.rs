//! Payment collaborator webhook.
//!
//! The checkout posts a [`PaymentCompleted`] body signed with the shared
//! secret: hex HMAC-SHA256 of the raw body in [`SIGNATURE_HEADER`]. The
//! signature is checked before the body is parsed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use dossier_core::error::CoreError;
use dossier_core::payment::{verify_signature, PaymentCompleted};
use dossier_core::service::DossierView;
use dossier_events::DossierEvent;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-payment-signature";

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub dossier: DossierView,
    /// A dossier was created for this payment.
    pub created: bool,
    /// `false` for a repeated delivery.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// POST /payments/completed
// ---------------------------------------------------------------------------

pub async fn payment_completed(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let Some(secret) = state.config.payment_webhook_secret.as_deref() else {
        tracing::warn!("Payment notification received but PAYMENT_WEBHOOK_SECRET is not set");
        return Err(CoreError::Unauthorized("Payment notifications are not enabled".into()).into());
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing payment signature".into()))?;

    if !verify_signature(secret, &body, signature) {
        tracing::warn!("Payment notification with an invalid signature");
        return Err(CoreError::Unauthorized("Invalid payment signature".into()).into());
    }

    let event: PaymentCompleted = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid payment notification: {e}")))?;

    let outcome = state.service.complete_payment(&event).await?;
    let view = &outcome.view;

    if let Some(status) = outcome.status_changed {
        state.event_bus.publish(DossierEvent::StatusChanged {
            dossier_id: view.id,
            owner_id: view.owner_id,
            status,
            at: Utc::now(),
        });
    }

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(DataResponse {
            data: PaymentResponse {
                dossier: outcome.view,
                created: outcome.created,
                changed: outcome.changed,
            },
        }),
    ))
}

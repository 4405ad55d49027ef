// SPDX-License-Identifier: MIT

//! Payment provider webhook.
//!
//! Subscription lifecycle events arrive here, signed with a shared secret.
//! Events update the entitlement cache; nothing else in the system talks
//! to the payment provider.

use crate::error::{AppError, Result};
use crate::models::SubscriptionStatus;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw body.
const SIGNATURE_HEADER: &str = "x-payments-signature";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/payments", post(handle_payment_event))
}

/// Payment provider event envelope.
#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Our client id, from the checkout session reference
    pub user_id: Option<String>,
    /// Payment provider customer id
    pub customer_id: Option<String>,
    pub plan_id: Option<String>,
    /// Provider-reported subscription status for update events
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

/// Verify the signature and apply the event to the entitlement cache.
///
/// Unknown event types are acknowledged and ignored so the provider
/// doesn't retry them forever.
async fn handle_payment_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    verify_signature(
        state.config.payments_webhook_secret.as_bytes(),
        body.as_bytes(),
        signature,
    )?;

    let event: PaymentEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    let now = format_utc_rfc3339(Utc::now());
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let user_id = event.user_id.as_deref().ok_or_else(|| {
                AppError::BadRequest("checkout event missing user_id".to_string())
            })?;
            state
                .entitlements
                .activate(user_id, event.customer_id, event.plan_id, &now);
        }
        "customer.subscription.updated" => {
            let status = parse_status(event.status.as_deref())?;
            apply_status(&state, &event, status, &now);
        }
        "customer.subscription.deleted" => {
            apply_status(&state, &event, SubscriptionStatus::Canceled, &now);
        }
        "invoice.payment_succeeded" => {
            tracing::info!(customer = ?event.customer_id, "Payment succeeded");
        }
        "invoice.payment_failed" => {
            apply_status(&state, &event, SubscriptionStatus::PastDue, &now);
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring unhandled webhook event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

fn apply_status(state: &AppState, event: &PaymentEvent, status: SubscriptionStatus, now: &str) {
    if let Some(user_id) = event.user_id.as_deref() {
        state.entitlements.set_status(user_id, status, now);
    } else if let Some(customer_id) = event.customer_id.as_deref() {
        state
            .entitlements
            .set_status_by_customer(customer_id, status, now);
    } else {
        tracing::warn!(
            event_type = %event.event_type,
            "Subscription event with neither user nor customer id"
        );
    }
}

fn parse_status(raw: Option<&str>) -> Result<SubscriptionStatus> {
    match raw {
        Some("active") => Ok(SubscriptionStatus::Active),
        Some("past_due") => Ok(SubscriptionStatus::PastDue),
        Some("canceled") | Some("cancelled") => Ok(SubscriptionStatus::Canceled),
        other => Err(AppError::BadRequest(format!(
            "Unknown subscription status: {:?}",
            other
        ))),
    }
}

/// Constant-time check of the hex HMAC-SHA256 signature.
fn verify_signature(secret: &[u8], body: &[u8], signature_hex: &str) -> Result<()> {
    let signature = hex::decode(signature_hex).map_err(|_| AppError::InvalidSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| AppError::InvalidSignature)?;
    mac.update(body);
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidSignature)
}

/// Sign a payload the way the provider does. Used by tests and local
/// replay tooling.
pub fn sign_payload(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let secret = b"whsec_test";
        let body = br#"{"type":"invoice.payment_succeeded"}"#;

        let signature = sign_payload(secret, body);
        assert!(verify_signature(secret, body, &signature).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let secret = b"whsec_test";
        let signature = sign_payload(secret, b"original");

        assert!(verify_signature(secret, b"tampered", &signature).is_err());
    }

    #[test]
    fn test_malformed_signature_rejected() {
        assert!(verify_signature(b"secret", b"body", "not-hex!").is_err());
    }

    #[test]
    fn test_parse_status_variants() {
        assert_eq!(
            parse_status(Some("active")).unwrap(),
            SubscriptionStatus::Active
        );
        assert_eq!(
            parse_status(Some("past_due")).unwrap(),
            SubscriptionStatus::PastDue
        );
        assert!(parse_status(Some("paused")).is_err());
        assert!(parse_status(None).is_err());
    }
}

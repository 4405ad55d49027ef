// SPDX-License-Identifier: MIT

//! Premium entitlement cache, driven by payment-provider webhooks.
//!
//! The engines never consult this: gating happens at the route layer,
//! keeping the analytics code entitlement-free.

use crate::models::subscription::{SubscriptionStatus, UserSubscription};
use dashmap::DashMap;

/// In-memory subscription state per user.
#[derive(Default)]
pub struct EntitlementService {
    subscriptions: DashMap<String, UserSubscription>,
}

impl EntitlementService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this user currently holds an active subscription.
    pub fn is_premium(&self, user_id: &str) -> bool {
        self.subscriptions
            .get(user_id)
            .map_or(false, |s| s.status.is_premium())
    }

    pub fn subscription(&self, user_id: &str) -> Option<UserSubscription> {
        self.subscriptions.get(user_id).map(|s| s.clone())
    }

    /// A completed checkout activates the subscription.
    pub fn activate(
        &self,
        user_id: &str,
        customer_id: Option<String>,
        plan_id: Option<String>,
        now: &str,
    ) {
        tracing::info!(user_id, plan = ?plan_id, "Subscription activated");
        self.subscriptions.insert(
            user_id.to_string(),
            UserSubscription {
                user_id: user_id.to_string(),
                status: SubscriptionStatus::Active,
                plan_id,
                customer_id,
                updated_at: now.to_string(),
            },
        );
    }

    /// Apply a status change for a known user.
    pub fn set_status(&self, user_id: &str, status: SubscriptionStatus, now: &str) {
        if let Some(mut subscription) = self.subscriptions.get_mut(user_id) {
            subscription.status = status;
            subscription.updated_at = now.to_string();
            tracing::info!(user_id, ?status, "Subscription status updated");
        } else {
            tracing::warn!(user_id, ?status, "Status update for unknown subscription");
        }
    }

    /// Apply a status change addressed by payment-provider customer id
    /// (subscription and invoice events don't carry our user id).
    pub fn set_status_by_customer(
        &self,
        customer_id: &str,
        status: SubscriptionStatus,
        now: &str,
    ) -> bool {
        let user_id = self
            .subscriptions
            .iter()
            .find(|entry| entry.customer_id.as_deref() == Some(customer_id))
            .map(|entry| entry.user_id.clone());

        match user_id {
            Some(user_id) => {
                self.set_status(&user_id, status, now);
                true
            }
            None => {
                tracing::warn!(customer_id, "No subscription for customer");
                false
            }
        }
    }
}

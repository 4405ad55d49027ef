// SPDX-License-Identifier: MIT

//! Subscription state driven by the payment provider's webhooks.

use serde::{Deserialize, Serialize};

/// Subscription lifecycle state, as reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    /// Only an active subscription unlocks premium surfaces.
    pub fn is_premium(self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

/// A user's subscription record, kept in the entitlement cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscription {
    pub user_id: String,
    pub status: SubscriptionStatus,
    /// Plan id from the checkout session metadata
    pub plan_id: Option<String>,
    /// Payment provider customer id
    pub customer_id: Option<String>,
    /// RFC3339
    pub updated_at: String,
}

//! Subscription model, written by the payment-webhook integration.

use serde::{Deserialize, Serialize};

/// Subscription document stored in `customers/{userId}/subscriptions/{subscriptionId}`.
/// Read-only here; the Stripe webhook extension owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub status: SubscriptionStatus,
}

/// Stripe subscription status vocabulary.
///
/// Unknown provider states deserialize to [`SubscriptionStatus::Unknown`] and
/// deliberately leave the user's plan untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
    Unpaid,
    IncompleteExpired,
    PastDue,
    Incomplete,
    Paused,
    #[serde(other)]
    Unknown,
}

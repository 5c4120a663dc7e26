//! Displayed checkout result and its merge rule.

use common::OrderId;
use domain::{GatewayOutcome, PaymentState, PaymentTransaction};
use serde::{Deserialize, Serialize};

use crate::locale::{Locale, MessageKey};

/// The outcome shown on the checkout-result screen.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Success ◄─┐
///           └──► Failed ───┘
/// ```
/// `Success` is sticky: nothing moves it to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Outcome not yet determined.
    #[default]
    Pending,

    /// Payment succeeded.
    Success,

    /// Payment failed or was cancelled.
    Failed,
}

impl ResultStatus {
    /// Returns true if a verified outcome may replace this one.
    pub fn can_become(&self, next: ResultStatus) -> bool {
        !matches!((self, next), (ResultStatus::Success, ResultStatus::Failed))
    }

    /// Returns true if the outcome is determined.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ResultStatus::Pending)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Pending => "pending",
            ResultStatus::Success => "success",
            ResultStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the checkout-result screen displays.
///
/// Built once from the redirect and changed afterwards only by
/// [`ReconciledStatus::apply_verification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledStatus {
    status: ResultStatus,
    message: &'static str,
    order_id: Option<OrderId>,
    locale: Locale,
}

impl ReconciledStatus {
    /// Derives the immediate result from a normalized redirect.
    pub fn from_redirect(
        outcome: &GatewayOutcome,
        order_id: Option<OrderId>,
        locale: Locale,
    ) -> Self {
        let (status, key) = match outcome.is_success {
            Some(true) => (ResultStatus::Success, MessageKey::Succeeded),
            Some(false) => (ResultStatus::Failed, MessageKey::RedirectFailed),
            None => (ResultStatus::Pending, MessageKey::Verifying),
        };
        Self {
            status,
            message: locale.message(key),
            order_id,
            locale,
        }
    }

    /// Merges the backend's payment record into the displayed result.
    ///
    /// A `success` record confirms or upgrades. A `failed` record downgrades
    /// only a result that is not already `success`. A `pending` record
    /// changes nothing. A missing order id is filled from any settled record.
    /// Returns true if anything changed.
    pub fn apply_verification(&mut self, record: &PaymentTransaction) -> bool {
        let (next, key) = match record.status {
            PaymentState::Success => (ResultStatus::Success, MessageKey::Succeeded),
            PaymentState::Failed => (ResultStatus::Failed, MessageKey::VerificationFailed),
            PaymentState::Pending => return false,
        };

        let mut changed = false;
        if self.order_id.is_none() {
            self.order_id = Some(record.order_id.clone());
            changed = true;
        }

        let message = self.locale.message(key);
        if self.status.can_become(next) && (self.status != next || self.message != message) {
            self.status = next;
            self.message = message;
            changed = true;
        }
        changed
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }
}

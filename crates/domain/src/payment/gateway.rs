//! Gateway result normalizer.
//!
//! Each payment gateway redirects the browser back to the storefront with
//! its own query parameters. [`normalize`] folds them into one
//! [`GatewayOutcome`]. Gateways are tried in a fixed priority order and the
//! first whose markers are present wins; a redirect is assumed to come from
//! exactly one gateway, and the order doubles as the tie-break when markers
//! of several gateways show up together.
//!
//! Recognized parameters:
//!
//! | gateway | markers                           | success when                       |
//! |---------|-----------------------------------|------------------------------------|
//! | VNPay   | `vnp_ResponseCode`, `vnp_TxnRef`  | `vnp_ResponseCode == "00"`         |
//! | ZaloPay | `status`, `app_trans_id`          | `status == "1"` or `"success"`     |
//! | MoMo    | `resultCode`, `orderId`, `transId`| `resultCode == "0"` or `status == "success"` |
//! | none    |                                   | `status == "success"`              |
//!
//! A redirect may repeat a parameter. The storefront's own return URL
//! already carries `orderId`, and MoMo appends its `orderId` after it, so
//! lookups read the first occurrence except for MoMo's transaction id, which
//! reads the last.

use common::TransactionId;

use crate::order::PaymentMethod;

/// Query parameters of a gateway redirect, in the order they were sent.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams(Vec<(String, String)>);

impl RedirectParams {
    pub fn new(params: Vec<(String, String)>) -> Self {
        Self(params)
    }

    /// Returns the first value of a parameter, if non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| non_empty(v))
    }

    /// Returns the last value of a parameter, if non-empty.
    pub fn get_last(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| non_empty(v))
    }

    /// Returns true if the parameter carries a non-empty value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

impl From<Vec<(String, String)>> for RedirectParams {
    fn from(params: Vec<(String, String)>) -> Self {
        Self(params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RedirectParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What a redirect says about a payment, before any backend check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GatewayOutcome {
    /// Gateway whose markers matched, if any.
    pub gateway: Option<PaymentMethod>,
    pub transaction_id: Option<TransactionId>,
    /// `None` when the redirect alone does not settle the outcome.
    pub is_success: Option<bool>,
}

const STATUS: &str = "status";
const ORDER_ID: &str = "orderId";

struct GatewayRule {
    gateway: PaymentMethod,
    markers: &'static [&'static str],
    extract: fn(&RedirectParams) -> (Option<TransactionId>, Option<bool>),
}

impl GatewayRule {
    fn matches(&self, params: &RedirectParams) -> bool {
        self.markers.iter().any(|key| params.has(key))
    }

    fn apply(&self, params: &RedirectParams) -> GatewayOutcome {
        let (transaction_id, is_success) = (self.extract)(params);
        GatewayOutcome {
            gateway: Some(self.gateway),
            transaction_id,
            is_success,
        }
    }
}

/// Gateway rules in priority order.
const GATEWAY_RULES: &[GatewayRule] = &[
    GatewayRule {
        gateway: PaymentMethod::VnPay,
        markers: &["vnp_ResponseCode", "vnp_TxnRef"],
        extract: extract_vnpay,
    },
    GatewayRule {
        gateway: PaymentMethod::ZaloPay,
        markers: &[STATUS, "app_trans_id"],
        extract: extract_zalopay,
    },
    GatewayRule {
        gateway: PaymentMethod::Momo,
        markers: &["resultCode", ORDER_ID, "transId"],
        extract: extract_momo,
    },
];

fn transaction_id(params: &RedirectParams, key: &str) -> Option<TransactionId> {
    params.get(key).and_then(TransactionId::parse)
}

fn extract_vnpay(params: &RedirectParams) -> (Option<TransactionId>, Option<bool>) {
    let success = params.get("vnp_ResponseCode").map(|code| code == "00");
    (transaction_id(params, "vnp_TxnRef"), success)
}

// ZaloPay reports its return code through the generic `status` parameter.
fn extract_zalopay(params: &RedirectParams) -> (Option<TransactionId>, Option<bool>) {
    let success = params
        .get(STATUS)
        .map(|code| code == "1" || code == "success");
    (transaction_id(params, "app_trans_id"), success)
}

fn extract_momo(params: &RedirectParams) -> (Option<TransactionId>, Option<bool>) {
    let txn = params
        .get_last(ORDER_ID)
        .and_then(TransactionId::parse)
        .or_else(|| transaction_id(params, "transId"));
    let success = match (params.get("resultCode"), params.get(STATUS)) {
        (None, None) => None,
        (code, status) => Some(code == Some("0") || status == Some("success")),
    };
    (txn, success)
}

fn extract_generic(params: &RedirectParams) -> GatewayOutcome {
    GatewayOutcome {
        gateway: None,
        transaction_id: None,
        is_success: params.get(STATUS).map(|status| status == "success"),
    }
}

/// Interprets the query parameters of a gateway redirect.
///
/// Pure and total: unknown or missing parameters yield an undetermined
/// outcome rather than an error.
pub fn normalize(params: &RedirectParams) -> GatewayOutcome {
    GATEWAY_RULES
        .iter()
        .find(|rule| rule.matches(params))
        .map(|rule| rule.apply(params))
        .unwrap_or_else(|| extract_generic(params))
}

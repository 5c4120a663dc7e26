//! Checkout-result reconciliation.
//!
//! A result is built in two steps. The redirect parameters give an immediate
//! outcome the moment the page mounts. Then, if the redirect named a
//! transaction, a single backend lookup may confirm, upgrade, or downgrade
//! it, but never turn a shown success into a failure.

use std::sync::Arc;
use std::time::Instant;

use common::{OrderId, TransactionId};
use domain::{RedirectParams, normalize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::locale::Locale;
use crate::services::payment::PaymentBackend;
use crate::state::ReconciledStatus;

/// Builds checkout-result views from gateway redirects.
pub struct Reconciler<P: PaymentBackend> {
    backend: Arc<P>,
    locale: Locale,
}

impl<P: PaymentBackend> Clone for Reconciler<P> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            locale: self.locale,
        }
    }
}

impl<P> Reconciler<P>
where
    P: PaymentBackend + 'static,
{
    /// Creates a new reconciler.
    pub fn new(backend: Arc<P>, locale: Locale) -> Self {
        Self { backend, locale }
    }

    /// Mounts a checkout-result view for the given redirect.
    ///
    /// Returns as soon as the redirect outcome is known. The backend lookup,
    /// if any, runs on a spawned task and publishes into the view. Must be
    /// called from within a tokio runtime.
    #[tracing::instrument(skip_all)]
    pub fn mount(&self, params: &RedirectParams) -> CheckoutResultView {
        let outcome = normalize(params);
        let order_id = params.get("orderId").and_then(OrderId::parse);
        let initial = ReconciledStatus::from_redirect(&outcome, order_id, self.locale);

        metrics::counter!("checkout_results_total", "status" => initial.status().as_str())
            .increment(1);
        tracing::info!(
            gateway = outcome.gateway.map(|g| g.as_str()),
            transaction_id = outcome.transaction_id.as_ref().map(TransactionId::as_str),
            status = %initial.status(),
            "checkout result mounted"
        );

        let (tx, rx) = watch::channel(initial);
        let verification = outcome.transaction_id.map(|transaction_id| {
            tokio::spawn(verify(Arc::clone(&self.backend), transaction_id, tx))
        });

        CheckoutResultView { rx, verification }
    }

    /// Mounts a view and waits for its verification to finish.
    pub async fn reconcile(&self, params: &RedirectParams) -> ReconciledStatus {
        self.mount(params).settled().await
    }
}

async fn verify<P: PaymentBackend>(
    backend: Arc<P>,
    transaction_id: TransactionId,
    tx: watch::Sender<ReconciledStatus>,
) {
    let started = Instant::now();
    let result = backend.payment_status(&transaction_id).await;
    metrics::histogram!("payment_verification_duration_seconds")
        .record(started.elapsed().as_secs_f64());

    match result {
        Ok(record) => {
            metrics::counter!("payment_verifications_total", "outcome" => record.status.as_str())
                .increment(1);
            let changed = tx.send_if_modified(|status| status.apply_verification(&record));
            tracing::info!(
                %transaction_id,
                record_status = %record.status,
                changed,
                "payment verified"
            );
        }
        Err(err) => {
            // The redirect outcome stays on screen.
            metrics::counter!("payment_verifications_total", "outcome" => "error").increment(1);
            tracing::warn!(%transaction_id, error = %err, "payment verification failed");
        }
    }
}

/// A mounted checkout-result screen.
///
/// Dropping the view discards whatever the verification later produces.
#[derive(Debug)]
pub struct CheckoutResultView {
    rx: watch::Receiver<ReconciledStatus>,
    verification: Option<JoinHandle<()>>,
}

impl CheckoutResultView {
    /// Returns the latest displayed result.
    pub fn current(&self) -> ReconciledStatus {
        self.rx.borrow().clone()
    }

    /// Returns true while the backend lookup is outstanding.
    pub fn is_verifying(&self) -> bool {
        self.verification
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the next change to the displayed result.
    ///
    /// Returns `None` once no further change can happen.
    pub async fn changed(&mut self) -> Option<ReconciledStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits for the verification to finish and returns the final result.
    pub async fn settled(mut self) -> ReconciledStatus {
        if let Some(handle) = self.verification.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "verification task did not complete");
            }
        }
        self.current()
    }
}

//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use checkout::{
    CheckoutLinks, CheckoutResultView, Locale, OrderBackend, PaymentBackend, ReconciledStatus,
    Reconciler, RepaymentTrigger,
};
use uuid::Uuid;

/// How long a mounted checkout-result view is kept without being opened.
pub const RESULT_VIEW_TTL: Duration = Duration::from_secs(15 * 60);

/// Shared application state accessible from all handlers.
pub struct AppState<P: PaymentBackend, O: OrderBackend> {
    pub reconciler: Reconciler<P>,
    pub repayment: RepaymentTrigger<P>,
    pub orders: Arc<O>,
    pub results: ResultViews,
}

impl<P, O> AppState<P, O>
where
    P: PaymentBackend + 'static,
    O: OrderBackend,
{
    pub fn new(payments: Arc<P>, orders: Arc<O>, links: CheckoutLinks, locale: Locale) -> Self {
        Self {
            reconciler: Reconciler::new(Arc::clone(&payments), locale),
            repayment: RepaymentTrigger::new(payments, links),
            orders,
            results: ResultViews::new(RESULT_VIEW_TTL),
        }
    }
}

struct MountedView {
    mounted_at: Instant,
    view: CheckoutResultView,
}

/// Checkout-result views currently mounted, keyed by result id.
pub struct ResultViews {
    views: RwLock<HashMap<Uuid, MountedView>>,
    ttl: Duration,
}

impl ResultViews {
    pub fn new(ttl: Duration) -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Stores a view under a fresh id, evicting expired views.
    pub fn insert(&self, view: CheckoutResultView) -> Uuid {
        let id = Uuid::new_v4();
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        views.retain(|_, mounted| mounted.mounted_at.elapsed() < ttl);
        views.insert(
            id,
            MountedView {
                mounted_at: Instant::now(),
                view,
            },
        );
        id
    }

    /// Returns the displayed result and whether verification is still running.
    pub fn snapshot(&self, id: &Uuid) -> Option<(ReconciledStatus, bool)> {
        let views = self.views.read().unwrap_or_else(PoisonError::into_inner);
        views
            .get(id)
            .map(|mounted| (mounted.view.current(), mounted.view.is_verifying()))
    }

    /// Unmounts a view, returning its last displayed result.
    pub fn remove(&self, id: &Uuid) -> Option<ReconciledStatus> {
        self.views
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|mounted| mounted.view.current())
    }

    pub fn len(&self) -> usize {
        self.views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

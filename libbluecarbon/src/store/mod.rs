//! Application state store
//!
//! Contains the registry's core architecture:
//! - Actions: What can happen
//! - State: What is true right now
//! - Reducer: Pure function (State, Action, now) -> State
//! - Store: Owns the state, applies actions, notifies subscribers
//!
//! The store is single-threaded: each dispatch runs to completion, and every
//! subscriber has seen the new state before `dispatch` returns. Periodic
//! producers (sensor streams, notification expiry) go through the same
//! dispatch path as user actions.

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::Action;
pub use reducer::{check, reduce};
pub use state::AppState;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{ActionError, RegistryError, Result};
use crate::notifications::{ExpiryTimer, DEFAULT_NOTIFICATION_TTL_MS};
use crate::types::*;

/// Callback invoked with the new state after every applied transition
pub type Subscriber = Box<dyn FnMut(&AppState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Tunables that shape a store but are not part of the seed fixture
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub notification_ttl: std::time::Duration,
    pub activity_retention: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            notification_ttl: std::time::Duration::from_millis(DEFAULT_NOTIFICATION_TTL_MS as u64),
            activity_retention: None,
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            notification_ttl: config.notifications.ttl()?,
            activity_retention: config.activity.retention,
        })
    }
}

/// Owner of the registry state
pub struct Store {
    state: AppState,
    clock: Box<dyn Clock>,
    expiry: ExpiryTimer,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Store {
    /// Store seeded now, on the system clock, with default options
    pub fn new() -> Self {
        Self::with_clock(SystemClock, StoreOptions::default())
    }

    /// Store seeded at the clock's current time
    pub fn with_clock(clock: impl Clock + 'static, options: StoreOptions) -> Self {
        let seeded_at = clock.now();
        let state = AppState::seeded(seeded_at).with_activity_retention(options.activity_retention);
        Self {
            state,
            clock: Box::new(clock),
            expiry: ExpiryTimer::new(options.notification_ttl),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register a view; it is called synchronously after each transition
    pub fn subscribe(&mut self, subscriber: impl FnMut(&AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Apply an action, or report why it would leave the state unchanged
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        if let Err(reason) = check(&self.state, &action) {
            warn!(action = action.name(), %reason, "action rejected");
            return Err(reason.into());
        }
        self.apply(action);
        Ok(())
    }

    /// Apply an action that has already passed `check`
    ///
    /// The state is moved through the reducer, not cloned.
    fn apply(&mut self, action: Action) {
        let now = self.clock.now();
        debug!(action = action.name(), "dispatch");

        let state = std::mem::take(&mut self.state);
        self.state = reducer::transition(state, action, now);
        self.expiry.sync(&self.state.notifications, now);

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
    }

    fn notify(&mut self, notification: NewNotification) {
        self.apply(Action::AddNotification(notification));
    }

    /// Run a dispatch, then post `success` or a warning built from the rejection
    fn dispatch_with_feedback(
        &mut self,
        action: Action,
        success: NewNotification,
        failure_title: &str,
    ) -> Result<()> {
        match self.dispatch(action) {
            Ok(()) => {
                self.notify(success);
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    RegistryError::Action(reason) => reason.to_string(),
                    other => other.to_string(),
                };
                self.notify(NewNotification::warning(failure_title, message));
                Err(e)
            }
        }
    }

    // === Notification expiry ===

    /// When the head notification is due to expire
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.expiry.deadline()
    }

    /// Expire the head notification if its time has come
    pub fn tick(&mut self) -> Option<NotificationId> {
        let id = self.expiry.due(self.clock.now())?;
        debug!(notification = id, "notification expired");
        self.apply(Action::RemoveNotification(id));
        Some(id)
    }

    // === Wallet ===

    pub fn connect_wallet(&mut self, address: impl Into<String>, role: UserRole) {
        let address = address.into();
        info!(%address, ?role, "wallet connected");
        self.apply(Action::ConnectWallet { address, role });
    }

    pub fn disconnect_wallet(&mut self) {
        self.apply(Action::DisconnectWallet);
    }

    pub fn set_user_role(&mut self, role: UserRole) {
        self.apply(Action::SetUserRole(role));
    }

    // === MRV workflow ===

    pub fn submit_mrv(
        &mut self,
        project_id: ProjectId,
        date: NaiveDate,
        location: impl Into<String>,
        files: Vec<SubmissionFile>,
    ) -> Result<SubmissionId> {
        let id = self.state.next_id;
        self.dispatch_with_feedback(
            Action::SubmitMrv {
                project_id,
                date,
                location: location.into(),
                files,
            },
            NewNotification::success(
                "MRV Data Submitted",
                "Your monitoring data has been successfully uploaded and is pending review.",
            ),
            "MRV Submission Failed",
        )?;
        info!(submission = id, project = project_id, "MRV data submitted");
        Ok(id)
    }

    /// Approve a submission; returns the id of the newly issued credit
    pub fn approve_mrv(&mut self, id: SubmissionId) -> Result<CreditId> {
        let credit_id = self.state.next_id;
        self.dispatch_with_feedback(
            Action::ApproveMrv { id },
            NewNotification::success(
                "MRV Approved & Credits Issued",
                "Monitoring data approved. Credits have been issued and dashboard updated.",
            ),
            "MRV Not Approved",
        )?;
        info!(
            submission = id,
            credit = credit_id,
            amount = reducer::CREDITS_PER_APPROVAL,
            "credits issued"
        );
        Ok(credit_id)
    }

    pub fn reject_mrv(&mut self, id: SubmissionId, reason: Option<String>) -> Result<()> {
        self.dispatch_with_feedback(
            Action::RejectMrv { id, reason },
            NewNotification::error(
                "MRV Rejected",
                "Monitoring data has been rejected. Please review and resubmit.",
            ),
            "MRV Not Rejected",
        )
    }

    // === Credits ===

    /// Retire a whole credit batch
    pub fn retire_credit(&mut self, id: CreditId) -> Result<()> {
        let (amount, project_name) = match self.state.credit(id) {
            Some(credit) => (credit.amount, credit.project_name.clone()),
            None => (0, state::UNKNOWN_PROJECT.to_string()),
        };
        self.dispatch_with_feedback(
            Action::RetireCredit {
                id,
                amount,
                project_name,
            },
            NewNotification::info(
                "Credit Retired",
                format!("{} carbon credits have been permanently retired.", amount),
            ),
            "Credit Not Retired",
        )?;
        info!(credit = id, amount, "credit retired");
        Ok(())
    }

    // === Feedback ===

    pub fn add_notification(&mut self, notification: NewNotification) -> NotificationId {
        let id = self.state.next_id;
        self.notify(notification);
        id
    }

    pub fn remove_notification(&mut self, id: NotificationId) {
        self.apply(Action::RemoveNotification(id));
    }

    pub fn add_activity(&mut self, activity: NewActivity) -> ActivityId {
        let id = self.state.next_id;
        self.apply(Action::AddActivity(activity));
        id
    }

    // === Sensors ===

    pub fn toggle_sensor(&mut self, project_id: ProjectId, enabled: bool) {
        info!(project = project_id, enabled, "sensor toggled");
        self.apply(Action::ToggleSensor {
            project_id,
            enabled,
        });
    }

    pub fn push_sensor_sample(&mut self, project_id: ProjectId, sample: SensorSample) {
        self.apply(Action::PushSensorSample { project_id, sample });
    }

    // === Marketplace ===

    pub fn place_buy_order(
        &mut self,
        listing_id: ListingId,
        quantity: u64,
        buyer: BuyerInfo,
    ) -> Result<OrderId> {
        let id = self.state.next_id;
        let buyer_name = buyer.name.clone();
        self.dispatch_with_feedback(
            Action::PlaceBuyOrder {
                listing_id,
                quantity,
                buyer,
            },
            NewNotification::success(
                "Order Placed",
                format!("Successfully placed order for {} carbon credits", quantity),
            ),
            "Order Rejected",
        )?;
        info!(order = id, listing = listing_id, quantity, buyer = %buyer_name, "buy order placed");
        Ok(id)
    }

    pub fn create_listing(&mut self, listing: NewListing) -> Result<ListingId> {
        let id = self.state.next_id;
        self.dispatch_with_feedback(
            Action::CreateListing(listing),
            NewNotification::success(
                "Listing Created",
                "Your carbon credits are now available for purchase",
            ),
            "Listing Not Created",
        )?;
        info!(listing = id, "listing created");
        Ok(id)
    }

    pub fn update_listing_status(&mut self, listing_id: ListingId, status: ListingStatus) -> Result<()> {
        self.dispatch(Action::UpdateListingStatus { listing_id, status })
    }

    pub fn complete_order(&mut self, order_id: OrderId) -> Result<()> {
        self.dispatch_with_feedback(
            Action::CompleteOrder(order_id),
            NewNotification::success(
                "Transaction Complete",
                "Carbon credits have been transferred to buyer",
            ),
            "Order Not Completed",
        )?;
        info!(order = order_id, "order completed");
        Ok(())
    }

    // === Geographic ===

    pub fn update_project_coverage(
        &mut self,
        project_id: ProjectId,
        coverage: f64,
        biomass: f64,
    ) -> Result<()> {
        self.dispatch(Action::UpdateProjectCoverage {
            project_id,
            coverage,
            biomass,
        })
    }

    // === Demo ===

    pub fn reset_demo(&mut self) {
        info!("demo state reset");
        self.apply(Action::ResetDemo);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("expiry", &self.expiry)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Reason carried by a rejected store call, if it was an action rejection
pub fn rejection(error: &RegistryError) -> Option<&ActionError> {
    match error {
        RegistryError::Action(reason) => Some(reason),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn store() -> (Store, ManualClock) {
        let clock = ManualClock::new(t0());
        (Store::with_clock(clock.clone(), StoreOptions::default()), clock)
    }

    #[test]
    fn test_subscribers_see_state_before_dispatch_returns() {
        let (mut store, _) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |state: &AppState| sink.borrow_mut().push(state.wallet.connected));

        store.connect_wallet("0xabc", UserRole::Ngo);
        assert_eq!(*seen.borrow(), vec![true]);

        store.disconnect_wallet();
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_unsubscribe_stops_callbacks() {
        let (mut store, _) = store();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let id = store.subscribe(move |_: &AppState| *counter.borrow_mut() += 1);

        store.set_user_role(UserRole::Admin);
        assert!(store.unsubscribe(id));
        store.set_user_role(UserRole::Community);

        assert_eq!(*calls.borrow(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_dispatch_matches_pure_reduce() {
        let (mut store, _) = store();
        let before = store.state().clone();
        let action = Action::PlaceBuyOrder {
            listing_id: 2,
            quantity: 300,
            buyer: BuyerInfo::new("corp-003", "Harbor Logistics"),
        };

        store.dispatch(action.clone()).unwrap();
        assert_eq!(*store.state(), reduce(before, action, t0()));
    }

    #[test]
    fn test_rejected_dispatch_leaves_state_untouched() {
        let (mut store, _) = store();
        let before = store.state().clone();
        let result = store.dispatch(Action::CompleteOrder(404));
        assert_eq!(
            result.as_ref().err().and_then(rejection),
            Some(&ActionError::UnknownOrder(404))
        );
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_helper_posts_success_notification() {
        let (mut store, _) = store();
        let credit_id = store.approve_mrv(1).unwrap();
        assert!(store.state().credit(credit_id).is_some());

        let head = &store.state().notifications[0];
        assert_eq!(head.kind, NotificationKind::Success);
        assert_eq!(head.title, "MRV Approved & Credits Issued");
    }

    #[test]
    fn test_helper_posts_warning_on_rejection() {
        let (mut store, _) = store();
        let err = store.approve_mrv(999).unwrap_err();
        assert_eq!(rejection(&err), Some(&ActionError::UnknownSubmission(999)));

        let head = &store.state().notifications[0];
        assert_eq!(head.kind, NotificationKind::Warning);
        assert_eq!(head.title, "MRV Not Approved");
        assert_eq!(store.state().carbon_credits.len(), 5);
    }

    #[test]
    fn test_reject_posts_error_notification() {
        let (mut store, _) = store();
        store.reject_mrv(1, None).unwrap();
        assert_eq!(store.state().notifications[0].kind, NotificationKind::Error);
    }

    #[test]
    fn test_retire_credit_looks_up_amount() {
        let (mut store, _) = store();
        store.retire_credit(4).unwrap();
        assert_eq!(store.state().credit(4).unwrap().status, CreditStatus::Retired);
        assert_eq!(
            store.state().activities[0].description,
            "1250 credits retired from Gujarat Mangrove Expansion"
        );
        assert_eq!(
            store.state().notifications[0].message,
            "1250 carbon credits have been permanently retired."
        );
    }

    #[test]
    fn test_notifications_drain_oldest_first() {
        let (mut store, clock) = store();
        let first = store.add_notification(NewNotification::info("one", ""));
        clock.advance(Duration::seconds(2));
        let second = store.add_notification(NewNotification::info("two", ""));

        // Head was armed at t0; the second entry does not push it back
        assert_eq!(store.next_deadline(), Some(t0() + Duration::seconds(5)));
        clock.advance(Duration::seconds(2));
        assert_eq!(store.tick(), None);

        clock.advance(Duration::seconds(1));
        assert_eq!(store.tick(), Some(first));
        assert_eq!(store.state().notifications.len(), 1);

        // The second waits a full TTL from when it became head
        assert_eq!(store.next_deadline(), Some(clock.now() + Duration::seconds(5)));
        clock.advance(Duration::seconds(5));
        assert_eq!(store.tick(), Some(second));
        assert!(store.state().notifications.is_empty());
        assert!(store.next_deadline().is_none());
    }

    #[test]
    fn test_manual_removal_rearms_for_next_head() {
        let (mut store, clock) = store();
        let first = store.add_notification(NewNotification::info("one", ""));
        store.add_notification(NewNotification::info("two", ""));
        clock.advance(Duration::seconds(4));

        store.remove_notification(first);
        assert_eq!(store.next_deadline(), Some(clock.now() + Duration::seconds(5)));
    }

    #[test]
    fn test_options_apply_retention_to_seed() {
        let clock = ManualClock::new(t0());
        let store = Store::with_clock(
            clock,
            StoreOptions {
                notification_ttl: std::time::Duration::from_secs(1),
                activity_retention: Some(1),
            },
        );
        assert_eq!(store.state().activities.len(), 1);
        assert_eq!(store.state().activity_retention, Some(1));
    }

    #[test]
    fn test_reset_demo_restores_seed() {
        let (mut store, clock) = store();
        let seed = store.state().clone();

        store.submit_mrv(1, t0().date_naive(), "Sector C", Vec::new()).unwrap();
        store.toggle_sensor(3, true);
        clock.advance(Duration::minutes(10));
        store.reset_demo();

        assert_eq!(store.state(), &seed);
    }
}

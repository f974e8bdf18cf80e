//! Actions for the reducer pattern
//!
//! All state transitions are triggered by actions. This module defines
//! every action that can modify the registry state.

use chrono::NaiveDate;

use crate::types::*;

/// Actions that trigger state transitions
///
/// Actions are plain data describing what should happen; the reducer
/// (see `reducer.rs`) is responsible for applying them to state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // === Wallet ===
    ConnectWallet {
        address: String,
        role: UserRole,
    },

    DisconnectWallet,

    SetUserRole(UserRole),

    // === MRV workflow ===
    /// Create a Pending submission for a project
    SubmitMrv {
        project_id: ProjectId,
        date: NaiveDate,
        location: String,
        files: Vec<SubmissionFile>,
    },

    /// Approve a Pending submission and issue credits to its project
    ApproveMrv {
        id: SubmissionId,
    },

    RejectMrv {
        id: SubmissionId,
        reason: Option<String>,
    },

    // === Credits ===
    RetireCredit {
        id: CreditId,
        amount: u64,
        project_name: String,
    },

    // === Feedback ===
    AddNotification(NewNotification),

    RemoveNotification(NotificationId),

    AddActivity(NewActivity),

    // === Sensors ===
    ToggleSensor {
        project_id: ProjectId,
        enabled: bool,
    },

    PushSensorSample {
        project_id: ProjectId,
        sample: SensorSample,
    },

    // === Marketplace ===
    PlaceBuyOrder {
        listing_id: ListingId,
        quantity: u64,
        buyer: BuyerInfo,
    },

    CreateListing(NewListing),

    UpdateListingStatus {
        listing_id: ListingId,
        status: ListingStatus,
    },

    CompleteOrder(OrderId),

    // === Geographic ===
    /// Record a new coverage survey for a project
    UpdateProjectCoverage {
        project_id: ProjectId,
        coverage: f64,
        biomass: f64,
    },

    // === Demo ===
    /// Replace the whole state with the seed fixture
    ResetDemo,
}

impl Action {
    /// Stable name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::ConnectWallet { .. } => "connect_wallet",
            Action::DisconnectWallet => "disconnect_wallet",
            Action::SetUserRole(_) => "set_user_role",
            Action::SubmitMrv { .. } => "submit_mrv",
            Action::ApproveMrv { .. } => "approve_mrv",
            Action::RejectMrv { .. } => "reject_mrv",
            Action::RetireCredit { .. } => "retire_credit",
            Action::AddNotification(_) => "add_notification",
            Action::RemoveNotification(_) => "remove_notification",
            Action::AddActivity(_) => "add_activity",
            Action::ToggleSensor { .. } => "toggle_sensor",
            Action::PushSensorSample { .. } => "push_sensor_sample",
            Action::PlaceBuyOrder { .. } => "place_buy_order",
            Action::CreateListing(_) => "create_listing",
            Action::UpdateListingStatus { .. } => "update_listing_status",
            Action::CompleteOrder(_) => "complete_order",
            Action::UpdateProjectCoverage { .. } => "update_project_coverage",
            Action::ResetDemo => "reset_demo",
        }
    }
}

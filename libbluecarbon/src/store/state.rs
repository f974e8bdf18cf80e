//! Application state
//!
//! Immutable state structure following functional programming principles.
//! All state transitions happen through the reducer (see `reducer.rs`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Root application state
///
/// This is the single source of truth for the whole registry. Every
/// transition consumes the previous value and returns a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Anchor the seed fixture was built from; `ResetDemo` rebuilds from it
    pub seeded_at: DateTime<Utc>,

    /// Next id handed out to any created entity
    pub next_id: u64,

    /// Optional cap on the activity log; `None` keeps everything
    pub activity_retention: Option<usize>,

    pub wallet: WalletSession,

    pub projects: Vec<Project>,
    pub carbon_credits: Vec<CarbonCredit>,
    pub mrv_submissions: Vec<MrvSubmission>,

    /// Oldest first; the head is the next to expire
    pub notifications: Vec<Notification>,

    /// Newest first
    pub activities: Vec<Activity>,

    pub sensors: BTreeMap<ProjectId, Sensor>,
    pub sensor_streams: BTreeMap<ProjectId, Vec<SensorSample>>,

    pub marketplace: Marketplace,
    pub geographic_data: GeographicData,
}

impl AppState {
    /// Seeded demo state anchored at `anchor`
    pub fn seeded(anchor: DateTime<Utc>) -> Self {
        crate::seed::initial_state(anchor)
    }

    /// Same state with an activity log cap applied
    pub fn with_activity_retention(self, retention: Option<usize>) -> Self {
        let mut activities = self.activities;
        if let Some(cap) = retention {
            activities.truncate(cap);
        }
        Self {
            activity_retention: retention,
            activities,
            ..self
        }
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn submission(&self, id: SubmissionId) -> Option<&MrvSubmission> {
        self.mrv_submissions.iter().find(|s| s.id == id)
    }

    pub fn credit(&self, id: CreditId) -> Option<&CarbonCredit> {
        self.carbon_credits.iter().find(|c| c.id == id)
    }

    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.marketplace.listings.iter().find(|l| l.id == id)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.marketplace.orders.iter().find(|o| o.id == id)
    }

    pub fn sensor(&self, project_id: ProjectId) -> Option<&Sensor> {
        self.sensors.get(&project_id)
    }

    /// Samples for a project, oldest first
    pub fn stream(&self, project_id: ProjectId) -> &[SensorSample] {
        self.sensor_streams
            .get(&project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display name for a project, falling back for unknown ids
    pub fn project_name(&self, id: ProjectId) -> String {
        self.project(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_PROJECT.to_string())
    }
}

/// Label used when a submission references a project the registry lacks
pub const UNKNOWN_PROJECT: &str = "Unknown Project";

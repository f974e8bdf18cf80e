//! Derived read-only views over the state
//!
//! Aggregates a dashboard would compute on every render. They are plain
//! functions of `&AppState` (plus `now` where a time window is involved),
//! so consumers can recompute them after each notification from the store.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::sensors::round_to;
use crate::store::AppState;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryOverview {
    pub total_projects: usize,
    pub total_credits_issued: u64,
    pub approved_projects: usize,
    pub pending_projects: usize,
    pub rejected_projects: usize,
}

pub fn registry_overview(state: &AppState) -> RegistryOverview {
    let count = |status: ProjectStatus| state.projects.iter().filter(|p| p.status == status).count();
    RegistryOverview {
        total_projects: state.projects.len(),
        total_credits_issued: state.projects.iter().map(|p| p.credits_issued).sum(),
        approved_projects: count(ProjectStatus::Approved),
        pending_projects: count(ProjectStatus::Pending),
        rejected_projects: count(ProjectStatus::Rejected),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPortfolio {
    pub total_batches: usize,
    pub active_amount: u64,
    /// Sum of amount × price over active batches
    pub active_value: f64,
    pub pending_batches: usize,
    pub retired_amount: u64,
}

pub fn credit_portfolio(state: &AppState) -> CreditPortfolio {
    let active = || {
        state
            .carbon_credits
            .iter()
            .filter(|c| c.status == CreditStatus::Active)
    };
    CreditPortfolio {
        total_batches: state.carbon_credits.len(),
        active_amount: active().map(|c| c.amount).sum(),
        active_value: active().map(|c| c.amount as f64 * c.price).sum(),
        pending_batches: state
            .carbon_credits
            .iter()
            .filter(|c| c.status == CreditStatus::Pending)
            .count(),
        retired_amount: state
            .carbon_credits
            .iter()
            .filter(|c| c.status == CreditStatus::Retired)
            .map(|c| c.amount)
            .sum(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceStats {
    pub active_listings: usize,
    /// Credits still for sale in active listings
    pub credits_available: u64,
    /// Mean asking price across every listing, rounded to cents
    pub average_price: f64,
    /// Value of completed orders
    pub completed_volume: f64,
}

pub fn marketplace_stats(state: &AppState) -> MarketplaceStats {
    let listings = &state.marketplace.listings;
    let active = || listings.iter().filter(|l| l.status == ListingStatus::Active);

    let average_price = if listings.is_empty() {
        0.0
    } else {
        let total: f64 = listings.iter().map(|l| l.price_per_credit).sum();
        round_to(total / listings.len() as f64, 2)
    };

    MarketplaceStats {
        active_listings: active().count(),
        credits_available: active().map(|l| l.quantity).sum(),
        average_price,
        completed_volume: state
            .marketplace
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .map(|o| o.total_amount)
            .sum(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MrvQueue {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

pub fn mrv_queue(state: &AppState) -> MrvQueue {
    let count = |status: SubmissionStatus| {
        state
            .mrv_submissions
            .iter()
            .filter(|s| s.status == status)
            .count()
    };
    MrvQueue {
        pending: count(SubmissionStatus::Pending),
        approved: count(SubmissionStatus::Approved),
        rejected: count(SubmissionStatus::Rejected),
        total: state.mrv_submissions.len(),
    }
}

/// Pending submissions, oldest first, for a reviewer's queue
pub fn pending_submissions(state: &AppState) -> Vec<&MrvSubmission> {
    state
        .mrv_submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Pending)
        .collect()
}

/// Restoration progress judged from the latest coverage survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageBand {
    Excellent,
    Good,
    NeedsAttention,
    NoData,
}

impl CoverageBand {
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage >= 60.0 {
            Self::Excellent
        } else if coverage >= 40.0 {
            Self::Good
        } else if coverage >= 20.0 {
            Self::NeedsAttention
        } else {
            Self::NoData
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoOverview {
    pub total_area: f64,
    /// Mean of each project's latest coverage; projects without surveys count as 0
    pub average_coverage: f64,
    pub bands: BTreeMap<ProjectId, CoverageBand>,
}

/// Latest surveyed coverage for a project, 0 when it has no survey
pub fn latest_coverage(geo: &ProjectGeo) -> f64 {
    geo.growth_data.last().map(|p| p.coverage).unwrap_or(0.0)
}

pub fn geo_overview(state: &AppState) -> GeoOverview {
    let projects = &state.geographic_data.projects;
    let average_coverage = if projects.is_empty() {
        0.0
    } else {
        projects.values().map(latest_coverage).sum::<f64>() / projects.len() as f64
    };

    GeoOverview {
        total_area: projects.values().map(|p| p.area).sum(),
        average_coverage,
        bands: projects
            .iter()
            .map(|(id, geo)| (*id, CoverageBand::from_coverage(latest_coverage(geo))))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorAverages {
    pub samples: usize,
    #[serde(rename = "co2ppm")]
    pub co2_ppm: f64,
    pub temperature: f64,
    pub dissolved_oxygen: f64,
    pub salinity: f64,
    pub soil_carbon: f64,
    pub sequestration_rate: f64,
    pub co2_absorbed: f64,
}

/// Means over a stream at display precision; `None` for an empty stream
pub fn sensor_averages(stream: &[SensorSample]) -> Option<SensorAverages> {
    if stream.is_empty() {
        return None;
    }
    let n = stream.len() as f64;
    let mean = |field: fn(&SensorSample) -> f64| stream.iter().map(field).sum::<f64>() / n;

    Some(SensorAverages {
        samples: stream.len(),
        co2_ppm: round_to(mean(|s| s.co2_ppm), 2),
        temperature: round_to(mean(|s| s.temperature), 1),
        dissolved_oxygen: round_to(mean(|s| s.dissolved_oxygen), 2),
        salinity: round_to(mean(|s| s.salinity), 1),
        soil_carbon: round_to(mean(|s| s.soil_carbon), 2),
        sequestration_rate: round_to(mean(|s| s.sequestration_rate), 4),
        co2_absorbed: round_to(mean(|s| s.co2_absorbed), 3),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryLevel {
    Good,
    Low,
    Critical,
}

impl BatteryLevel {
    /// Unknown charge is treated as healthy
    pub fn from_charge(battery: Option<f64>) -> Self {
        match battery {
            None => Self::Good,
            Some(level) if level > 50.0 => Self::Good,
            Some(level) if level > 20.0 => Self::Low,
            Some(_) => Self::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub today: usize,
    pub this_week: usize,
    pub total: usize,
}

/// Activity counts for the current UTC day and the trailing seven days
pub fn activity_stats(state: &AppState, now: DateTime<Utc>) -> ActivityStats {
    let today = now.date_naive();
    let week_ago = now - Duration::days(7);
    ActivityStats {
        today: state
            .activities
            .iter()
            .filter(|a| a.timestamp.date_naive() == today)
            .count(),
        this_week: activities_since(state, week_ago).count(),
        total: state.activities.len(),
    }
}

/// Activities strictly after `since`, newest first
pub fn activities_since(state: &AppState, since: DateTime<Utc>) -> impl Iterator<Item = &Activity> {
    state.activities.iter().filter(move |a| a.timestamp > since)
}

//! Core types for the blue carbon registry
//!
//! Every entity serializes with camelCase field names so a state snapshot
//! reads the same way the registry's views consume it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ProjectId = u64;
pub type SubmissionId = u64;
pub type CreditId = u64;
pub type NotificationId = u64;
pub type ActivityId = u64;
pub type ListingId = u64;
pub type OrderId = u64;

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub location: String,
    pub description: String,
    pub credits_issued: u64,
    pub status: ProjectStatus,
    pub verifier: String,
    /// Display area, e.g. "2,500 hectares"
    pub area: String,
    pub ecosystem: String,
    pub start_date: NaiveDate,
    /// Expected ceiling for `credits_issued`; not enforced
    pub estimated_credits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A file attached to an MRV submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionFile {
    pub name: String,
    /// Size in megabytes
    #[serde(rename = "size")]
    pub size_mb: f64,
}

impl SubmissionFile {
    pub fn new(name: impl Into<String>, size_mb: f64) -> Self {
        Self {
            name: name.into(),
            size_mb,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MrvSubmission {
    pub id: SubmissionId,
    pub project_id: ProjectId,
    /// Snapshot of the project name at submission time
    pub project_name: String,
    pub date: NaiveDate,
    pub location: String,
    pub files: Vec<SubmissionFile>,
    pub status: SubmissionStatus,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CreditStatus {
    Active,
    Pending,
    Retired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCredit {
    pub id: CreditId,
    pub token_id: String,
    pub project_id: ProjectId,
    pub project_name: String,
    pub token_type: String,
    pub amount: u64,
    pub status: CreditStatus,
    pub issued_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub verifier: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Feedback
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Notification payload before the store stamps an id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title, message)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ProjectCreated,
    MrvSubmitted,
    MrvApproved,
    MrvRejected,
    CreditRetired,
    OrderPlaced,
    ListingCreated,
    OrderCompleted,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}

/// Activity payload for externally recorded events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub user: String,
}

// ============================================================================
// Wallet
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "NGO")]
    Ngo,
    Community,
    Admin,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ngo" => Ok(UserRole::Ngo),
            "community" => Ok(UserRole::Community),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!(
                "Invalid role: '{}'. Valid options: ngo, community, admin",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub connected: bool,
    pub address: Option<String>,
    pub role: Option<UserRole>,
}

// ============================================================================
// Sensors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub enabled: bool,
    pub last_seen: Option<DateTime<Utc>>,
    /// Charge level, 0-100
    pub battery: Option<f64>,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorSample {
    pub timestamp: DateTime<Utc>,
    pub time_string: String,
    #[serde(rename = "co2ppm")]
    pub co2_ppm: f64,
    pub temperature: f64,
    pub dissolved_oxygen: f64,
    pub salinity: f64,
    pub soil_carbon: f64,
    pub turbidity: f64,
    pub ph: f64,
    /// tCO2e/day
    pub sequestration_rate: f64,
    pub co2_absorbed: f64,
}

// ============================================================================
// Marketplace
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Paused,
    SoldOut,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: u64,
    pub seller_name: String,
    pub project_id: ProjectId,
    pub project_name: String,
    pub credit_type: String,
    /// Remaining credits; decremented by buy orders
    pub quantity: u64,
    pub price_per_credit: f64,
    /// Value of the listing as originally posted
    pub total_value: f64,
    pub vintage: i32,
    pub status: ListingStatus,
    pub expiry_date: NaiveDate,
    pub verifier: String,
    pub location: String,
    pub ecosystem: String,
    pub listed_at: DateTime<Utc>,
    pub description: String,
}

/// Listing payload before the store assigns id, status and listing time
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub seller_id: u64,
    pub seller_name: String,
    pub project_id: ProjectId,
    pub project_name: String,
    pub credit_type: String,
    pub quantity: u64,
    pub price_per_credit: f64,
    pub vintage: i32,
    pub expiry_date: NaiveDate,
    pub verifier: String,
    pub location: String,
    pub ecosystem: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: String,
    pub buyer_name: String,
    pub listing_id: ListingId,
    pub quantity: u64,
    pub price_per_credit: f64,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

/// Who is placing a buy order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerInfo {
    pub id: String,
    pub name: String,
}

impl BuyerInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub name: String,
    pub sector: String,
    pub size: String,
    /// Annual footprint in tCO2e
    pub carbon_footprint: u64,
    /// Percentage of the footprint the buyer aims to offset
    pub offset_goal: u32,
    pub wallet: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Marketplace {
    pub listings: Vec<Listing>,
    pub orders: Vec<Order>,
    pub buyers: Vec<Buyer>,
}

// ============================================================================
// Geographic data
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub date: NaiveDate,
    /// Canopy/bed coverage, percent
    pub coverage: f64,
    pub biomass: f64,
    #[serde(rename = "co2Sequestered")]
    pub co2_sequestered: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGeo {
    /// [latitude, longitude]
    pub coordinates: [f64; 2],
    pub bounds: [[f64; 2]; 2],
    /// Hectares
    pub area: f64,
    pub ecosystem: String,
    pub before_image: String,
    pub after_image: String,
    pub growth_data: Vec<GrowthPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeographicData {
    pub projects: BTreeMap<ProjectId, ProjectGeo>,
    pub total_area: f64,
    #[serde(rename = "totalCO2Sequestered")]
    pub total_co2_sequestered: f64,
    pub average_coverage: f64,
    /// Ecosystem name -> share of registry area, percent
    pub ecosystem_distribution: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_str() {
        assert_eq!("ngo".parse::<UserRole>().unwrap(), UserRole::Ngo);
        assert_eq!("NGO".parse::<UserRole>().unwrap(), UserRole::Ngo);
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("verifier".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_role_serializes_ngo_uppercase() {
        let json = serde_json::to_string(&UserRole::Ngo).unwrap();
        assert_eq!(json, "\"NGO\"");
    }

    #[test]
    fn test_notification_kind_wire_format() {
        let json = serde_json::to_string(&NotificationKind::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_listing_status_wire_format() {
        let json = serde_json::to_string(&ListingStatus::SoldOut).unwrap();
        assert_eq!(json, "\"sold_out\"");
    }

    #[test]
    fn test_sensor_sample_field_names() {
        let sample = SensorSample {
            timestamp: chrono::Utc::now(),
            time_string: "10:00:00".to_string(),
            co2_ppm: 412.5,
            temperature: 27.1,
            dissolved_oxygen: 6.2,
            salinity: 30.4,
            soil_carbon: 2.8,
            turbidity: 2.1,
            ph: 8.05,
            sequestration_rate: 0.0031,
            co2_absorbed: 0.413,
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert!(value.get("co2ppm").is_some());
        assert!(value.get("dissolvedOxygen").is_some());
        assert!(value.get("sequestrationRate").is_some());
    }

    #[test]
    fn test_submission_file_size_field() {
        let file = SubmissionFile::new("survey.pdf", 2.4);
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["size"], 2.4);
    }
}

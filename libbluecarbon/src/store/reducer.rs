//! Pure reducer function for state transitions
//!
//! The reducer is a pure function: `(State, Action, now) -> State`.
//! The dispatch timestamp is an input rather than read from a clock, and
//! ids come from the counter carried in the state, so the same inputs always
//! produce the same output.
//!
//! Invalid actions never fail here. They leave the state unchanged; `check`
//! reports why so the store can surface it to callers.

use chrono::{DateTime, Datelike, Duration, Utc};

use super::actions::Action;
use super::state::AppState;
use crate::error::ActionError;
use crate::types::*;

/// Credits minted for a project each time one of its MRV submissions is approved
pub const CREDITS_PER_APPROVAL: u64 = 500;

/// Number of samples kept per sensor stream
pub const SENSOR_WINDOW: usize = 180;

/// Battery lost per pushed sample
pub const BATTERY_DRAIN_PER_SAMPLE: f64 = 0.002;

/// Battery never reported below this level
pub const BATTERY_FLOOR: f64 = 5.0;

/// Lifetime of a freshly issued credit
pub const CREDIT_LIFETIME_DAYS: i64 = 10 * 365;

/// Price per credit for credits minted on approval (INR)
pub const ISSUED_CREDIT_PRICE: f64 = 2_075.0;

/// tCO2e sequestered per unit of surveyed biomass
pub const CO2_PER_BIOMASS: f64 = 10.0;

const DEFAULT_BATTERY_ON_TOGGLE: f64 = 80.0;
const DEFAULT_BATTERY_ON_SAMPLE: f64 = 90.0;
const REVIEWER: &str = "Admin";
const ISSUING_VERIFIER: &str = "Admin Verifier";
const CREDIT_TYPE: &str = "Blue Carbon Credit";

/// Check whether an action would change the state
///
/// Submitting MRV data for an unknown project is accepted: the submission
/// proceeds under the "Unknown Project" label.
pub fn check(state: &AppState, action: &Action) -> Result<(), ActionError> {
    match action {
        Action::ApproveMrv { id } | Action::RejectMrv { id, .. } => {
            let submission = state
                .submission(*id)
                .ok_or(ActionError::UnknownSubmission(*id))?;
            if submission.status != SubmissionStatus::Pending {
                return Err(ActionError::SubmissionNotPending(*id));
            }
            Ok(())
        }

        Action::RetireCredit { id, .. } => {
            let credit = state.credit(*id).ok_or(ActionError::UnknownCredit(*id))?;
            if credit.status != CreditStatus::Active {
                return Err(ActionError::CreditNotActive(*id));
            }
            Ok(())
        }

        Action::PlaceBuyOrder {
            listing_id,
            quantity,
            ..
        } => {
            if *quantity == 0 {
                return Err(ActionError::ZeroQuantity);
            }
            let listing = state
                .listing(*listing_id)
                .ok_or(ActionError::UnknownListing(*listing_id))?;
            if listing.quantity < *quantity {
                return Err(ActionError::InsufficientQuantity {
                    available: listing.quantity,
                    requested: *quantity,
                });
            }
            Ok(())
        }

        Action::UpdateListingStatus { listing_id, .. } => state
            .listing(*listing_id)
            .map(|_| ())
            .ok_or(ActionError::UnknownListing(*listing_id)),

        Action::CompleteOrder(id) => {
            let order = state.order(*id).ok_or(ActionError::UnknownOrder(*id))?;
            if order.status == OrderStatus::Completed {
                return Err(ActionError::OrderAlreadyCompleted(*id));
            }
            Ok(())
        }

        Action::UpdateProjectCoverage { project_id, .. } => {
            if state.geographic_data.projects.contains_key(project_id) {
                Ok(())
            } else {
                Err(ActionError::UnknownGeoProject(*project_id))
            }
        }

        Action::ConnectWallet { .. }
        | Action::DisconnectWallet
        | Action::SetUserRole(_)
        | Action::SubmitMrv { .. }
        | Action::AddNotification(_)
        | Action::RemoveNotification(_)
        | Action::AddActivity(_)
        | Action::ToggleSensor { .. }
        | Action::PushSensorSample { .. }
        | Action::CreateListing(_)
        | Action::ResetDemo => Ok(()),
    }
}

/// Pure reducer function
///
/// Takes current state, an action and the dispatch time, returns new state.
///
/// # Purity Guarantees
///
/// - No I/O, no clock reads, no randomness
/// - No mutation of the caller's state (it is consumed and rebuilt)
/// - Deterministic (same inputs -> same output)
pub fn reduce(state: AppState, action: Action, now: DateTime<Utc>) -> AppState {
    if check(&state, &action).is_err() {
        return state;
    }
    transition(state, action, now)
}

/// `reduce` without the guard; the caller must already have run `check`
pub(crate) fn transition(state: AppState, action: Action, now: DateTime<Utc>) -> AppState {
    match action {
        // === Wallet ===
        Action::ConnectWallet { address, role } => AppState {
            wallet: WalletSession {
                connected: true,
                address: Some(address),
                role: Some(role),
            },
            ..state
        },

        Action::DisconnectWallet => AppState {
            wallet: WalletSession::default(),
            ..state
        },

        Action::SetUserRole(role) => AppState {
            wallet: WalletSession {
                role: Some(role),
                ..state.wallet
            },
            ..state
        },

        // === MRV workflow ===
        Action::SubmitMrv {
            project_id,
            date,
            location,
            files,
        } => {
            let submission_id = state.next_id;
            let project_name = state.project_name(project_id);
            let activity = activity(
                submission_id + 1,
                ActivityKind::MrvSubmitted,
                "MRV Data Submitted",
                format!("New monitoring data uploaded for {}", project_name),
                "You",
                now,
            );

            let mut mrv_submissions = state.mrv_submissions;
            mrv_submissions.push(MrvSubmission {
                id: submission_id,
                project_id,
                project_name,
                date,
                location,
                files,
                status: SubmissionStatus::Pending,
                submitted_by: "Current User".to_string(),
                submitted_at: now,
                approved_by: None,
                approved_at: None,
                rejected_by: None,
                rejected_at: None,
                rejection_reason: None,
            });

            AppState {
                next_id: submission_id + 2,
                mrv_submissions,
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        Action::ApproveMrv { id } => {
            let Some(submission) = state.submission(id).cloned() else {
                return state;
            };
            let credit_id = state.next_id;

            let mrv_submissions = state
                .mrv_submissions
                .into_iter()
                .map(|sub| {
                    if sub.id == id {
                        MrvSubmission {
                            status: SubmissionStatus::Approved,
                            approved_by: Some(REVIEWER.to_string()),
                            approved_at: Some(now),
                            ..sub
                        }
                    } else {
                        sub
                    }
                })
                .collect();

            let projects = state
                .projects
                .into_iter()
                .map(|project| {
                    if project.id == submission.project_id {
                        Project {
                            status: ProjectStatus::Approved,
                            credits_issued: project.credits_issued + CREDITS_PER_APPROVAL,
                            updated_at: Some(now),
                            ..project
                        }
                    } else {
                        project
                    }
                })
                .collect();

            let mut carbon_credits = state.carbon_credits;
            carbon_credits.push(CarbonCredit {
                id: credit_id,
                token_id: token_id(credit_id, now),
                project_id: submission.project_id,
                project_name: submission.project_name.clone(),
                token_type: CREDIT_TYPE.to_string(),
                amount: CREDITS_PER_APPROVAL,
                status: CreditStatus::Active,
                issued_date: now.date_naive(),
                expiry_date: (now + Duration::days(CREDIT_LIFETIME_DAYS)).date_naive(),
                verifier: ISSUING_VERIFIER.to_string(),
                price: ISSUED_CREDIT_PRICE,
                retired_at: None,
            });

            let activity = activity(
                credit_id + 1,
                ActivityKind::MrvApproved,
                "MRV Approved & Credits Issued",
                format!(
                    "Approved {}: {} credits issued",
                    submission.project_name, CREDITS_PER_APPROVAL
                ),
                REVIEWER,
                now,
            );

            AppState {
                next_id: credit_id + 2,
                mrv_submissions,
                projects,
                carbon_credits,
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        Action::RejectMrv { id, reason } => {
            let activity_id = state.next_id;
            let mrv_submissions = state
                .mrv_submissions
                .into_iter()
                .map(|sub| {
                    if sub.id == id {
                        MrvSubmission {
                            status: SubmissionStatus::Rejected,
                            rejected_by: Some(REVIEWER.to_string()),
                            rejected_at: Some(now),
                            rejection_reason: reason.clone(),
                            ..sub
                        }
                    } else {
                        sub
                    }
                })
                .collect();

            let activity = activity(
                activity_id,
                ActivityKind::MrvRejected,
                "MRV Data Rejected",
                format!("Monitoring data rejected for submission #{}", id),
                REVIEWER,
                now,
            );

            AppState {
                next_id: activity_id + 1,
                mrv_submissions,
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        // === Credits ===
        Action::RetireCredit {
            id,
            amount,
            project_name,
        } => {
            let activity_id = state.next_id;
            let carbon_credits = state
                .carbon_credits
                .into_iter()
                .map(|credit| {
                    if credit.id == id {
                        CarbonCredit {
                            status: CreditStatus::Retired,
                            retired_at: Some(now),
                            ..credit
                        }
                    } else {
                        credit
                    }
                })
                .collect();

            let activity = activity(
                activity_id,
                ActivityKind::CreditRetired,
                "Carbon Credit Retired",
                format!("{} credits retired from {}", amount, project_name),
                "You",
                now,
            );

            AppState {
                next_id: activity_id + 1,
                carbon_credits,
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        // === Feedback ===
        Action::AddNotification(new) => {
            let id = state.next_id;
            let mut notifications = state.notifications;
            notifications.push(Notification {
                id,
                kind: new.kind,
                title: new.title,
                message: new.message,
                timestamp: now,
            });
            AppState {
                next_id: id + 1,
                notifications,
                ..state
            }
        }

        Action::RemoveNotification(id) => {
            let mut notifications = state.notifications;
            notifications.retain(|n| n.id != id);
            AppState {
                notifications,
                ..state
            }
        }

        Action::AddActivity(new) => {
            let id = state.next_id;
            let activity = Activity {
                id,
                kind: new.kind,
                title: new.title,
                description: new.description,
                timestamp: now,
                user: new.user,
            };
            AppState {
                next_id: id + 1,
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        // === Sensors ===
        Action::ToggleSensor {
            project_id,
            enabled,
        } => {
            let mut sensors = state.sensors;
            let previous = sensors.remove(&project_id);
            let sensor = Sensor {
                enabled,
                last_seen: if enabled {
                    Some(now)
                } else {
                    previous.as_ref().and_then(|s| s.last_seen)
                },
                battery: Some(
                    previous
                        .as_ref()
                        .and_then(|s| s.battery)
                        .unwrap_or(DEFAULT_BATTERY_ON_TOGGLE),
                ),
                device_id: previous.map(|s| s.device_id).unwrap_or_default(),
            };
            sensors.insert(project_id, sensor);
            AppState { sensors, ..state }
        }

        Action::PushSensorSample { project_id, sample } => {
            let mut sensor_streams = state.sensor_streams;
            let stream = sensor_streams.entry(project_id).or_default();
            stream.push(sample);
            if stream.len() > SENSOR_WINDOW {
                let excess = stream.len() - SENSOR_WINDOW;
                stream.drain(..excess);
            }

            let mut sensors = state.sensors;
            let previous = sensors.remove(&project_id);
            let battery = previous
                .as_ref()
                .and_then(|s| s.battery)
                .unwrap_or(DEFAULT_BATTERY_ON_SAMPLE);
            let sensor = Sensor {
                enabled: previous.as_ref().map(|s| s.enabled).unwrap_or(false),
                last_seen: Some(now),
                battery: Some((battery - BATTERY_DRAIN_PER_SAMPLE).max(BATTERY_FLOOR)),
                device_id: previous.map(|s| s.device_id).unwrap_or_default(),
            };
            sensors.insert(project_id, sensor);

            AppState {
                sensor_streams,
                sensors,
                ..state
            }
        }

        // === Marketplace ===
        Action::PlaceBuyOrder {
            listing_id,
            quantity,
            buyer,
        } => {
            let Some(listing) = state.listing(listing_id).cloned() else {
                return state;
            };
            let order_id = state.next_id;

            let listings = state
                .marketplace
                .listings
                .into_iter()
                .map(|l| {
                    if l.id == listing_id {
                        Listing {
                            quantity: l.quantity - quantity,
                            ..l
                        }
                    } else {
                        l
                    }
                })
                .collect();

            let mut orders = state.marketplace.orders;
            orders.push(Order {
                id: order_id,
                buyer_id: buyer.id,
                buyer_name: buyer.name.clone(),
                listing_id,
                quantity,
                price_per_credit: listing.price_per_credit,
                total_amount: quantity as f64 * listing.price_per_credit,
                status: OrderStatus::Pending,
                order_date: now,
                completed_date: None,
            });

            let activity = activity(
                order_id + 1,
                ActivityKind::OrderPlaced,
                "Carbon Credits Purchase Order",
                format!(
                    "{} placed order for {} credits from {}",
                    buyer.name, quantity, listing.project_name
                ),
                &buyer.name,
                now,
            );

            AppState {
                next_id: order_id + 2,
                marketplace: Marketplace {
                    listings,
                    orders,
                    ..state.marketplace
                },
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        Action::CreateListing(new) => {
            let listing_id = state.next_id;
            let activity = activity(
                listing_id + 1,
                ActivityKind::ListingCreated,
                "New Credits Listed",
                format!("{} listed {} credits for sale", new.seller_name, new.quantity),
                &new.seller_name,
                now,
            );

            let mut listings = state.marketplace.listings;
            listings.push(Listing {
                id: listing_id,
                seller_id: new.seller_id,
                seller_name: new.seller_name,
                project_id: new.project_id,
                project_name: new.project_name,
                credit_type: new.credit_type,
                quantity: new.quantity,
                price_per_credit: new.price_per_credit,
                total_value: new.quantity as f64 * new.price_per_credit,
                vintage: new.vintage,
                status: ListingStatus::Active,
                expiry_date: new.expiry_date,
                verifier: new.verifier,
                location: new.location,
                ecosystem: new.ecosystem,
                listed_at: now,
                description: new.description,
            });

            AppState {
                next_id: listing_id + 2,
                marketplace: Marketplace {
                    listings,
                    ..state.marketplace
                },
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        Action::UpdateListingStatus { listing_id, status } => {
            let listings = state
                .marketplace
                .listings
                .into_iter()
                .map(|l| if l.id == listing_id { Listing { status, ..l } } else { l })
                .collect();
            AppState {
                marketplace: Marketplace {
                    listings,
                    ..state.marketplace
                },
                ..state
            }
        }

        Action::CompleteOrder(order_id) => {
            let activity_id = state.next_id;
            let orders = state
                .marketplace
                .orders
                .into_iter()
                .map(|order| {
                    if order.id == order_id {
                        Order {
                            status: OrderStatus::Completed,
                            completed_date: Some(now),
                            ..order
                        }
                    } else {
                        order
                    }
                })
                .collect();

            let activity = activity(
                activity_id,
                ActivityKind::OrderCompleted,
                "Purchase Completed",
                format!("Carbon credits purchase order #{} has been completed", order_id),
                "System",
                now,
            );

            AppState {
                next_id: activity_id + 1,
                marketplace: Marketplace {
                    orders,
                    ..state.marketplace
                },
                activities: prepend(state.activities, activity, state.activity_retention),
                ..state
            }
        }

        // === Geographic ===
        Action::UpdateProjectCoverage {
            project_id,
            coverage,
            biomass,
        } => {
            let mut geographic_data = state.geographic_data;
            if let Some(geo) = geographic_data.projects.get_mut(&project_id) {
                geo.growth_data.push(GrowthPoint {
                    date: now.date_naive(),
                    coverage,
                    biomass,
                    co2_sequestered: biomass * CO2_PER_BIOMASS,
                });
            }
            AppState {
                geographic_data,
                ..state
            }
        }

        // === Demo ===
        Action::ResetDemo => {
            AppState::seeded(state.seeded_at).with_activity_retention(state.activity_retention)
        }
    }
}

fn activity(
    id: ActivityId,
    kind: ActivityKind,
    title: &str,
    description: String,
    user: &str,
    now: DateTime<Utc>,
) -> Activity {
    Activity {
        id,
        kind,
        title: title.to_string(),
        description,
        timestamp: now,
        user: user.to_string(),
    }
}

/// Newest first, trimmed to the retention cap when one is set
fn prepend(activities: Vec<Activity>, activity: Activity, retention: Option<usize>) -> Vec<Activity> {
    let mut next = Vec::with_capacity(activities.len() + 1);
    next.push(activity);
    next.extend(activities);
    if let Some(cap) = retention {
        next.truncate(cap);
    }
    next
}

/// Registry token id, e.g. `BCR-000142-2025`
fn token_id(credit_id: CreditId, now: DateTime<Utc>) -> String {
    format!("BCR-{:06}-{}", credit_id % 1_000_000, now.year())
}

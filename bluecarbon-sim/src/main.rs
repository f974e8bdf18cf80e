//! bluecarbon-sim - Drive the registry store from the command line
//!
//! Seeds a registry, optionally runs a scripted MRV-to-retirement walkthrough,
//! streams synthetic sensor samples and expires notifications on schedule.

use chrono::{DateTime, Utc};
use clap::Parser;
use libbluecarbon::logging::{LogFormat, LoggingConfig};
use libbluecarbon::selectors::{self, CreditPortfolio, GeoOverview, MarketplaceStats, MrvQueue, RegistryOverview};
use libbluecarbon::sensors::{self, SampleGenerator};
use libbluecarbon::config::MAX_DURATION;
use libbluecarbon::{
    AppState, BuyerInfo, Config, Notification, NotificationId, ProjectId, Result, Store,
    StoreOptions, SubmissionFile, SystemClock, UserRole,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace};

/// How often the loop looks at the shutdown flag
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

const DEMO_WALLET: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

#[derive(Parser, Debug)]
#[command(name = "bluecarbon-sim")]
#[command(version)]
#[command(about = "Run a simulated blue carbon registry")]
#[command(long_about = "\
bluecarbon-sim - Run a simulated blue carbon registry

DESCRIPTION:
    Seeds an in-memory registry with demo projects, credits, listings and
    sensors, then keeps it live: enabled sensors publish a sample every
    interval, threshold alerts become notifications, and notifications
    expire one at a time from the front of the queue.

USAGE:
    # Stream sensors 1 and 2 until Ctrl-C
    bluecarbon-sim

    # Scripted demo, then dump the final state as JSON
    bluecarbon-sim --walkthrough --duration 0s --snapshot

    # Stream project 5 every 500ms for a minute
    bluecarbon-sim --stream 5 --interval 500ms --duration 1m

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (snapshot is still written)

CONFIGURATION:
    Configuration file: ~/.config/bluecarbon/config.toml
    (override with BLUECARBON_CONFIG or --config)

    [notifications]
    ttl = \"5s\"

    [activity]
    retention = 200

    [simulator]
    sample_interval = \"2s\"
    alerts_enabled = true
    projects = [1, 2]

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Configuration error
    3 - Invalid command-line input
")]
struct Cli {
    /// Configuration file (overrides BLUECARBON_CONFIG)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Projects whose sensors are streamed (overrides config)
    #[arg(long, value_name = "ID", num_args = 1..)]
    stream: Vec<ProjectId>,

    /// Time between sensor samples, e.g. "2s" (overrides config)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    interval: Option<Duration>,

    /// Stop after this long; runs until interrupted when omitted
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Don't turn threshold breaches into notifications
    #[arg(long)]
    no_alerts: bool,

    /// Seed for the sample generator (reproducible runs)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Run the scripted submit/approve/trade/retire demo first
    #[arg(long)]
    walkthrough: bool,

    /// Print the final state and summary as JSON on stdout
    #[arg(long)]
    snapshot: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log output format: text, json or pretty
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

/// Resolved simulator settings: CLI flags over config over defaults
#[derive(Debug)]
struct Simulation {
    interval: Duration,
    duration: Option<Duration>,
    projects: Vec<ProjectId>,
    alerts: bool,
    seed: Option<u64>,
}

impl Simulation {
    fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let interval = match cli.interval {
            Some(interval) => interval,
            None => config.simulator.sample_interval()?,
        };
        if interval.is_zero() {
            return Err(libbluecarbon::RegistryError::InvalidInput(
                "--interval must be greater than zero".to_string(),
            ));
        }
        if interval > MAX_DURATION {
            return Err(libbluecarbon::RegistryError::InvalidInput(
                "--interval must be at most 366 days".to_string(),
            ));
        }
        let projects = if cli.stream.is_empty() {
            config.simulator.projects.clone()
        } else {
            cli.stream.clone()
        };

        Ok(Self {
            interval,
            duration: cli.duration,
            projects,
            alerts: config.simulator.alerts_enabled && !cli.no_alerts,
            seed: cli.seed.or(config.simulator.seed),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot<'a> {
    taken_at: DateTime<Utc>,
    overview: RegistryOverview,
    portfolio: CreditPortfolio,
    marketplace: MarketplaceStats,
    mrv_queue: MrvQueue,
    geo: GeoOverview,
    state: &'a AppState,
}

impl<'a> Snapshot<'a> {
    fn of(state: &'a AppState, taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            overview: selectors::registry_overview(state),
            portfolio: selectors::credit_portfolio(state),
            marketplace: selectors::marketplace_stats(state),
            mrv_queue: selectors::mrv_queue(state),
            geo: selectors::geo_overview(state),
            state,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Environment settings first, then the command line on top
fn init_logging(cli: &Cli) {
    let mut logging = LoggingConfig::from_env();
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    logging.verbose = cli.verbose;
    logging.init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_or_default(path)?,
        None => Config::load()?,
    };
    let simulation = Simulation::resolve(&cli, &config)?;
    let mut store = Store::with_clock(SystemClock, StoreOptions::from_config(&config)?);

    info!(
        interval = %humantime::format_duration(simulation.interval),
        projects = ?simulation.projects,
        alerts = simulation.alerts,
        "bluecarbon-sim starting"
    );

    attach_views(&mut store);

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone())?;

    if cli.walkthrough {
        walkthrough(&mut store)?;
    }

    if simulation.duration != Some(Duration::ZERO) {
        simulate(&mut store, &simulation, &shutdown).await;
    }

    if cli.snapshot {
        let snapshot = Snapshot::of(store.state(), store.now());
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    info!("bluecarbon-sim stopped");
    Ok(())
}

/// Notifications in `state` that were not queued in the previous snapshot
///
/// Compares by membership rather than by id order, since ids restart after
/// a demo reset.
fn fresh_notifications<'a>(
    previous: &[NotificationId],
    state: &'a AppState,
) -> impl Iterator<Item = &'a Notification> + 'a {
    let previous = previous.to_vec();
    state
        .notifications
        .iter()
        .filter(move |n| !previous.contains(&n.id))
}

/// Log-backed views: one announces new notifications, one traces every update
fn attach_views(store: &mut Store) {
    let mut previous: Vec<NotificationId> = store.state().notifications.iter().map(|n| n.id).collect();
    store.subscribe(move |state: &AppState| {
        for notification in fresh_notifications(&previous, state) {
            info!(
                kind = ?notification.kind,
                title = %notification.title,
                "{}",
                notification.message
            );
        }
        previous = state.notifications.iter().map(|n| n.id).collect();
    });

    store.subscribe(|state: &AppState| {
        trace!(
            notifications = state.notifications.len(),
            activities = state.activities.len(),
            next_id = state.next_id,
            "state updated"
        );
    });
}

#[cfg(unix)]
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!(signal = sig, "Received shutdown signal, stopping gracefully...");
            shutdown.store(true, Ordering::Relaxed);
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn setup_signal_handlers(_shutdown: Arc<AtomicBool>) -> Result<()> {
    Ok(())
}

/// Scripted tour of the registry's main workflows
fn walkthrough(store: &mut Store) -> Result<()> {
    info!("walkthrough: NGO connects and submits field data");
    store.connect_wallet(DEMO_WALLET, UserRole::Ngo);
    let today = store.now().date_naive();
    let submission = store.submit_mrv(
        1,
        today,
        "Sector A-3, Sundarbans",
        vec![
            SubmissionFile::new("vegetation_survey.pdf", 2.1),
            SubmissionFile::new("soil_carbon_samples.csv", 0.6),
            SubmissionFile::new("drone_orthomosaic.zip", 18.4),
        ],
    )?;

    info!(submission, "walkthrough: admin reviews the submission");
    store.set_user_role(UserRole::Admin);
    let credit = store.approve_mrv(submission)?;

    info!("walkthrough: a corporate buyer purchases listed credits");
    let order = store.place_buy_order(2, 300, BuyerInfo::new("corp-demo", "Harbor Logistics"))?;
    store.complete_order(order)?;

    info!(credit, "walkthrough: the new credit batch is retired");
    store.retire_credit(credit)?;

    info!("walkthrough: satellite survey updates project coverage");
    store.update_project_coverage(1, 68.0, 47.5)?;

    let overview = selectors::registry_overview(store.state());
    info!(
        total_credits_issued = overview.total_credits_issued,
        approved_projects = overview.approved_projects,
        "walkthrough complete"
    );
    Ok(())
}

/// Event loop: sensor samples, notification expiry, shutdown
async fn simulate(store: &mut Store, simulation: &Simulation, shutdown: &AtomicBool) {
    let mut generator = match simulation.seed {
        Some(seed) => SampleGenerator::seeded(seed),
        None => SampleGenerator::from_entropy(),
    };

    let mut samples = tokio::time::interval(simulation.interval);
    samples.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut shutdown_poll = tokio::time::interval(SHUTDOWN_POLL);
    let stop_at = simulation.duration.map(|d| Instant::now() + d);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Shutdown requested, stopping simulation");
            break;
        }

        let expiry = time_until_expiry(store);
        let remaining = stop_at.map(|at| at.saturating_duration_since(Instant::now()));

        tokio::select! {
            _ = samples.tick() => {
                publish_samples(store, &mut generator, simulation);
            }
            _ = sleep_or_pending(expiry) => {
                if let Some(id) = store.tick() {
                    debug!(notification = id, "notification dismissed");
                }
            }
            _ = sleep_or_pending(remaining) => {
                info!("Run duration reached");
                break;
            }
            _ = shutdown_poll.tick() => {}
        }
    }
}

fn time_until_expiry(store: &Store) -> Option<Duration> {
    let deadline = store.next_deadline()?;
    Some((deadline - store.now()).to_std().unwrap_or(Duration::ZERO))
}

async fn sleep_or_pending(delay: Option<Duration>) {
    match delay {
        Some(delay) => sleep(delay).await,
        None => std::future::pending().await,
    }
}

/// One sample per enabled sensor, followed by any threshold alerts
fn publish_samples(
    store: &mut Store,
    generator: &mut SampleGenerator,
    simulation: &Simulation,
) {
    for &project_id in &simulation.projects {
        let enabled = store
            .state()
            .sensor(project_id)
            .map(|s| s.enabled)
            .unwrap_or(false);
        if !enabled {
            trace!(project = project_id, "sensor offline, skipping");
            continue;
        }

        let sample = generator.generate(store.now());
        let project_name = store.state().project(project_id).map(|p| p.name.clone());
        let raised = match (&project_name, simulation.alerts) {
            (Some(name), true) => sensors::alerts(name, &sample),
            _ => Vec::new(),
        };

        debug!(
            project = project_id,
            co2_ppm = sample.co2_ppm,
            sequestration_rate = sample.sequestration_rate,
            "sensor sample"
        );
        store.push_sensor_sample(project_id, sample);

        for alert in raised {
            store.add_notification(alert);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use libbluecarbon::{Action, ManualClock, NewNotification};

    fn store() -> Store {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        Store::with_clock(ManualClock::new(start), StoreOptions::default())
    }

    fn ids(state: &AppState, previous: &[NotificationId]) -> Vec<NotificationId> {
        fresh_notifications(previous, state).map(|n| n.id).collect()
    }

    #[test]
    fn test_fresh_notifications_skips_already_shown() {
        let mut store = store();
        let first = store.add_notification(NewNotification::info("One", "first"));
        let shown = vec![first];
        let second = store.add_notification(NewNotification::info("Two", "second"));
        assert_eq!(ids(store.state(), &shown), vec![second]);
    }

    #[test]
    fn test_fresh_notifications_after_reset_reuses_ids() {
        let mut store = store();
        let before = store.add_notification(NewNotification::info("One", "first"));
        let shown: Vec<NotificationId> = store.state().notifications.iter().map(|n| n.id).collect();

        store.dispatch(Action::ResetDemo).unwrap();
        let shown_after_reset: Vec<NotificationId> =
            store.state().notifications.iter().map(|n| n.id).collect();
        let again = store.add_notification(NewNotification::info("Again", "after reset"));

        assert_eq!(again, before);
        assert!(ids(store.state(), &shown).is_empty());
        assert_eq!(ids(store.state(), &shown_after_reset), vec![again]);
    }

    #[test]
    fn test_interval_above_ceiling_is_invalid_input() {
        let cli = Cli::parse_from(["bluecarbon-sim", "--interval", "400days"]);
        let err = Simulation::resolve(&cli, &Config::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}

//! Invariants checked over seeded random action sequences

use chrono::{DateTime, Duration, TimeZone, Utc};
use libbluecarbon::store::reducer::{reduce, SENSOR_WINDOW};
use libbluecarbon::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

#[test]
fn stream_keeps_latest_window_in_push_order() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut generator = SampleGenerator::seeded(11);

    for _ in 0..5 {
        let pushes = rng.gen_range(0..=SENSOR_WINDOW * 2);
        let mut state = AppState::seeded(t0());
        let mut pushed = Vec::new();

        for n in 0..pushes {
            let at = t0() + Duration::seconds(n as i64 * 2);
            let sample = generator.generate(at);
            pushed.push(sample.clone());
            state = reduce(
                state,
                Action::PushSensorSample {
                    project_id: 4,
                    sample,
                },
                at,
            );
            assert!(state.stream(4).len() <= SENSOR_WINDOW);
        }

        let keep = pushed.len().min(SENSOR_WINDOW);
        assert_eq!(state.stream(4), &pushed[pushed.len() - keep..]);
    }
}

#[test]
fn buy_orders_never_overdraw() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut state = AppState::seeded(t0());

    for _ in 0..300 {
        let listing_id = rng.gen_range(1..=4);
        let quantity = rng.gen_range(0..=1_200);
        let before = state.clone();
        let available = before.listing(listing_id).map(|l| l.quantity);

        state = reduce(
            state,
            Action::PlaceBuyOrder {
                listing_id,
                quantity,
                buyer: BuyerInfo::new("corp-rand", "Random Buyer"),
            },
            t0(),
        );

        match available {
            Some(available) if quantity > 0 && quantity <= available => {
                assert_eq!(
                    state.listing(listing_id).unwrap().quantity,
                    available - quantity
                );
            }
            _ => assert_eq!(state, before),
        }
    }
}

#[test]
fn notification_queue_drains_oldest_first() {
    let clock = ManualClock::new(t0());
    let mut store = Store::with_clock(clock.clone(), StoreOptions::default());
    let mut rng = StdRng::seed_from_u64(5);

    let mut added = Vec::new();
    for n in 0..8 {
        clock.advance(Duration::milliseconds(rng.gen_range(0..3_000)));
        added.push(store.add_notification(NewNotification::info(format!("n{}", n), "")));
    }

    let mut expired = Vec::new();
    let mut steps = 0;
    while let Some(deadline) = store.next_deadline() {
        clock.set(deadline);
        expired.extend(store.tick());
        steps += 1;
        assert!(steps <= added.len(), "queue failed to drain");
    }

    assert_eq!(expired, added);
    assert!(store.state().notifications.is_empty());
}

#[test]
fn drain_spaces_expiries_one_ttl_apart() {
    let clock = ManualClock::new(t0());
    let ttl = std::time::Duration::from_millis(5_000);
    let mut store = Store::with_clock(
        clock.clone(),
        StoreOptions {
            notification_ttl: ttl,
            activity_retention: None,
        },
    );

    for n in 0..3 {
        store.add_notification(NewNotification::success(format!("n{}", n), ""));
    }

    let mut times = Vec::new();
    while let Some(deadline) = store.next_deadline() {
        clock.set(deadline);
        store.tick();
        times.push(clock.now());
    }
    assert_eq!(
        times,
        vec![
            t0() + Duration::seconds(5),
            t0() + Duration::seconds(10),
            t0() + Duration::seconds(15)
        ]
    );
}

#[test]
fn generated_ids_never_collide() {
    let clock = ManualClock::new(t0());
    let mut store = Store::with_clock(clock, StoreOptions::default());

    // Same instant throughout
    let submission = store
        .submit_mrv(1, t0().date_naive(), "A", Vec::new())
        .unwrap();
    let credit = store.approve_mrv(submission).unwrap();
    let order = store
        .place_buy_order(1, 10, BuyerInfo::new("b", "Buyer"))
        .unwrap();

    let mut ids = vec![submission, credit, order];
    ids.extend(store.state().notifications.iter().map(|n| n.id));
    ids.extend(store.state().activities.iter().map(|a| a.id));
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

//! Synthetic sensor producer
//!
//! Generates water-quality samples for the live monitoring streams and
//! derives threshold alerts from them. The store never calls this; a driver
//! samples on its own cadence and dispatches `PushSensorSample`.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{NewNotification, SensorSample};

/// Baseline sequestration in tCO2e/day before environmental factors
pub const BASE_SEQUESTRATION_RATE: f64 = 0.0025;

pub const HIGH_CO2_PPM: f64 = 500.0;
pub const LOW_OXYGEN_MG_L: f64 = 5.5;
pub const HIGH_TEMPERATURE_C: f64 = 30.0;

/// Produces samples from fixed uniform ranges
#[derive(Debug, Clone)]
pub struct SampleGenerator<R = StdRng> {
    rng: R,
}

impl SampleGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequence for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SampleGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one sample stamped at `now`
    pub fn generate(&mut self, now: DateTime<Utc>) -> SensorSample {
        let co2_ppm = self.rng.gen_range(380.0..520.0);
        let temperature = self.rng.gen_range(24.0..32.0);
        let dissolved_oxygen = self.rng.gen_range(5.0..8.5);
        let salinity = self.rng.gen_range(28.0..36.0);
        let soil_carbon = self.rng.gen_range(2.0..4.0);
        let turbidity = self.rng.gen_range(1.0..5.0);
        let ph = self.rng.gen_range(7.8..8.4);

        SensorSample {
            timestamp: now,
            time_string: now.format("%H:%M:%S").to_string(),
            co2_ppm: round_to(co2_ppm, 2),
            temperature: round_to(temperature, 1),
            dissolved_oxygen: round_to(dissolved_oxygen, 2),
            salinity: round_to(salinity, 1),
            soil_carbon: round_to(soil_carbon, 2),
            turbidity: round_to(turbidity, 1),
            ph: round_to(ph, 2),
            sequestration_rate: round_to(
                sequestration_rate(temperature, dissolved_oxygen, soil_carbon),
                4,
            ),
            co2_absorbed: round_to(co2_ppm * 0.001, 3),
        }
    }
}

/// Daily sequestration estimate from water temperature (°C), dissolved
/// oxygen (mg/L) and soil carbon (%)
pub fn sequestration_rate(temperature: f64, dissolved_oxygen: f64, soil_carbon: f64) -> f64 {
    let temp_factor = (1.0 + (temperature - 26.0) * 0.02).clamp(0.6, 1.4);
    let oxygen_factor = (0.8 + dissolved_oxygen * 0.05).clamp(0.7, 1.3);
    let carbon_factor = 0.5 + soil_carbon * 0.15;
    BASE_SEQUESTRATION_RATE * temp_factor * oxygen_factor * carbon_factor
}

/// Threshold alerts raised by a sample, in a fixed order
pub fn alerts(project_name: &str, sample: &SensorSample) -> Vec<NewNotification> {
    let mut alerts = Vec::new();

    if sample.co2_ppm > HIGH_CO2_PPM {
        alerts.push(NewNotification::warning(
            "High CO₂ Detected",
            format!("{}: CO₂ levels at {} ppm", project_name, sample.co2_ppm),
        ));
    }
    if sample.dissolved_oxygen < LOW_OXYGEN_MG_L {
        alerts.push(NewNotification::error(
            "Low Oxygen Alert",
            format!(
                "{}: Dissolved oxygen at {} mg/L",
                project_name, sample.dissolved_oxygen
            ),
        ));
    }
    if sample.temperature > HIGH_TEMPERATURE_C {
        alerts.push(NewNotification::warning(
            "High Temperature",
            format!(
                "{}: Water temperature at {}°C",
                project_name, sample.temperature
            ),
        ));
    }

    alerts
}

/// Round half away from zero to a fixed number of decimals
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

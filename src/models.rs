//! Data models for the assistant: the fallback sensor fixture and its
//! statistical summary.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

// ---

/// Irrigation motor state as reported by the field controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MotorState {
    On,
    Off,
}

/// A single sensor reading.
///
/// Field names keep the wire spelling used by the field controller so the
/// `/sample-data` payload matches what the dashboard already consumes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SensorReading {
    // ---
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Humidity")]
    pub humidity: f64,
    #[serde(rename = "Moisture")]
    pub moisture: f64,
    #[serde(rename = "Motor_State")]
    pub motor_state: MotorState,
}

/// Fallback dataset used when no live readings are available.
pub const SAMPLE_SENSOR_DATA: [SensorReading; 20] = [
    SensorReading { id: 1, temperature: 37.8, humidity: 87.8, moisture: 37.45, motor_state: MotorState::On },
    SensorReading { id: 2, temperature: 37.9, humidity: 87.6, moisture: 95.07, motor_state: MotorState::On },
    SensorReading { id: 3, temperature: 38.1, humidity: 87.0, moisture: 73.2, motor_state: MotorState::Off },
    SensorReading { id: 4, temperature: 38.3, humidity: 86.6, moisture: 59.87, motor_state: MotorState::Off },
    SensorReading { id: 5, temperature: 38.4, humidity: 85.7, moisture: 15.6, motor_state: MotorState::Off },
    SensorReading { id: 6, temperature: 38.6, humidity: 85.4, moisture: 15.6, motor_state: MotorState::Off },
    SensorReading { id: 7, temperature: 38.8, humidity: 84.3, moisture: 5.81, motor_state: MotorState::Off },
    SensorReading { id: 8, temperature: 39.0, humidity: 83.4, moisture: 86.62, motor_state: MotorState::On },
    SensorReading { id: 9, temperature: 39.2, humidity: 82.5, moisture: 60.11, motor_state: MotorState::Off },
    SensorReading { id: 10, temperature: 39.4, humidity: 82.2, moisture: 70.81, motor_state: MotorState::Off },
    SensorReading { id: 11, temperature: 39.7, humidity: 81.4, moisture: 2.06, motor_state: MotorState::On },
    SensorReading { id: 12, temperature: 39.9, humidity: 78.4, moisture: 96.99, motor_state: MotorState::Off },
    SensorReading { id: 13, temperature: 40.2, humidity: 79.6, moisture: 83.24, motor_state: MotorState::On },
    SensorReading { id: 14, temperature: 40.5, humidity: 79.3, moisture: 21.23, motor_state: MotorState::Off },
    SensorReading { id: 15, temperature: 41.0, humidity: 79.4, moisture: 18.18, motor_state: MotorState::On },
    SensorReading { id: 16, temperature: 41.5, humidity: 76.3, moisture: 18.34, motor_state: MotorState::Off },
    SensorReading { id: 17, temperature: 41.7, humidity: 78.6, moisture: 30.42, motor_state: MotorState::Off },
    SensorReading { id: 18, temperature: 42.3, humidity: 76.9, moisture: 52.48, motor_state: MotorState::On },
    SensorReading { id: 19, temperature: 42.6, humidity: 80.9, moisture: 43.19, motor_state: MotorState::On },
    SensorReading { id: 20, temperature: 43.2, humidity: 83.1, moisture: 29.12, motor_state: MotorState::On },
];

// ---

/// Directional label for a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Fluctuating,
}

/// Soil moisture classification derived from the mean moisture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoistureCondition {
    Dry,
    Moderate,
    Moist,
}

/// Aggregated insights over a set of sensor readings.
#[derive(Debug, Clone, Serialize)]
pub struct SensorAnalysis {
    // ---
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub avg_moisture: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub max_humidity: f64,
    pub min_humidity: f64,
    pub max_moisture: f64,
    pub min_moisture: f64,
    pub motor_on_percentage: f64,
    pub latest_reading: String,
    pub sample_data: bool,
    pub total_records: usize,
    pub temperature_trend: Trend,
    pub humidity_trend: Trend,
    pub moisture_trend: Trend,
    pub moisture_condition: MoistureCondition,
}

impl SensorAnalysis {
    /// Summarize a reading set. Pure function of its inputs; callers pass
    /// the current time so the result is reproducible in tests.
    pub fn from_readings(readings: &[SensorReading], now: DateTime<Utc>) -> Self {
        // ---
        let n = readings.len() as f64;

        let avg_temperature = round2(readings.iter().map(|r| r.temperature).sum::<f64>() / n);
        let avg_humidity = round2(readings.iter().map(|r| r.humidity).sum::<f64>() / n);
        let avg_moisture = round2(readings.iter().map(|r| r.moisture).sum::<f64>() / n);

        let max_temperature = round2(fold_max(readings.iter().map(|r| r.temperature)));
        let min_temperature = round2(fold_min(readings.iter().map(|r| r.temperature)));
        let max_humidity = round2(fold_max(readings.iter().map(|r| r.humidity)));
        let min_humidity = round2(fold_min(readings.iter().map(|r| r.humidity)));
        let max_moisture = round2(fold_max(readings.iter().map(|r| r.moisture)));
        let min_moisture = round2(fold_min(readings.iter().map(|r| r.moisture)));

        let on_count = readings
            .iter()
            .filter(|r| r.motor_state == MotorState::On)
            .count() as f64;
        let motor_on_percentage = round2(on_count / n * 100.0);

        let temperature_trend = trend_of(readings.iter().map(|r| r.temperature));
        let humidity_trend = trend_of(readings.iter().map(|r| r.humidity));
        // Moisture swings with irrigation cycles rather than drifting
        let moisture_trend = Trend::Fluctuating;

        let moisture_condition = if avg_moisture < 20.0 {
            MoistureCondition::Dry
        } else if avg_moisture < 50.0 {
            MoistureCondition::Moderate
        } else {
            MoistureCondition::Moist
        };

        SensorAnalysis {
            avg_temperature,
            avg_humidity,
            avg_moisture,
            max_temperature,
            min_temperature,
            max_humidity,
            min_humidity,
            max_moisture,
            min_moisture,
            motor_on_percentage,
            latest_reading: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            sample_data: true,
            total_records: readings.len(),
            temperature_trend,
            humidity_trend,
            moisture_trend,
            moisture_condition,
        }
    }
}

// ---

/// Round to two decimal places, matching the precision of the wire format.
pub fn round2(value: f64) -> f64 {
    // ---
    (value * 100.0).round() / 100.0
}

fn fold_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn fold_min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

/// Compare first vs. last values of a series.
fn trend_of(mut values: impl Iterator<Item = f64>) -> Trend {
    // ---
    let first = values.next();
    let last = values.last().or(first);
    match (first, last) {
        (Some(first), Some(last)) if last > first => Trend::Increasing,
        _ => Trend::Decreasing,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn fixture_analysis() -> SensorAnalysis {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap();
        SensorAnalysis::from_readings(&SAMPLE_SENSOR_DATA, now)
    }

    #[test]
    fn test_fixture_averages() {
        // ---
        let a = fixture_analysis();

        // Arithmetic means of the 20 fixture entries. The temperature mean
        // sits exactly on the 39.905 rounding midpoint, so accept either side.
        assert!((a.avg_temperature - 39.905).abs() < 0.006, "got {}", a.avg_temperature);
        assert!((a.avg_humidity - 82.32).abs() < 0.01, "got {}", a.avg_humidity);
        assert!((a.avg_moisture - 45.77).abs() < 0.01, "got {}", a.avg_moisture);
    }

    #[test]
    fn test_fixture_extremes() {
        // ---
        let a = fixture_analysis();

        assert_eq!(a.max_temperature, 43.2);
        assert_eq!(a.min_temperature, 37.8);
        assert_eq!(a.max_humidity, 87.8);
        assert_eq!(a.min_humidity, 76.3);
        assert_eq!(a.max_moisture, 96.99);
        assert_eq!(a.min_moisture, 2.06);
    }

    #[test]
    fn test_fixture_motor_on_percentage() {
        // ---
        // 9 of the 20 fixture entries have the motor ON
        assert_eq!(fixture_analysis().motor_on_percentage, 45.0);
    }

    #[test]
    fn test_fixture_trends() {
        // ---
        let a = fixture_analysis();

        // Temperature rises 37.8 -> 43.2, humidity falls 87.8 -> 83.1
        assert_eq!(a.temperature_trend, Trend::Increasing);
        assert_eq!(a.humidity_trend, Trend::Decreasing);
        assert_eq!(a.moisture_trend, Trend::Fluctuating);
    }

    #[test]
    fn test_fixture_bookkeeping() {
        // ---
        let a = fixture_analysis();

        assert!(a.sample_data);
        assert_eq!(a.total_records, 20);
        assert_eq!(a.latest_reading, "2025-03-26T18:45:00Z");
    }

    fn readings_with_moisture(moisture: f64) -> Vec<SensorReading> {
        // ---
        (1..=4)
            .map(|id| SensorReading {
                id,
                temperature: 30.0,
                humidity: 70.0,
                moisture,
                motor_state: MotorState::Off,
            })
            .collect()
    }

    #[test]
    fn test_moisture_condition_boundaries() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let dry = SensorAnalysis::from_readings(&readings_with_moisture(10.0), now);
        assert_eq!(dry.moisture_condition, MoistureCondition::Dry);

        // 20.0 is the lower bound of "moderate"
        let edge = SensorAnalysis::from_readings(&readings_with_moisture(20.0), now);
        assert_eq!(edge.moisture_condition, MoistureCondition::Moderate);

        let moderate = SensorAnalysis::from_readings(&readings_with_moisture(45.77), now);
        assert_eq!(moderate.moisture_condition, MoistureCondition::Moderate);

        let moist = SensorAnalysis::from_readings(&readings_with_moisture(50.0), now);
        assert_eq!(moist.moisture_condition, MoistureCondition::Moist);
    }

    #[test]
    fn test_fixture_condition_is_moderate() {
        // ---
        assert_eq!(
            fixture_analysis().moisture_condition,
            MoistureCondition::Moderate
        );
    }

    #[test]
    fn test_flat_series_is_decreasing() {
        // ---
        // Equal first and last values do not count as increasing
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let a = SensorAnalysis::from_readings(&readings_with_moisture(30.0), now);
        assert_eq!(a.temperature_trend, Trend::Decreasing);
    }

    #[test]
    fn test_round2() {
        // ---
        assert_eq!(round2(45.7695), 45.77);
        assert_eq!(round2(40.0), 40.0);
        assert_eq!(round2(2.005), 2.0); // f64 representation of 2.005 is just below
    }

    #[test]
    fn test_reading_wire_format() {
        // ---
        let json = serde_json::to_value(SAMPLE_SENSOR_DATA[0]).unwrap();
        assert_eq!(json["ID"], 1);
        assert_eq!(json["Temperature"], 37.8);
        assert_eq!(json["Motor_State"], "ON");
    }
}

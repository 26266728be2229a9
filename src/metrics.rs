//! Derived metrics computed from a single observation: wind chill, heat
//! stress and solar noon. Everything here is a pure function of its inputs.

use std::fmt;

use chrono::{Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::severity::Region;
use crate::units::{speed, temperature};

/// Below this speed wind chill is not reported.
pub const MIN_WIND_CHILL_KPH: f64 = 4.8;

/// Threshold between the NWS formula and the warm-weather cooling model.
const WIND_CHILL_MAX_TEMP_C: f64 = 10.0;

/// Lowest feels-like value before the wind bracket offsets.
const COOLING_FLOOR_C: f64 = 5.0;

const HEAT_STRESS_MIN_TEMP_C: f64 = 26.67;
const HEAT_STRESS_MIN_HUMIDITY: f64 = 40.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest decimal form with at least one fractional digit ("25.0",
/// "24.81"). Negative zero prints as "0.0".
fn decimal(value: f64) -> String {
    let value = value + 0.0;
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudType {
    High,
    Mid,
    Low,
}

/// Optional inputs to the warm-weather cooling model. Missing values skip
/// their adjustment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChillModifiers {
    pub humidity: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub cloud_type: Option<CloudType>,
    pub cloud_altitude_m: Option<f64>,
    pub is_night: bool,
    pub region: Region,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindChill {
    NotApplicable,
    FeelsLike { celsius: f64, strong_wind: bool },
}

impl fmt::Display for WindChill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindChill::NotApplicable => write!(f, "Not Applicable (Wind < 4.8 kph)"),
            WindChill::FeelsLike {
                celsius,
                strong_wind,
            } => {
                write!(f, "Feels Like: {}\u{b0}C", decimal(*celsius))?;
                if *strong_wind {
                    write!(f, " (strong wind cooling effect)")?;
                }
                Ok(())
            }
        }
    }
}

pub fn wind_chill(temp_c: f64, wind_kph: f64, modifiers: &ChillModifiers) -> WindChill {
    if wind_kph < MIN_WIND_CHILL_KPH {
        return WindChill::NotApplicable;
    }

    if temp_c <= WIND_CHILL_MAX_TEMP_C {
        let temp_f = temperature::c2f(temp_c);
        let wind_factor = speed::kph2mph(wind_kph).powf(0.16);
        let chill_f = 35.74 + 0.6215 * temp_f - 35.75 * wind_factor + 0.4275 * temp_f * wind_factor;
        return WindChill::FeelsLike {
            celsius: round2(temperature::f2c(chill_f)),
            strong_wind: false,
        };
    }

    WindChill::FeelsLike {
        celsius: round2(warm_cooling(temp_c, wind_kph, modifiers)),
        strong_wind: wind_kph > 15.0,
    }
}

/// Empirical feels-like model used above 10 °C.
fn warm_cooling(temp_c: f64, wind_kph: f64, modifiers: &ChillModifiers) -> f64 {
    // 0.3 °C per kph above 5 kph
    let mut feels = temp_c - 0.3 * (wind_kph - 5.0);
    if wind_kph > 40.0 {
        feels -= 2.0;
    }

    feels -= match modifiers.region {
        Region::Tropical | Region::Temperate => 0.5,
        Region::Arctic => 2.0,
        Region::Desert => 0.2,
        Region::Mountain => 1.0,
        Region::Default | Region::Coastal => 0.0,
    };

    if temp_c > 40.0 {
        feels = feels.min(40.0);
    }

    if modifiers.is_night {
        feels -= f64::min(2.0, 0.1 * temp_c);

        if let Some(humidity) = modifiers.humidity {
            feels -= humidity / 100.0 * 1.5;
        }

        if let Some(cover) = modifiers.cloud_cover {
            let cover_fraction = cover / 100.0;
            feels -= match modifiers.cloud_type {
                Some(CloudType::High) => cover_fraction * 0.5,
                Some(CloudType::Mid) => cover_fraction * 1.0,
                Some(CloudType::Low) => cover_fraction * 1.5,
                None => 0.0,
            };

            if let Some(altitude) = modifiers.cloud_altitude_m {
                if altitude > 6000.0 {
                    feels -= 1.0;
                } else if altitude < 1000.0 {
                    feels -= 2.0;
                }
                if cover > 70.0 {
                    feels -= 0.5;
                }
            }
        }
    }

    feels = feels.max(COOLING_FLOOR_C);

    if wind_kph > 30.0 {
        feels - 2.0
    } else if wind_kph > 20.0 {
        feels - 1.0
    } else if wind_kph > 10.0 {
        feels - 0.5
    } else {
        feels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatBand {
    None,
    Low,
    Moderate,
    High,
    Extreme,
}

impl HeatBand {
    /// Band for a heat index in Fahrenheit.
    fn from_fahrenheit(index_f: f64) -> Self {
        if index_f > 130.0 {
            HeatBand::Extreme
        } else if index_f > 105.0 {
            HeatBand::High
        } else if index_f > 90.0 {
            HeatBand::Moderate
        } else if index_f > 80.0 {
            HeatBand::Low
        } else {
            HeatBand::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeatBand::Extreme => "Extreme Heat Stress (Dangerous)",
            HeatBand::High => "High Heat Stress (Take caution)",
            HeatBand::Moderate => "Moderate Heat Stress (Caution)",
            HeatBand::Low => "Low Heat Stress (Normal)",
            HeatBand::None => "No significant Heat Stress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeatStress {
    NotApplicable,
    Index { celsius: f64, band: HeatBand },
}

impl fmt::Display for HeatStress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatStress::NotApplicable => write!(f, "HSI N/A (temp. & humidity too low!)"),
            HeatStress::Index { celsius, band } => {
                write!(f, "HSI: {}\u{b0}C - {}", decimal(*celsius), band.label())
            }
        }
    }
}

/// NWS (Rothfusz) heat index, evaluated in Fahrenheit.
pub fn heat_stress_index(temp_c: f64, humidity: f64) -> HeatStress {
    if temp_c < HEAT_STRESS_MIN_TEMP_C || humidity < HEAT_STRESS_MIN_HUMIDITY {
        return HeatStress::NotApplicable;
    }

    let t = temperature::c2f(temp_c);
    let rh = humidity;
    let index_f = -42.379 + 2.04901523 * t + 10.14333127 * rh
        - 0.22475541 * t * rh
        - 6.83783e-3 * t * t
        - 5.481717e-2 * rh * rh
        + 1.22874e-3 * t * t * rh
        + 8.5282e-4 * t * rh * rh
        - 1.99e-6 * t * t * rh * rh;

    HeatStress::Index {
        celsius: round2(temperature::f2c(index_f)),
        band: HeatBand::from_fahrenheit(index_f),
    }
}

/// Equation of time in minutes for the given day.
pub fn equation_of_time(date: NaiveDate) -> f64 {
    let b = (360.0 / 365.0 * (date.ordinal() as f64 - 81.0)).to_radians();
    let eot = 229.18
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.040849 * (2.0 * b).sin());
    round2(eot)
}

/// Local clock time (HH:MM) of solar noon at `longitude` for a zone with the
/// given UTC offset. The zone's standard meridian is 15° per hour of offset.
pub fn solar_noon(longitude: f64, date: NaiveDate, offset: FixedOffset) -> String {
    let meridian = offset.local_minus_utc() as f64 / 3600.0 * 15.0;
    let minutes = 720.0 - 4.0 * (longitude - meridian) + equation_of_time(date);
    let minutes = (minutes.floor() as i64).rem_euclid(24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feels_like(chill: WindChill) -> f64 {
        match chill {
            WindChill::FeelsLike { celsius, .. } => celsius,
            WindChill::NotApplicable => panic!("expected a value"),
        }
    }

    #[test]
    fn wind_chill_calm_air() {
        let chill = wind_chill(5.0, 3.0, &ChillModifiers::default());
        assert_eq!(chill, WindChill::NotApplicable);
        assert_eq!(chill.to_string(), "Not Applicable (Wind < 4.8 kph)");
    }

    #[test]
    fn wind_chill_cold_uses_nws_formula() {
        let chill = wind_chill(0.0, 20.0, &ChillModifiers::default());
        assert_eq!(feels_like(chill), -5.22);
        assert_eq!(chill.to_string(), "Feels Like: -5.22\u{b0}C");
    }

    #[test]
    fn wind_chill_cold_ignores_modifiers() {
        let modifiers = ChillModifiers {
            humidity: Some(90.0),
            is_night: true,
            region: Region::Arctic,
            ..Default::default()
        };
        assert_eq!(
            wind_chill(0.0, 20.0, &modifiers),
            wind_chill(0.0, 20.0, &ChillModifiers::default())
        );
    }

    #[test]
    fn wind_chill_boundary_temp() {
        // 10 °C still uses the formula and stays just under the air temperature.
        let value = feels_like(wind_chill(10.0, 4.8, &ChillModifiers::default()));
        assert_eq!(value, 9.83);
    }

    #[test]
    fn wind_chill_warm_day() {
        let chill = wind_chill(30.0, 20.0, &ChillModifiers::default());
        assert_eq!(
            chill,
            WindChill::FeelsLike {
                celsius: 25.0,
                strong_wind: true
            }
        );
        assert_eq!(chill.to_string(), "Feels Like: 25.0\u{b0}C (strong wind cooling effect)");
    }

    #[test]
    fn readings_print_without_padding() {
        assert_eq!(decimal(24.81), "24.81");
        assert_eq!(decimal(-5.2), "-5.2");
        assert_eq!(decimal(round2(-0.001)), "0.0");
        let chill = WindChill::FeelsLike {
            celsius: round2(-0.004),
            strong_wind: false,
        };
        assert_eq!(chill.to_string(), "Feels Like: 0.0\u{b0}C");
        let hsi = HeatStress::Index {
            celsius: 30.0,
            band: HeatBand::Low,
        };
        assert_eq!(hsi.to_string(), "HSI: 30.0\u{b0}C - Low Heat Stress (Normal)");
    }

    #[test]
    fn wind_chill_warm_night_adjustments() {
        let modifiers = ChillModifiers {
            humidity: Some(80.0),
            cloud_cover: Some(80.0),
            cloud_type: Some(CloudType::Low),
            cloud_altitude_m: Some(500.0),
            is_night: true,
            region: Region::Default,
        };
        let chill = wind_chill(20.0, 10.0, &modifiers);
        assert_eq!(
            chill,
            WindChill::FeelsLike {
                celsius: 11.6,
                strong_wind: false
            }
        );
    }

    #[test]
    fn wind_chill_night_flag_alone_skips_optional_effects() {
        let modifiers = ChillModifiers {
            is_night: true,
            ..Default::default()
        };
        // 20 - 1.5 - 2.0
        assert_eq!(feels_like(wind_chill(20.0, 10.0, &modifiers)), 16.5);
    }

    #[test]
    fn wind_chill_floor_then_wind_bracket() {
        let modifiers = ChillModifiers {
            region: Region::Arctic,
            ..Default::default()
        };
        // 12 - 12 - 2 - 2 clamps to 5, then strong winds take 2 more.
        assert_eq!(feels_like(wind_chill(12.0, 45.0, &modifiers)), 3.0);
    }

    #[test]
    fn wind_chill_regions_differ() {
        let at = |region| {
            let modifiers = ChillModifiers {
                region,
                ..Default::default()
            };
            feels_like(wind_chill(25.0, 8.0, &modifiers))
        };
        assert_eq!(at(Region::Default), 24.1);
        assert_eq!(at(Region::Coastal), 24.1);
        assert_eq!(at(Region::Tropical), 23.6);
        assert_eq!(at(Region::Desert), 23.9);
        assert_eq!(at(Region::Mountain), 23.1);
        assert_eq!(at(Region::Arctic), 22.1);
    }

    #[test]
    fn wind_chill_extreme_heat_is_capped() {
        assert_eq!(feels_like(wind_chill(50.0, 5.0, &ChillModifiers::default())), 40.0);
    }

    #[test]
    fn heat_stress_not_applicable() {
        let hsi = heat_stress_index(20.0, 50.0);
        assert_eq!(hsi, HeatStress::NotApplicable);
        assert_eq!(hsi.to_string(), "HSI N/A (temp. & humidity too low!)");
        assert_eq!(heat_stress_index(35.0, 39.9), HeatStress::NotApplicable);
    }

    #[test]
    fn heat_stress_hot_and_humid() {
        match heat_stress_index(35.0, 70.0) {
            HeatStress::Index { celsius, band } => {
                assert!(matches!(band, HeatBand::High | HeatBand::Extreme));
                assert_eq!(band, HeatBand::High);
                assert_eq!(celsius, 50.34);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            heat_stress_index(35.0, 70.0).to_string(),
            "HSI: 50.34\u{b0}C - High Heat Stress (Take caution)"
        );
    }

    #[test]
    fn heat_stress_bands() {
        let band = |t, h| match heat_stress_index(t, h) {
            HeatStress::Index { band, .. } => band,
            HeatStress::NotApplicable => panic!("expected an index"),
        };
        assert_eq!(band(26.7, 40.0), HeatBand::None);
        assert_eq!(band(28.0, 45.0), HeatBand::Low);
        assert_eq!(band(32.0, 60.0), HeatBand::Moderate);
        assert_eq!(band(35.0, 70.0), HeatBand::High);
        assert_eq!(band(40.0, 80.0), HeatBand::Extreme);
    }

    #[test]
    fn equation_of_time_values() {
        assert_eq!(equation_of_time(date(2023, 9, 1)), 0.39);
        assert_eq!(equation_of_time(date(2023, 2, 14)), 12.4);
        assert_eq!(equation_of_time(date(2023, 4, 30)), -14.1);
    }

    #[test]
    fn solar_noon_greenwich() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(solar_noon(0.0, date(2023, 9, 1), utc), "12:00");
        assert_eq!(solar_noon(0.0, date(2023, 2, 14), utc), "12:12");
        assert!(solar_noon(0.0, date(2023, 9, 2), utc).starts_with("12:0"));
    }

    #[test]
    fn solar_noon_uses_zone_meridian() {
        let manila = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(solar_noon(120.9842, date(2023, 9, 1), manila), "11:56");

        // Longitude exactly on the zone meridian behaves like Greenwich.
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(solar_noon(-75.0, date(2023, 9, 1), new_york), "12:00");
    }

    #[test]
    fn solar_noon_wraps_into_day() {
        let far_west = FixedOffset::west_opt(12 * 3600).unwrap();
        assert_eq!(solar_noon(0.0, date(2023, 9, 1), far_west), "00:00");

        let far_east = FixedOffset::east_opt(14 * 3600).unwrap();
        assert_eq!(solar_noon(-170.0, date(2023, 9, 1), far_east), "13:20");
    }
}

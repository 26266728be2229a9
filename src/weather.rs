use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

use crate::metrics::ChillModifiers;
use crate::severity::Region;
use crate::units::{direction, distance};
use crate::weatherapi::forecast::{Alert, Astro, Forecast};

const LOCALTIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Today's totals from the forecast, used as the forecast pair for storm
/// classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outlook {
    pub date: NaiveDate,
    pub precip_mm: f64,
    pub max_wind_kph: f64,
}

/// One reading of current conditions. Built per response and thrown away
/// after it has been displayed.
#[derive(Debug, Clone)]
pub struct Observation {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub local_time: NaiveDateTime,
    pub utc_offset: FixedOffset,
    pub condition: String,
    pub temperature_c: f64,
    pub feels_like_c: Option<f64>,
    pub humidity: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub gust_kph: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub precip_mm: f64,
    pub uv: Option<f64>,
    pub visibility_km: Option<f64>,
    pub pressure_mb: Option<f64>,
    pub is_night: bool,
    pub outlook: Option<Outlook>,
    pub astro: Astro,
    pub alerts: Vec<Alert>,
}

impl Observation {
    pub fn from_forecast(forecast: Forecast) -> Self {
        let Forecast {
            location,
            current,
            forecast,
            alerts,
        } = forecast;

        let utc_offset = utc_offset(&location.localtime, location.localtime_epoch);
        let local_time = NaiveDateTime::parse_from_str(&location.localtime, LOCALTIME_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::from_timestamp(location.localtime_epoch, 0)
                    .map(|utc| utc.with_timezone(&utc_offset).naive_local())
            })
            .unwrap_or_default();

        let today = forecast.forecastday.into_iter().next();
        let outlook = today.as_ref().map(|day| Outlook {
            date: day.date,
            precip_mm: day.day.totalprecip_mm,
            max_wind_kph: day.day.maxwind_kph,
        });
        let astro = today.map(|day| day.astro).unwrap_or_default();

        let wind_dir = match current.wind_degree {
            Some(deg) if current.wind_dir.trim().is_empty() => {
                direction::degree_to_compass(deg).to_string()
            }
            _ => current.wind_dir,
        };

        let location_name = [&location.name, &location.region, &location.country]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            location: location_name,
            latitude: location.lat,
            longitude: location.lon,
            timezone: location.tz_id,
            local_time,
            utc_offset,
            condition: current.condition.text,
            temperature_c: current.temp_c,
            feels_like_c: current.feelslike_c,
            humidity: current.humidity,
            wind_kph: current.wind_kph,
            wind_dir,
            gust_kph: current.gust_kph,
            cloud_cover: current.cloud,
            precip_mm: current.precip_mm.max(0.0),
            uv: current.uv,
            visibility_km: current.vis_km,
            pressure_mb: current.pressure_mb,
            is_night: current.is_day == 0,
            outlook,
            astro,
            alerts: alerts.alert,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.local_time.date()
    }

    pub fn wind_degrees(&self) -> Option<f32> {
        direction::compass_to_degrees(&self.wind_dir)
    }

    /// (precipitation, wind) from today's forecast totals.
    pub fn forecast_pair(&self) -> Option<(f64, f64)> {
        self.outlook
            .map(|outlook| (outlook.precip_mm, outlook.max_wind_kph))
    }

    pub fn chill_modifiers(&self, region: Region) -> ChillModifiers {
        ChillModifiers {
            humidity: Some(self.humidity),
            cloud_cover: self.cloud_cover,
            cloud_type: None,
            cloud_altitude_m: None,
            is_night: self.is_night,
            region,
        }
    }

    pub fn condition_icon(&self) -> &'static str {
        condition_icon(&self.condition)
    }
}

/// Offset of the location's clock from UTC, from its local time and the
/// matching epoch. Rounded to the nearest quarter hour since the local time
/// only carries minutes.
pub fn utc_offset(localtime: &str, epoch: i64) -> FixedOffset {
    let utc = Utc.fix();
    let Ok(local) = NaiveDateTime::parse_from_str(localtime, LOCALTIME_FORMAT) else {
        return utc;
    };
    let Some(instant) = DateTime::from_timestamp(epoch, 0) else {
        return utc;
    };

    let seconds = (local - instant.naive_utc()).num_seconds();
    let quarter_hours = (seconds as f64 / 900.0).round() as i32;
    FixedOffset::east_opt(quarter_hours * 900).unwrap_or(utc)
}

pub fn condition_icon(condition: &str) -> &'static str {
    match condition.trim() {
        "Clear" | "Sunny" => "\u{1f31e}",
        "Partly cloudy" => "\u{26c5}",
        "Cloudy" | "Overcast" => "\u{2601}\u{fe0f}",
        "Rain" => "\u{1f327}",
        "Snow" => "\u{2744}\u{fe0f}",
        "Wind" => "\u{1f4a8}",
        "Thunderstorm" => "\u{1f329}",
        "Fog" | "Mist" => "\u{1f32b}",
        "Drizzle" => "\u{1f326}",
        _ => "\u{1f325}",
    }
}

/// How threatening a storm is given its distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Proximity {
    Weak,
    Moderate,
    Severe,
}

impl Proximity {
    pub fn from_distance(distance_km: f64) -> Self {
        if distance_km < 100.0 {
            Proximity::Severe
        } else if distance_km < 300.0 {
            Proximity::Moderate
        } else {
            Proximity::Weak
        }
    }
}

impl fmt::Display for Proximity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proximity::Severe => write!(f, "Severe Typhoon (Very Close)"),
            Proximity::Moderate => write!(f, "Moderate Typhoon (Close)"),
            Proximity::Weak => write!(f, "Weak Typhoon (Far)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStorm {
    pub headline: String,
    /// Alert type and issuer severity, e.g. ("Typhoon", "Severe").
    pub event: Option<String>,
    pub severity: Option<String>,
    pub description: String,
    pub distance_km: f64,
    pub proximity: Proximity,
}

/// Alerts with a known position inside `radius_km` of the given point,
/// closest first.
pub fn nearby_storms(lat: f64, lon: f64, alerts: &[Alert], radius_km: f64) -> Vec<NearbyStorm> {
    let mut storms: Vec<NearbyStorm> = alerts
        .iter()
        .filter_map(|alert| {
            let (storm_lat, storm_lon) = (alert.lat?, alert.lon?);
            let distance_km = distance::great_circle_km(lat, lon, storm_lat, storm_lon);
            (distance_km <= radius_km).then(|| NearbyStorm {
                headline: alert
                    .headline
                    .clone()
                    .unwrap_or_else(|| "No Headline".to_string()),
                event: alert.event.clone(),
                severity: alert.severity.clone(),
                description: alert
                    .desc
                    .clone()
                    .unwrap_or_else(|| "No Description".to_string()),
                distance_km,
                proximity: Proximity::from_distance(distance_km),
            })
        })
        .collect();

    storms.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    storms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weatherapi::fixtures::FORECAST_JSON;

    fn observation() -> Observation {
        Observation::from_forecast(serde_json::from_str(FORECAST_JSON).unwrap())
    }

    #[test]
    fn test_from_forecast() {
        let obs = observation();
        assert_eq!(obs.location, "Manila, Manila, Philippines");
        assert_eq!(obs.utc_offset.local_minus_utc(), 8 * 3600);
        assert_eq!(obs.date(), NaiveDate::from_ymd_opt(2023, 9, 1).unwrap());
        assert!(!obs.is_night);
        assert_eq!(obs.wind_degrees(), Some(247.5));
        assert_eq!(obs.forecast_pair(), Some((210.5, 140.0)));
        assert_eq!(obs.astro.moon_phase.as_deref(), Some("Waning Gibbous"));
        assert_eq!(obs.alerts.len(), 2);
        assert_eq!(obs.condition_icon(), "\u{26c5}");
    }

    #[test]
    fn test_wind_dir_from_degrees() {
        let json = r#"{
            "location": {"name": "Nowhere", "lat": 0.0, "lon": 0.0, "tz_id": "UTC",
                         "localtime_epoch": 0, "localtime": "1970-01-01 00:00"},
            "current": {"temp_c": 5.0, "condition": {"text": "Fog"}, "wind_kph": 3.0,
                        "wind_degree": 90, "humidity": 95}
        }"#;
        let obs = Observation::from_forecast(serde_json::from_str(json).unwrap());
        assert_eq!(obs.wind_dir, "E");
        assert_eq!(obs.wind_degrees(), Some(90.0));
        assert!(obs.outlook.is_none());
    }

    #[test]
    fn test_chill_modifiers() {
        let modifiers = observation().chill_modifiers(Region::Coastal);
        assert_eq!(modifiers.humidity, Some(70.0));
        assert_eq!(modifiers.cloud_cover, Some(75.0));
        assert!(!modifiers.is_night);
        assert_eq!(modifiers.region, Region::Coastal);
    }

    #[test]
    fn test_utc_offset() {
        // 2023-09-01 06:00:00 UTC
        let epoch = 1693548000;
        assert_eq!(utc_offset("2023-09-01 14:00", epoch).local_minus_utc(), 8 * 3600);
        assert_eq!(utc_offset("2023-09-01 02:00", epoch).local_minus_utc(), -4 * 3600);
        assert_eq!(utc_offset("2023-09-01 11:45", epoch).local_minus_utc(), 5 * 3600 + 45 * 60);
        // Epoch taken a few seconds after the minute rolled over.
        assert_eq!(utc_offset("2023-09-01 14:00", epoch + 37).local_minus_utc(), 8 * 3600);
        assert_eq!(utc_offset("garbage", epoch).local_minus_utc(), 0);
    }

    #[test]
    fn test_condition_icon() {
        assert_eq!(condition_icon("Clear"), "\u{1f31e}");
        assert_eq!(condition_icon("Patchy rain nearby"), "\u{1f325}");
    }

    #[test]
    fn test_proximity() {
        assert_eq!(Proximity::from_distance(0.0), Proximity::Severe);
        assert_eq!(Proximity::from_distance(99.9), Proximity::Severe);
        assert_eq!(Proximity::from_distance(100.0), Proximity::Moderate);
        assert_eq!(Proximity::from_distance(300.0), Proximity::Weak);
        assert_eq!(Proximity::Severe.to_string(), "Severe Typhoon (Very Close)");
    }

    #[test]
    fn test_nearby_storms() {
        let obs = observation();
        let storms = nearby_storms(obs.latitude, obs.longitude, &obs.alerts, 500.0);
        assert_eq!(storms.len(), 1);
        assert_eq!(storms[0].headline, "Tropical Cyclone Wind Signal No. 2");
        assert_eq!(storms[0].event.as_deref(), Some("Typhoon"));
        assert_eq!(storms[0].severity.as_deref(), Some("Severe"));
        assert_eq!(storms[0].proximity, Proximity::Moderate);
        assert!((100.0..150.0).contains(&storms[0].distance_km));

        assert!(nearby_storms(obs.latitude, obs.longitude, &obs.alerts, 50.0).is_empty());
    }

    #[test]
    fn test_nearby_storms_sorted() {
        let alert = |lat: f64, name: &str| Alert {
            headline: Some(name.to_string()),
            lat: Some(lat),
            lon: Some(0.0),
            ..Default::default()
        };
        let alerts = vec![alert(5.0, "far"), alert(0.5, "near"), alert(2.0, "mid")];
        let storms = nearby_storms(0.0, 0.0, &alerts, 2000.0);
        let names: Vec<_> = storms.iter().map(|s| s.headline.as_str()).collect();
        assert_eq!(names, ["near", "mid", "far"]);
        assert_eq!(storms[0].description, "No Description");
        assert_eq!(storms[0].event, None);
    }
}

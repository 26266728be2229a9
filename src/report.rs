use reqwest::Url;

use crate::metrics::{heat_stress_index, solar_noon, wind_chill};
use crate::severity::{classify_rain, classify_typhoon, Region};
use crate::weather::{NearbyStorm, Observation};

pub const MISSING: &str = "--";

const MAPS_URL: &str = "https://www.google.com/maps";

/// A labelled value, shared by the dashboard tables and the printed report.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: &'static str,
    pub value: String,
}

impl Row {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

fn or_missing(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{value}{unit}"),
        None => MISSING.to_string(),
    }
}

fn or_missing_text(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

pub fn conditions(obs: &Observation) -> Vec<Row> {
    let wind = match obs.wind_degrees() {
        Some(deg) => format!("{} kph ({} - {deg}\u{b0})", obs.wind_kph, obs.wind_dir),
        None => format!("{} kph ({})", obs.wind_kph, obs.wind_dir),
    };

    vec![
        Row::new("Condition", format!("{} {}", obs.condition_icon(), obs.condition)),
        Row::new("Temperature", format!("{}\u{b0}C", obs.temperature_c)),
        Row::new("Feels Like", or_missing(obs.feels_like_c, "\u{b0}C")),
        Row::new("Wind", wind),
        Row::new("Wind Gusts", or_missing(obs.gust_kph, " kph")),
        Row::new("Humidity", format!("{}%", obs.humidity)),
        Row::new("Cloud Cover", or_missing(obs.cloud_cover, "%")),
        Row::new("Precipitation", format!("{} mm", obs.precip_mm)),
        Row::new("UV Index", or_missing(obs.uv, "")),
        Row::new("Visibility", or_missing(obs.visibility_km, " km")),
        Row::new("Pressure", or_missing(obs.pressure_mb, " mb")),
    ]
}

pub fn derived(obs: &Observation, region: Region) -> Vec<Row> {
    let chill = wind_chill(obs.temperature_c, obs.wind_kph, &obs.chill_modifiers(region));
    let hsi = heat_stress_index(obs.temperature_c, obs.humidity);
    let noon = solar_noon(obs.longitude, obs.date(), obs.utc_offset);

    vec![
        Row::new("Wind Chill", chill.to_string()),
        Row::new("Heat Stress", hsi.to_string()),
        Row::new("Solar Noon", noon),
        Row::new("Sunrise", or_missing_text(obs.astro.sunrise.as_deref())),
        Row::new("Sunset", or_missing_text(obs.astro.sunset.as_deref())),
        Row::new("Moon Phase", or_missing_text(obs.astro.moon_phase.as_deref())),
    ]
}

/// Rain and storm messages for the current reading and today's outlook.
pub fn warnings(obs: &Observation, region: Region) -> Vec<Row> {
    let forecast_rain = match obs.outlook {
        Some(outlook) => classify_rain(outlook.precip_mm),
        None => "No rain forecasted.",
    };
    let typhoon = classify_typhoon(obs.precip_mm, obs.wind_kph, region, obs.forecast_pair());

    vec![
        Row::new("Rain Message", classify_rain(obs.precip_mm)),
        Row::new("Rain Forecast", forecast_rain),
        Row::new("Typhoon Level", typhoon.unwrap_or_else(|| "None".to_string())),
    ]
}

/// Google Maps satellite view for an address.
pub fn map_link(address: &str) -> Option<String> {
    Url::parse_with_params(MAPS_URL, &[("q", address), ("t", "k")])
        .ok()
        .map(String::from)
}

pub fn storm_lines(storms: &[NearbyStorm], radius_km: f64) -> Vec<String> {
    if storms.is_empty() {
        return vec![format!("No typhoons found within {radius_km} km radius.")];
    }

    let mut lines = vec![format!("Nearby Typhoons (within {radius_km} km radius):")];
    for storm in storms {
        lines.push(format!("Headline: {}", storm.headline));
        match (&storm.event, &storm.severity) {
            (Some(event), Some(severity)) => lines.push(format!("Event: {event} ({severity})")),
            (Some(event), None) => lines.push(format!("Event: {event}")),
            (None, _) => {}
        }
        lines.push(format!("Description: {}", storm.description));
        lines.push(format!("Distance: {:.2} km", storm.distance_km));
        lines.push(format!("Typhoon Level: {}", storm.proximity));
        lines.push(String::new());
    }
    lines
}

fn push_rows(out: &mut String, rows: &[Row]) {
    let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0);
    for row in rows {
        let mut lines = row.value.lines();
        let first = lines.next().unwrap_or_default();
        out.push_str(&format!("{:width$}  {first}\n", row.label));
        for line in lines {
            out.push_str(&format!("{:width$}  {line}\n", ""));
        }
    }
}

/// Plain-text report for one-shot output.
pub fn render(address: &str, obs: &Observation, region: Region) -> String {
    let mut out = String::new();
    out.push_str(&format!("{address}\n"));
    if let Some(link) = map_link(address) {
        out.push_str(&format!("{link}\n"));
    }
    out.push_str(&format!(
        "Lat: {}, Lon: {}\n{} ({}) {}\n\n",
        obs.latitude,
        obs.longitude,
        obs.location,
        obs.timezone,
        obs.local_time.format("%Y-%m-%d %H:%M")
    ));

    push_rows(&mut out, &conditions(obs));
    out.push('\n');
    push_rows(&mut out, &derived(obs, region));
    out.push('\n');
    push_rows(&mut out, &warnings(obs, region));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::nearby_storms;
    use crate::weatherapi::fixtures::FORECAST_JSON;

    fn observation() -> Observation {
        Observation::from_forecast(serde_json::from_str(FORECAST_JSON).unwrap())
    }

    fn value<'a>(rows: &'a [Row], label: &str) -> &'a str {
        rows.iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
            .unwrap()
    }

    #[test]
    fn test_conditions() {
        let rows = conditions(&observation());
        assert_eq!(value(&rows, "Temperature"), "31\u{b0}C");
        assert_eq!(value(&rows, "Wind"), "22.3 kph (WSW - 247.5\u{b0})");
        assert_eq!(value(&rows, "Humidity"), "70%");
        assert_eq!(value(&rows, "Pressure"), "1006 mb");
    }

    #[test]
    fn test_missing_values() {
        let mut obs = observation();
        obs.gust_kph = None;
        obs.wind_dir = "VAR".to_string();
        let rows = conditions(&obs);
        assert_eq!(value(&rows, "Wind Gusts"), MISSING);
        assert_eq!(value(&rows, "Wind"), "22.3 kph (VAR)");
    }

    #[test]
    fn test_derived() {
        let rows = derived(&observation(), Region::Default);
        // 31 - 0.3 * 17.3 - 1 (wind over 20 kph)
        assert_eq!(value(&rows, "Wind Chill"), "Feels Like: 24.81\u{b0}C (strong wind cooling effect)");
        assert!(value(&rows, "Heat Stress").starts_with("HSI: "));
        assert_eq!(value(&rows, "Solar Noon"), "11:56");
        assert_eq!(value(&rows, "Sunrise"), "05:41 AM");
    }

    #[test]
    fn test_warnings() {
        let rows = warnings(&observation(), Region::Default);
        assert_eq!(value(&rows, "Rain Message"), "Sparse droplets! Barely wetting the ground.");
        assert!(value(&rows, "Rain Forecast").starts_with("Extreme rain detected!"));
        let typhoon = value(&rows, "Typhoon Level");
        assert!(typhoon.starts_with("Forecast Typhoon-level conditions:"), "{typhoon}");
        assert!(typhoon.contains("Severe Typhoon-level"));
    }

    #[test]
    fn test_map_link() {
        let link = map_link("QUEZON CITY, PHILIPPINES").unwrap();
        assert_eq!(link, "https://www.google.com/maps?q=QUEZON+CITY%2C+PHILIPPINES&t=k");
    }

    #[test]
    fn test_storm_lines() {
        let obs = observation();
        assert_eq!(storm_lines(&[], 500.0), ["No typhoons found within 500 km radius."]);

        let storms = nearby_storms(obs.latitude, obs.longitude, &obs.alerts, 500.0);
        let lines = storm_lines(&storms, 500.0);
        assert_eq!(lines[0], "Nearby Typhoons (within 500 km radius):");
        assert_eq!(lines[2], "Event: Typhoon (Severe)");
        assert_eq!(lines[5], "Typhoon Level: Moderate Typhoon (Close)");

        let mut unnamed = storms[0].clone();
        unnamed.event = None;
        let lines = storm_lines(&[unnamed], 500.0);
        assert_eq!(lines[2], "Description: Gale-force winds expected.");
    }

    #[test]
    fn test_render() {
        let text = render("MANILA, PHILIPPINES", &observation(), Region::Default);
        assert!(text.starts_with("MANILA, PHILIPPINES\nhttps://www.google.com/maps?"));
        assert!(text.contains("Asia/Manila"));
        assert!(text.contains("Solar Noon"));
        assert!(text.contains("Typhoon Level"));
    }
}

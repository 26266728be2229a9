use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Config;

const USER_AGENT: &str = concat!("wx-typhoon/", env!("CARGO_PKG_VERSION"));

pub mod geocode {
    use super::*;

    #[derive(Deserialize, Debug, Default)]
    pub struct Geocode {
        #[serde(default)]
        pub results: Vec<Candidate>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Candidate {
        pub formatted: Option<String>,
        pub geometry: Geometry,
    }

    #[derive(Deserialize, Debug)]
    pub struct Geometry {
        pub lat: f64,
        pub lng: f64,
    }

    /// A geocoded location.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Place {
        pub address: String,
        pub latitude: f64,
        pub longitude: f64,
    }

    impl Geocode {
        /// The best match, if the geocoder returned any.
        pub fn best(self) -> Option<Place> {
            self.results.into_iter().next().map(|result| Place {
                address: result
                    .formatted
                    .unwrap_or_else(|| "Unknown Address".to_string()),
                latitude: result.geometry.lat,
                longitude: result.geometry.lng,
            })
        }
    }
}

pub mod forecast {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Deserialize, Debug)]
    pub struct Forecast {
        pub location: Location,
        pub current: Current,
        #[serde(default)]
        pub forecast: Days,
        #[serde(default)]
        pub alerts: Alerts,
    }

    #[derive(Deserialize, Debug)]
    pub struct Location {
        pub name: String,
        #[serde(default)]
        pub region: String,
        #[serde(default)]
        pub country: String,
        pub lat: f64,
        pub lon: f64,
        pub tz_id: String,
        pub localtime_epoch: i64,
        pub localtime: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Current {
        pub temp_c: f64,
        #[serde(default = "day")]
        pub is_day: u8,
        pub condition: Condition,
        pub wind_kph: f64,
        pub wind_degree: Option<f32>,
        #[serde(default)]
        pub wind_dir: String,
        pub pressure_mb: Option<f64>,
        #[serde(default)]
        pub precip_mm: f64,
        pub humidity: f64,
        pub cloud: Option<f64>,
        pub feelslike_c: Option<f64>,
        pub vis_km: Option<f64>,
        pub uv: Option<f64>,
        pub gust_kph: Option<f64>,
    }

    fn day() -> u8 {
        1
    }

    #[derive(Deserialize, Debug)]
    pub struct Condition {
        pub text: String,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Days {
        pub forecastday: Vec<ForecastDay>,
    }

    #[derive(Deserialize, Debug)]
    pub struct ForecastDay {
        pub date: NaiveDate,
        pub day: DaySummary,
        pub astro: Astro,
    }

    #[derive(Deserialize, Debug)]
    pub struct DaySummary {
        pub maxwind_kph: f64,
        pub totalprecip_mm: f64,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Astro {
        pub sunrise: Option<String>,
        pub sunset: Option<String>,
        pub moon_phase: Option<String>,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Alerts {
        #[serde(default)]
        pub alert: Vec<Alert>,
    }

    #[derive(Deserialize, Debug, Clone, Default)]
    pub struct Alert {
        pub headline: Option<String>,
        pub event: Option<String>,
        pub severity: Option<String>,
        pub desc: Option<String>,
        pub lat: Option<f64>,
        pub lon: Option<f64>,
    }
}

/// Blocking client for the weather and geocoding services. Keys and base URLs
/// come from the [`Config`] it is built with.
pub struct WeatherApi {
    client: Client,
    api_key: String,
    url: String,
    open_cage_api_key: String,
    open_cage_url: String,
}

impl WeatherApi {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            open_cage_api_key: config.open_cage_api_key.clone(),
            open_cage_url: config.open_cage_url.clone(),
        })
    }

    /// Resolves an address or time zone name to coordinates.
    pub fn geocode(&self, query: &str) -> anyhow::Result<geocode::Place> {
        tracing::info!("Geocoding '{}'", query);
        let response: geocode::Geocode = self
            .get_web_json(
                &self.open_cage_url,
                &[("q", query), ("key", self.open_cage_api_key.as_str())],
            )?;

        match response.best() {
            Some(place) => {
                tracing::debug!(
                    "'{}' resolved to {} ({}, {})",
                    query,
                    place.address,
                    place.latitude,
                    place.longitude
                );
                Ok(place)
            }
            None => anyhow::bail!("Location not found: {query}"),
        }
    }

    /// Current conditions, today's outlook and any active alerts.
    pub fn forecast(&self, lat: f64, lon: f64) -> Result<forecast::Forecast, reqwest::Error> {
        tracing::info!("Fetching weather for {}, {}", lat, lon);
        let url = format!("{}/forecast.json", self.url);
        let position = format!("{lat},{lon}");
        self.get_web_json(
            &url,
            &[
                ("key", self.api_key.as_str()),
                ("q", position.as_str()),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "yes"),
            ],
        )
    }

    /// GETs `url` and decodes the JSON body. Errors carry no URL since the
    /// query string holds the API key.
    fn get_web_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, reqwest::Error> {
        self.client
            .get(url)
            .query(query)
            .send()
            .and_then(Response::error_for_status)
            .and_then(Response::json::<T>)
            .map_err(reqwest::Error::without_url)
    }
}

//! Rain and typhoon-level classification.
//!
//! Both lookups walk immutable tables ordered from the most to the least
//! severe floor and return the first entry the reading satisfies, so a weaker
//! category that also matches is never reported.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Message returned for readings below every rain floor.
pub const NO_SIGNIFICANT_RAIN: &str = "No significant rain detected.";

/// Rain floors in millimetres, highest first.
pub const RAIN_LEVELS: [(f64, &str); 38] = [
    (500.0, "Catastrophic rainfall! Severe flooding, landslides, and extreme danger to life and property."),
    (400.0, "Exceptionally heavy rain! Widespread destruction and life-threatening conditions expected."),
    (300.0, "Super Typhoon-level rain! Extreme flooding, landslides, and major infrastructure damage expected."),
    (250.0, "Extremely heavy rain! Widespread flooding and severe disruptions."),
    (200.0, "Extreme rain detected! Prepare for catastrophic flooding and mudslides."),
    (175.0, "Intense rain! Dangerous flooding is imminent. Evacuate if necessary."),
    (150.0, "Very intense rain! Major flooding likely, stay indoors and avoid travel."),
    (125.0, "Severe rainfall! Rapid water level rise, strong currents possible."),
    (100.0, "Extreme rain detected! Expect severe flooding and hazardous conditions."),
    (90.0, "Very heavy rain! Travel is dangerous, stay alert for rising waters."),
    (75.0, "Torrential rain! Rapidly rising water levels and hazardous conditions."),
    (60.0, "Persistent heavy rain! Flood-prone areas may experience waterlogging."),
    (50.0, "Very heavy rain detected. Stay indoors if possible."),
    (40.0, "Strong downpour detected! Poor visibility and road hazards likely."),
    (35.0, "Heavy downpour detected! Risk of localized flooding."),
    (30.0, "Significant rain! Watch for potential water pooling on roads."),
    (25.0, "Heavy rain detected! Take necessary precautions."),
    (20.0, "Steady rain! Wet conditions may persist for hours."),
    (15.0, "Moderate to heavy rain detected. Visibility may be reduced and roads could be slick."),
    (12.0, "Moderate rainfall! Prolonged exposure may lead to waterlogging."),
    (10.0, "Moderate rain detected. Conditions could worsen."),
    (8.0, "Noticeable rain! Surfaces may become slippery."),
    (7.0, "Steady rain detected. Ground saturation increasing."),
    (6.0, "Intermittent rain showers! Short breaks expected."),
    (5.0, "Light rain detected. Expect slippery roads and possible minor flooding."),
    (4.0, "Scattered light showers! Brief wet spells."),
    (3.0, "Occasional drizzles with short wet periods."),
    (2.0, "Light rain detected. A light umbrella is recommended."),
    (1.5, "Misting rain! A fine spray of moisture in the air."),
    (1.0, "Very light rain detected. A very slight drizzle."),
    (0.9, "Barely perceptible rain detected. Very light drizzle, almost no impact."),
    (0.7, "Thin mist-like drizzle. Barely noticeable."),
    (0.5, "Very fine drizzle detected. Minimal accumulation."),
    (0.3, "Sparse droplets! Barely wetting the ground."),
    (0.2, "Light drizzle detected. Almost no impact."),
    (0.1, "Drizzle detected! Fine rain with almost no accumulation."),
    (0.05, "Trace moisture detected! A barely perceptible dampness."),
    (0.0, "Not Raining"),
];

/// Message for the greatest rain floor not above `precip_mm`.
pub fn classify_rain(precip_mm: f64) -> &'static str {
    RAIN_LEVELS
        .iter()
        .find(|(floor, _)| precip_mm >= *floor)
        .map(|(_, message)| *message)
        .unwrap_or(NO_SIGNIFICANT_RAIN)
}

/// Climate region used to pick an alternate typhoon table and to tune the
/// warm-weather wind chill model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Default,
    Tropical,
    Arctic,
    Coastal,
    Desert,
    Mountain,
    Temperate,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Default,
        Region::Tropical,
        Region::Arctic,
        Region::Coastal,
        Region::Desert,
        Region::Mountain,
        Region::Temperate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Default => "default",
            Region::Tropical => "tropical",
            Region::Arctic => "arctic",
            Region::Coastal => "coastal",
            Region::Desert => "desert",
            Region::Mountain => "mountain",
            Region::Temperate => "temperate",
        }
    }

    fn typhoon_table(&self) -> &'static [TyphoonLevel] {
        match self {
            Region::Tropical => &TROPICAL_LEVELS,
            Region::Arctic => &ARCTIC_LEVELS,
            Region::Coastal => &COASTAL_LEVELS,
            Region::Default | Region::Desert | Region::Mountain | Region::Temperate => &[],
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown region '{s}'"))
    }
}

/// Storm severity, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Minor,
    Moderate,
    Strong,
    Severe,
    Extreme,
    Catastrophic,
}

/// One row of a typhoon table: both floors must be met.
#[derive(Debug, PartialEq)]
pub struct TyphoonLevel {
    pub precip_mm: f64,
    pub wind_kph: f64,
    pub severity: Severity,
    pub message: &'static str,
}

impl TyphoonLevel {
    const fn new(precip_mm: f64, wind_kph: f64, severity: Severity, message: &'static str) -> Self {
        Self {
            precip_mm,
            wind_kph,
            severity,
            message,
        }
    }

    fn matches(&self, precip_mm: f64, wind_kph: f64) -> bool {
        precip_mm >= self.precip_mm && wind_kph >= self.wind_kph
    }
}

impl fmt::Display for TyphoonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{26a0}\u{fe0f} {}", self.message)
    }
}

use Severity::*;

static TROPICAL_LEVELS: [TyphoonLevel; 3] = [
    TyphoonLevel::new(300.0, 150.0, Extreme, "Extreme tropical storm conditions detected! Major disruptions expected, prepare for flooding."),
    TyphoonLevel::new(200.0, 130.0, Severe, "Severe tropical storm conditions detected. Strong winds and heavy rain expected."),
    TyphoonLevel::new(100.0, 100.0, Strong, "Strong tropical storm conditions detected. Expect moderate flooding and gusty winds."),
];

static ARCTIC_LEVELS: [TyphoonLevel; 2] = [
    TyphoonLevel::new(100.0, 80.0, Severe, "Severe Arctic storm detected. Snow, high winds, and visibility issues expected."),
    TyphoonLevel::new(50.0, 60.0, Moderate, "Moderate Arctic storm detected. Snow accumulation and slippery conditions."),
];

static COASTAL_LEVELS: [TyphoonLevel; 2] = [
    TyphoonLevel::new(350.0, 170.0, Catastrophic, "Catastrophic hurricane-level conditions detected! Life-threatening storm with major flooding."),
    TyphoonLevel::new(250.0, 150.0, Extreme, "Strong hurricane conditions detected. Prepare for extreme flooding and wind damage."),
];

/// Fallback table consulted for every region.
pub static GLOBAL_LEVELS: [TyphoonLevel; 13] = [
    TyphoonLevel::new(500.0, 200.0, Catastrophic, "Catastrophic Typhoon-level conditions detected! Extreme weather, widespread flooding, landslides, and severe damage to infrastructure expected."),
    TyphoonLevel::new(400.0, 180.0, Catastrophic, "Exceptional Typhoon-level conditions detected! Extreme danger to life and property due to severe flooding and high winds."),
    TyphoonLevel::new(300.0, 160.0, Extreme, "Super Typhoon-level conditions detected! Major infrastructure damage expected, with extreme flooding and widespread destruction."),
    TyphoonLevel::new(250.0, 150.0, Extreme, "Extremely heavy rainfall and winds. Major disruptions, widespread flooding, and possible life-threatening conditions."),
    TyphoonLevel::new(200.0, 140.0, Severe, "Severe Typhoon-level conditions detected! Extreme flooding and wind damage expected."),
    TyphoonLevel::new(150.0, 120.0, Severe, "Severe tropical storm-level conditions detected! Prepare for heavy rain, strong winds, and possible flooding."),
    TyphoonLevel::new(120.0, 100.0, Strong, "Strong storm-level conditions detected! Heavy rain, gusty winds, and localized flooding expected."),
    TyphoonLevel::new(100.0, 80.0, Strong, "Tropical storm-level conditions detected. Heavy rainfall and moderate winds expected. Stay alert for flooding."),
    TyphoonLevel::new(80.0, 70.0, Moderate, "Moderate tropical storm conditions. Heavy rain, gusty winds, and possible localized flooding."),
    TyphoonLevel::new(50.0, 50.0, Moderate, "Strong wind and moderate rain detected. Risk of localized flooding and road hazards."),
    TyphoonLevel::new(30.0, 40.0, Moderate, "Moderate storm conditions. Expect rain and gusty winds, localized flooding possible."),
    TyphoonLevel::new(20.0, 30.0, Minor, "Strong rainfall with moderate winds. Risk of slippery roads and minor flooding."),
    TyphoonLevel::new(10.0, 20.0, Minor, "Moderate rainfall with light winds. Road conditions may be slippery."),
];

fn first_match(table: &'static [TyphoonLevel], precip_mm: f64, wind_kph: f64) -> Option<&'static TyphoonLevel> {
    table.iter().find(|level| level.matches(precip_mm, wind_kph))
}

/// Resolves the typhoon level for a reading.
///
/// The region table and the global table are both consulted; the more severe
/// entry wins and a tie goes to the region entry.
pub fn typhoon_level(precip_mm: f64, wind_kph: f64, region: Region) -> Option<&'static TyphoonLevel> {
    let regional = first_match(region.typhoon_table(), precip_mm, wind_kph);
    let global = first_match(&GLOBAL_LEVELS, precip_mm, wind_kph);

    match (regional, global) {
        (Some(r), Some(g)) if g.severity > r.severity => Some(g),
        (Some(r), _) => Some(r),
        (None, g) => g,
    }
}

/// Alert text for the current reading, with the forecast reading's level
/// appended when a forecast pair is supplied and it classifies.
pub fn classify_typhoon(
    precip_mm: f64,
    wind_kph: f64,
    region: Region,
    forecast: Option<(f64, f64)>,
) -> Option<String> {
    let current = typhoon_level(precip_mm, wind_kph, region).map(|level| level.to_string());
    let forecast = forecast
        .and_then(|(precip, wind)| typhoon_level(precip, wind, region))
        .map(|level| format!("Forecast Typhoon-level conditions: {level}"));

    match (current, forecast) {
        (Some(current), Some(forecast)) => Some(format!("{current}\n{forecast}")),
        (current, forecast) => current.or(forecast),
    }
}

/// Combined rain and storm summary for the current reading and, when known,
/// the day's forecast totals.
pub fn rain_report(precip_mm: f64, wind_kph: f64, forecast: Option<(f64, f64)>) -> String {
    let forecast_message = match forecast {
        Some((precip, _)) => classify_rain(precip),
        None => "No rain forecasted.",
    };
    let mut report = format!(
        "Rain forecast: {forecast_message}\nRain Message: {}",
        classify_rain(precip_mm)
    );

    if let Some(level) = typhoon_level(precip_mm, wind_kph, Region::Default) {
        report.push_str(&format!("\n{level}"));
    }
    if let Some(level) = forecast.and_then(|(p, w)| typhoon_level(p, w, Region::Default)) {
        report.push_str(&format!("\n{level}"));
    }
    report
}

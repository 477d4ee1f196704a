use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::RiskLevel;
use crate::features::FeatureVector;
use crate::hazard::HazardKind;
use crate::resources::CityResources;

/// A country-qualified city lookup, e.g. "Mumbai" + "IN".
#[derive(Debug, Clone)]
pub struct CityQuery {
    pub city: String,
    pub country: Option<String>,
}

impl CityQuery {
    pub fn new(city: impl Into<String>, country: Option<String>) -> Self {
        Self { city: city.into(), country }
    }

    /// Query string in the form providers expect: "city" or "city,CC".
    pub fn qualified(&self) -> String {
        match &self.country {
            Some(cc) => format!("{},{}", self.city, cc),
            None => self.city.clone(),
        }
    }
}

/// A normalized current-conditions record from a weather provider.
///
/// Wind speed is always km/h here; providers reporting m/s convert before
/// constructing this. Missing rainfall means no rain: 0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub provider: String,
    pub city: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub wind_speed_kmh: f64,
    pub rainfall_1h_mm: f64,
    pub description: String,
    pub observation_time: DateTime<Utc>,
}

/// Classifier output joined with its localized presentation bundle.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// Class probabilities indexed by risk level; sums to 1.0.
    pub probabilities: [f64; 4],
    /// Probability of the predicted class.
    pub confidence: f64,
    pub label: String,
    pub title: String,
    pub message: String,
    pub actions: Vec<String>,
    pub color: String,
    pub gradient: String,
    pub emoji: String,
}

/// Everything the presentation layer gets for one assessed city.
#[derive(Debug, Clone, Serialize)]
pub struct HazardReport {
    pub hazard: HazardKind,
    pub observation: WeatherObservation,
    pub features: FeatureVector,
    pub assessment: RiskAssessment,
    /// Present only for High-Risk/Critical assessments of cities in the
    /// reference table.
    pub resources: Option<&'static CityResources>,
}

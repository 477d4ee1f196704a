//! Feature synthesis: turning a sparse current-conditions observation into
//! the fixed-length vector a hazard classifier was trained on.
//!
//! The provider only reports instantaneous readings, while the classifiers
//! expect longer-horizon or unobservable quantities (24h rainfall, river
//! level, soil moisture, ...). Observable-adjacent quantities are derived
//! with the formulas below; quantities with no observable proxy at all come
//! from a [`SiteEstimator`], which by default samples bounded placeholder
//! values. Those samples are placeholders, not predictions — a deployment
//! with geographic data should swap in a real estimator.

use chrono::{Datelike, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::hazard::HazardKind;
use crate::model::WeatherObservation;

/// Contract violation inside a feature vector. These are programming errors,
/// not recoverable request failures.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("feature vector for {hazard} is missing required field '{field}'")]
    MissingField { hazard: HazardKind, field: &'static str },

    #[error("feature '{field}' for {hazard} is not a finite number")]
    NonFinite { hazard: HazardKind, field: &'static str },

    #[error("feature vector for {actual} handed to a {expected} classifier")]
    HazardMismatch { expected: HazardKind, actual: HazardKind },
}

/// An ordered set of named numeric features for one hazard type.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    hazard: HazardKind,
    fields: Vec<(&'static str, f64)>,
}

impl FeatureVector {
    fn new(hazard: HazardKind) -> Self {
        Self { hazard, fields: Vec::with_capacity(hazard.feature_order().len()) }
    }

    /// Build a vector from explicit pairs. Intended for tests and for
    /// callers that compute features themselves.
    pub fn from_pairs(hazard: HazardKind, fields: Vec<(&'static str, f64)>) -> Self {
        Self { hazard, fields }
    }

    fn push(&mut self, name: &'static str, value: f64) {
        self.fields.push((name, value));
    }

    pub fn hazard(&self) -> HazardKind {
        self.hazard
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn fields(&self) -> &[(&'static str, f64)] {
        &self.fields
    }

    /// Values reordered into the hazard's training column order.
    pub fn ordered(&self) -> Result<Vec<f64>, FeatureError> {
        self.hazard
            .feature_order()
            .iter()
            .map(|&field| {
                let value = self.get(field).ok_or(FeatureError::MissingField {
                    hazard: self.hazard,
                    field,
                })?;
                if !value.is_finite() {
                    return Err(FeatureError::NonFinite { hazard: self.hazard, field });
                }
                Ok(value)
            })
            .collect()
    }
}

/// Site characteristics no current-conditions response can supply.
///
/// Implementations may sample placeholders (the default) or look the city up
/// in real geographic data; the rest of the pipeline cannot tell the
/// difference, which is the point.
pub trait SiteEstimator: Send {
    /// Elevation above sea level, metres.
    fn elevation_m(&mut self, city: &str) -> f64;
    /// Drainage capacity on a 1-10 scale.
    fn drainage_density(&mut self, city: &str) -> f64;
    /// Land use on a 1-10 scale, 10 = dense urban.
    fn land_use_index(&mut self, city: &str) -> f64;
    /// Distance to the nearest coastline, km.
    fn distance_to_coast_km(&mut self, city: &str) -> f64;
    /// Ocean heat content off the nearest coast, kJ/cm².
    fn ocean_heat_content(&mut self, city: &str) -> f64;
    /// Urban heat island intensity on a 1-10 scale.
    fn urban_heat_island_index(&mut self, city: &str) -> f64;
}

/// Placeholder [`SiteEstimator`] drawing every quantity from a bounded
/// uniform range, independent of the city.
#[derive(Debug)]
pub struct SampledSite {
    rng: StdRng,
    pub elevation_m_range: (f64, f64),
    pub drainage_density_range: (f64, f64),
    pub land_use_index_range: (f64, f64),
    pub distance_to_coast_km_range: (f64, f64),
    pub ocean_heat_content_range: (f64, f64),
    pub urban_heat_island_range: (f64, f64),
}

impl SampledSite {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sampler for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            elevation_m_range: (50.0, 300.0),
            drainage_density_range: (3.0, 7.0),
            land_use_index_range: (5.0, 8.0),
            distance_to_coast_km_range: (0.0, 500.0),
            ocean_heat_content_range: (20.0, 120.0),
            urban_heat_island_range: (1.0, 10.0),
        }
    }

    fn sample(&mut self, range: (f64, f64)) -> f64 {
        self.rng.gen_range(range.0..range.1)
    }
}

impl Default for SampledSite {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteEstimator for SampledSite {
    fn elevation_m(&mut self, _city: &str) -> f64 {
        let r = self.elevation_m_range;
        self.sample(r)
    }

    fn drainage_density(&mut self, _city: &str) -> f64 {
        let r = self.drainage_density_range;
        self.sample(r)
    }

    fn land_use_index(&mut self, _city: &str) -> f64 {
        let r = self.land_use_index_range;
        self.sample(r)
    }

    fn distance_to_coast_km(&mut self, _city: &str) -> f64 {
        let r = self.distance_to_coast_km_range;
        self.sample(r)
    }

    fn ocean_heat_content(&mut self, _city: &str) -> f64 {
        let r = self.ocean_heat_content_range;
        self.sample(r)
    }

    fn urban_heat_island_index(&mut self, _city: &str) -> f64 {
        let r = self.urban_heat_island_range;
        self.sample(r)
    }
}

/// Heuristic constants for the synthesis formulas.
///
/// The extrapolation ranges come from the field prototype and carry no
/// documented physical justification; they are collected here, rather than
/// scattered through the formulas, so a domain expert can revise them in one
/// place.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// 1h → 24h rainfall extrapolation multiplier range.
    pub rainfall_24h_multiplier: (f64, f64),
    /// Assumed 24h rainfall (mm) when the gauge reads dry but the air is
    /// saturated.
    pub saturated_rainfall_mm: (f64, f64),
    /// Humidity above which dry-gauge air counts as saturated, %.
    pub saturated_humidity_pct: f64,
    /// Pressure below which dry-gauge air counts as saturated, hPa.
    pub low_pressure_hpa: f64,
    /// Baseline river stage, metres.
    pub river_baseline_m: f64,
    pub river_level_jitter_m: (f64, f64),
    pub soil_moisture_jitter_pct: (f64, f64),
    /// Offset from air temperature to sea surface temperature, °C.
    pub sea_surface_offset_c: f64,
    pub sea_surface_jitter_c: (f64, f64),
    /// Translation speed of a hypothetical storm system, km/h.
    pub system_movement_kmh: (f64, f64),
    /// Allowance from an instantaneous reading up to the daily maximum, °C.
    pub daily_max_allowance_c: (f64, f64),
    pub heat_index_jitter_c: (f64, f64),
    /// Length of a hot spell once the daily max crosses 35 °C, days.
    pub hot_spell_days: (u32, u32),
    pub dry_soil_jitter_pct: (f64, f64),
    pub cloud_cover_jitter_pct: (f64, f64),
    pub seasonal_baseline_jitter_c: (f64, f64),
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            rainfall_24h_multiplier: (8.0, 15.0),
            saturated_rainfall_mm: (20.0, 50.0),
            saturated_humidity_pct: 85.0,
            low_pressure_hpa: 1005.0,
            river_baseline_m: 5.0,
            river_level_jitter_m: (-1.0, 2.0),
            soil_moisture_jitter_pct: (-5.0, 5.0),
            sea_surface_offset_c: -1.0,
            sea_surface_jitter_c: (-1.5, 1.5),
            system_movement_kmh: (5.0, 30.0),
            daily_max_allowance_c: (0.0, 3.0),
            heat_index_jitter_c: (-1.0, 1.0),
            hot_spell_days: (1, 7),
            dry_soil_jitter_pct: (-10.0, 10.0),
            cloud_cover_jitter_pct: (-15.0, 15.0),
            seasonal_baseline_jitter_c: (-2.0, 2.0),
        }
    }
}

/// Produces a complete [`FeatureVector`] for a hazard from a single
/// observation. One formula table per hazard; the hazard is always an
/// explicit parameter, never inferred from the weather itself.
pub struct FeatureSynthesizer {
    rng: StdRng,
    site: Box<dyn SiteEstimator>,
    tuning: Tuning,
}

impl FeatureSynthesizer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            site: Box::new(SampledSite::new()),
            tuning: Tuning::default(),
        }
    }

    /// Fully deterministic synthesizer: same seed, same observation, same
    /// month → same vector.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            site: Box::new(SampledSite::seeded(seed.wrapping_add(1))),
            tuning: Tuning::default(),
        }
    }

    pub fn with_site(mut self, site: Box<dyn SiteEstimator>) -> Self {
        self.site = site;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Synthesize using the current calendar month as the seasonality proxy.
    pub fn synthesize(&mut self, hazard: HazardKind, obs: &WeatherObservation) -> FeatureVector {
        let month = Local::now().month();
        self.synthesize_for_month(hazard, obs, month)
    }

    /// Month-explicit variant for tests and historical replays.
    pub fn synthesize_for_month(
        &mut self,
        hazard: HazardKind,
        obs: &WeatherObservation,
        month: u32,
    ) -> FeatureVector {
        match hazard {
            HazardKind::Flood => self.flood_features(obs, month),
            HazardKind::Cyclone => self.cyclone_features(obs, month),
            HazardKind::Heatwave => self.heatwave_features(obs, month),
        }
    }

    fn flood_features(&mut self, obs: &WeatherObservation, month: u32) -> FeatureVector {
        let rainfall = self.rainfall_24h(obs);
        let river_level = (self.tuning.river_baseline_m
            + rainfall / 100.0
            + self.jitter(self.tuning.river_level_jitter_m))
        .max(0.0);
        // Saturation proxy; clamp is deliberate, moisture is a percentage.
        let soil_moisture = (obs.humidity_pct * 0.4
            + rainfall / 5.0
            + self.jitter(self.tuning.soil_moisture_jitter_pct))
        .clamp(0.0, 100.0);

        let mut v = FeatureVector::new(HazardKind::Flood);
        v.push("rainfall", round2(rainfall));
        v.push("river_level", round2(river_level));
        v.push("humidity", round2(obs.humidity_pct));
        v.push("month", f64::from(month));
        v.push("wind_speed", round2(obs.wind_speed_kmh));
        v.push("temperature", round2(obs.temperature_c));
        v.push("soil_moisture", round2(soil_moisture));
        v.push("elevation", round2(self.site.elevation_m(&obs.city)));
        v.push("drainage_density", round2(self.site.drainage_density(&obs.city)));
        v.push("land_use_index", round2(self.site.land_use_index(&obs.city)));
        v
    }

    fn cyclone_features(&mut self, obs: &WeatherObservation, month: u32) -> FeatureVector {
        let rainfall = self.rainfall_24h(obs);
        let sea_surface_temp = (obs.temperature_c
            + self.tuning.sea_surface_offset_c
            + self.jitter(self.tuning.sea_surface_jitter_c))
        .clamp(24.0, 32.0);
        let system_movement = self.jitter(self.tuning.system_movement_kmh);

        let mut v = FeatureVector::new(HazardKind::Cyclone);
        v.push("wind_speed", round2(obs.wind_speed_kmh));
        v.push("pressure", round2(obs.pressure_hpa));
        v.push("sea_surface_temp", round2(sea_surface_temp));
        v.push("rainfall", round2(rainfall));
        v.push("distance_to_coast", round2(self.site.distance_to_coast_km(&obs.city)));
        v.push("system_movement_speed", round2(system_movement));
        v.push("humidity", round2(obs.humidity_pct));
        v.push("ocean_heat_content", round2(self.site.ocean_heat_content(&obs.city)));
        v.push("month", f64::from(month));
        v.push("elevation", round2(self.site.elevation_m(&obs.city)));
        v
    }

    fn heatwave_features(&mut self, obs: &WeatherObservation, month: u32) -> FeatureVector {
        let max_temperature = obs.temperature_c + self.jitter(self.tuning.daily_max_allowance_c);
        // Feels-like approximation: humid air above 27 °C reads hotter.
        let mut heat_index = if max_temperature >= 27.0 && obs.humidity_pct >= 40.0 {
            max_temperature + (obs.humidity_pct - 40.0) * 0.1
        } else {
            max_temperature
        };
        heat_index += self.jitter(self.tuning.heat_index_jitter_c);

        let consecutive_hot_days = if max_temperature > 35.0 {
            let (lo, hi) = self.tuning.hot_spell_days;
            f64::from(self.rng.gen_range(lo..=hi))
        } else {
            0.0
        };
        let soil_moisture = (obs.humidity_pct * 0.6
            + self.jitter(self.tuning.dry_soil_jitter_pct))
        .clamp(0.0, 100.0);
        let cloud_cover = (obs.humidity_pct * 0.8
            + self.jitter(self.tuning.cloud_cover_jitter_pct))
        .clamp(0.0, 100.0);
        let seasonal_baseline = 25.0
            + if is_summer(month) { 10.0 } else { 0.0 }
            + self.jitter(self.tuning.seasonal_baseline_jitter_c);
        let temp_anomaly = max_temperature - seasonal_baseline;

        let mut v = FeatureVector::new(HazardKind::Heatwave);
        v.push("max_temperature", round2(max_temperature));
        v.push("heat_index", round2(heat_index));
        v.push("humidity", round2(obs.humidity_pct));
        v.push("consecutive_hot_days", consecutive_hot_days);
        v.push("wind_speed", round2(obs.wind_speed_kmh));
        v.push("soil_moisture", round2(soil_moisture));
        v.push("month", f64::from(month));
        v.push("cloud_cover", round2(cloud_cover));
        v.push("urban_heat_island_idx", round2(self.site.urban_heat_island_index(&obs.city)));
        v.push("temp_anomaly", round2(temp_anomaly));
        v
    }

    /// 24h rainfall estimate from the 1h gauge reading, with a fallback for
    /// saturated low-pressure air over a dry gauge.
    fn rainfall_24h(&mut self, obs: &WeatherObservation) -> f64 {
        let multiplier = self.jitter(self.tuning.rainfall_24h_multiplier);
        let estimate = obs.rainfall_1h_mm * multiplier;

        if estimate < 1.0
            && obs.humidity_pct > self.tuning.saturated_humidity_pct
            && obs.pressure_hpa < self.tuning.low_pressure_hpa
        {
            return self.jitter(self.tuning.saturated_rainfall_mm);
        }

        estimate
    }

    fn jitter(&mut self, range: (f64, f64)) -> f64 {
        self.rng.gen_range(range.0..range.1)
    }
}

impl Default for FeatureSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_summer(month: u32) -> bool {
    (4..=7).contains(&month)
}

/// Presentation rounding, applied once per field after all arithmetic.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Pipeline orchestration: city name in, hazard report out.
//!
//! One synchronous pass per request: fetch → synthesize → classify → map.
//! The only state shared between requests is the immutable artifact store.

use anyhow::Result;

use crate::classifier::ArtifactStore;
use crate::descriptor::{self, Language};
use crate::features::FeatureSynthesizer;
use crate::hazard::HazardKind;
use crate::model::{CityQuery, HazardReport};
use crate::provider::WeatherProvider;
use crate::resources;

pub struct RiskPipeline {
    provider: Box<dyn WeatherProvider>,
    artifacts: ArtifactStore,
    seed: Option<u64>,
}

impl RiskPipeline {
    pub fn new(provider: Box<dyn WeatherProvider>, artifacts: ArtifactStore) -> Self {
        Self { provider, artifacts, seed: None }
    }

    /// Fix the synthesis seed: with the same observation and artifact, every
    /// call then produces the same features and risk level.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Assess a city for one hazard.
    ///
    /// `Ok(None)` means the weather fetch failed; the caller should show a
    /// retry prompt. Artifact and feature-contract problems are real errors:
    /// the former belong to startup, the latter are programming errors.
    pub async fn assess(
        &self,
        query: &CityQuery,
        hazard: HazardKind,
        language: Language,
    ) -> Result<Option<HazardReport>> {
        let artifact = self.artifacts.get(hazard)?;

        let observation = match self.provider.current_observation(query).await {
            Ok(obs) => obs,
            Err(err) => {
                log::warn!("weather fetch failed for '{}': {err:#}", query.city);
                return Ok(None);
            }
        };

        let mut synthesizer = match self.seed {
            Some(seed) => FeatureSynthesizer::seeded(seed),
            None => FeatureSynthesizer::new(),
        };
        let features = synthesizer.synthesize(hazard, &observation);

        let prediction = artifact.predict(&features)?;
        let assessment = descriptor::describe(language, prediction.level, prediction.probabilities);

        let resources = if prediction.level.is_severe() {
            resources::for_city(&observation.city)
        } else {
            None
        };

        log::info!(
            "assessed {hazard} risk for '{}': {} ({:.0}% confidence)",
            observation.city,
            prediction.level,
            prediction.confidence() * 100.0
        );

        Ok(Some(HazardReport { hazard, observation, features, assessment, resources }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ForestModel, HazardArtifact, Scaler, TreeNode};
    use crate::descriptor::RiskLevel;
    use crate::model::WeatherObservation;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;

    #[derive(Debug)]
    struct FixedProvider(WeatherObservation);

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn current_observation(&self, _query: &CityQuery) -> Result<WeatherObservation> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct DownProvider;

    #[async_trait]
    impl WeatherProvider for DownProvider {
        async fn current_observation(&self, _query: &CityQuery) -> Result<WeatherObservation> {
            Err(anyhow!("connect timeout"))
        }
    }

    fn observation(temp: f64, humidity: f64, pressure: f64, wind: f64, rain_1h: f64) -> WeatherObservation {
        WeatherObservation {
            provider: "test".to_string(),
            city: "Mumbai".to_string(),
            temperature_c: temp,
            humidity_pct: humidity,
            pressure_hpa: pressure,
            wind_speed_kmh: wind,
            rainfall_1h_mm: rain_1h,
            description: "test conditions".to_string(),
            observation_time: Utc::now(),
        }
    }

    /// Flood fake keyed on the synthesized 24h rainfall: ≤60 safe,
    /// 60..=150 high-risk, >150 critical.
    fn flood_store() -> ArtifactStore {
        let model = ForestModel {
            trees: vec![TreeNode::Split {
                feature: 0,
                threshold: 60.0,
                left: Box::new(TreeNode::Leaf { weights: [180.0, 20.0, 0.0, 0.0] }),
                right: Box::new(TreeNode::Split {
                    feature: 0,
                    threshold: 150.0,
                    left: Box::new(TreeNode::Leaf { weights: [10.0, 60.0, 120.0, 10.0] }),
                    right: Box::new(TreeNode::Leaf { weights: [0.0, 0.0, 30.0, 170.0] }),
                }),
            }],
        };
        let scaler = Scaler::identity(HazardKind::Flood.feature_order());
        let artifact = HazardArtifact::from_parts(HazardKind::Flood, model, scaler).unwrap();
        ArtifactStore::from_artifacts([artifact])
    }

    fn query() -> CityQuery {
        CityQuery::new("Mumbai", Some("IN".to_string()))
    }

    #[tokio::test]
    async fn calm_weather_assesses_safe() {
        let provider = Box::new(FixedProvider(observation(28.0, 60.0, 1015.0, 36.0, 0.0)));
        let pipeline = RiskPipeline::new(provider, flood_store()).with_seed(1);

        let report = pipeline
            .assess(&query(), HazardKind::Flood, Language::En)
            .await
            .unwrap()
            .expect("weather available");

        assert_eq!(report.assessment.risk_level, RiskLevel::Safe);
        assert_eq!(report.assessment.label, "Safe");
        assert!(report.features.get("rainfall").unwrap() < 60.0);
        // Safe assessments carry no emergency resources.
        assert!(report.resources.is_none());
    }

    #[tokio::test]
    async fn monsoon_deluge_assesses_critical() {
        let provider = Box::new(FixedProvider(observation(24.0, 97.0, 995.0, 60.0, 25.0)));
        let pipeline = RiskPipeline::new(provider, flood_store()).with_seed(1);

        let report = pipeline
            .assess(&query(), HazardKind::Flood, Language::En)
            .await
            .unwrap()
            .expect("weather available");

        assert_eq!(report.assessment.risk_level, RiskLevel::Critical);
        assert_eq!(report.assessment.label, "Critical");
        assert!(report.features.get("rainfall").unwrap() > 150.0);
        assert!(!report.assessment.actions.is_empty());
        assert!(report.assessment.actions[0].contains("EVACUATE"));
        // Critical in a known city surfaces the emergency table.
        let resources = report.resources.expect("mumbai resources");
        assert!(!resources.hospitals.is_empty());
    }

    #[tokio::test]
    async fn hindi_bundle_is_returned_when_requested() {
        let provider = Box::new(FixedProvider(observation(24.0, 97.0, 995.0, 60.0, 25.0)));
        let pipeline = RiskPipeline::new(provider, flood_store()).with_seed(1);

        let report = pipeline
            .assess(&query(), HazardKind::Flood, Language::Hi)
            .await
            .unwrap()
            .expect("weather available");

        assert_eq!(report.assessment.label, "गंभीर");
    }

    #[tokio::test]
    async fn fetch_failure_yields_no_result() {
        let pipeline = RiskPipeline::new(Box::new(DownProvider), flood_store());

        let outcome = pipeline.assess(&query(), HazardKind::Flood, Language::En).await.unwrap();

        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn unloaded_hazard_is_an_error_not_a_miss() {
        let provider = Box::new(FixedProvider(observation(30.0, 50.0, 1010.0, 20.0, 0.0)));
        let pipeline = RiskPipeline::new(provider, flood_store());

        let err = pipeline.assess(&query(), HazardKind::Cyclone, Language::En).await.unwrap_err();

        assert!(err.to_string().contains("no artifact loaded"));
    }

    #[tokio::test]
    async fn seeded_pipeline_is_deterministic() {
        let obs = observation(24.0, 97.0, 995.0, 60.0, 25.0);
        let pipeline =
            RiskPipeline::new(Box::new(FixedProvider(obs)), flood_store()).with_seed(9);

        let first = pipeline
            .assess(&query(), HazardKind::Flood, Language::En)
            .await
            .unwrap()
            .unwrap();
        let second = pipeline
            .assess(&query(), HazardKind::Flood, Language::En)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.features.fields(), second.features.fields());
        assert_eq!(first.assessment.risk_level, second.assessment.risk_level);
        assert_eq!(first.assessment.probabilities, second.assessment.probabilities);
    }
}

//! Core library for the `hazard` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers
//! - Feature synthesis from sparse current-conditions observations
//! - The pre-trained risk classifier adapter and artifact store
//! - Localized risk descriptors and emergency reference data
//! - The assessment pipeline tying those together
//!
//! It is used by `hazard-cli`, but can also be reused by other binaries or services.

pub mod classifier;
pub mod config;
pub mod descriptor;
pub mod features;
pub mod hazard;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod resources;

pub use classifier::{ArtifactError, ArtifactStore, HazardArtifact, Prediction};
pub use config::{Config, ProviderConfig};
pub use descriptor::{Language, RiskLevel};
pub use features::{FeatureError, FeatureSynthesizer, FeatureVector, SiteEstimator};
pub use hazard::HazardKind;
pub use model::{CityQuery, HazardReport, RiskAssessment, WeatherObservation};
pub use pipeline::RiskPipeline;
pub use provider::{ProviderId, WeatherProvider};

//! Risk classifier adapter: pre-trained ensemble-tree artifacts and the
//! scaling + inference step.
//!
//! An artifact is a (model, scaler) pair serialized as JSON, exported by the
//! training pipeline. Artifacts are loaded once at startup, validated against
//! the hazard's training column order, and shared read-only afterwards; the
//! pipeline treats the model itself as a replaceable black box.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::RiskLevel;
use crate::features::{FeatureError, FeatureVector};
use crate::hazard::HazardKind;

/// The classifiers are four-class ordinal models.
pub const CLASS_COUNT: usize = 4;

/// Startup-time artifact problems. All of these are fatal: a process that
/// cannot load an artifact must not serve predictions for that hazard.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{hazard} scaler covers {actual} columns, model expects {expected}")]
    Shape { hazard: HazardKind, expected: usize, actual: usize },

    #[error("{hazard} artifact column order mismatch: {detail}")]
    Columns { hazard: HazardKind, detail: String },

    #[error("{hazard} model artifact is invalid: {detail}")]
    Model { hazard: HazardKind, detail: String },

    #[error("no artifact loaded for hazard '{0}'")]
    NotLoaded(HazardKind),
}

/// Fitted z-score scaler: (x - mean) / scale per column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    /// Pass-through scaler over the given columns. Handy for hand-built
    /// artifacts in tests.
    pub fn identity(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            mean: vec![0.0; columns.len()],
            scale: vec![1.0; columns.len()],
        }
    }

    fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (mean, scale))| (v - mean) / scale)
            .collect()
    }
}

/// One node of a fitted decision tree. Split convention is `<=` on the
/// scaled feature value, matching the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        /// Per-class sample weights at this leaf; normalized at inference.
        weights: [f64; CLASS_COUNT],
    },
}

impl TreeNode {
    fn leaf_weights(&self, x: &[f64]) -> &[f64; CLASS_COUNT] {
        match self {
            TreeNode::Leaf { weights } => weights,
            TreeNode::Split { feature, threshold, left, right } => {
                if x[*feature] <= *threshold {
                    left.leaf_weights(x)
                } else {
                    right.leaf_weights(x)
                }
            }
        }
    }

    fn validate(&self, feature_count: usize) -> Result<(), String> {
        match self {
            TreeNode::Leaf { weights } => {
                let total: f64 = weights.iter().sum();
                if !total.is_finite() || total <= 0.0 {
                    return Err("leaf with non-positive total weight".to_string());
                }
                if weights.iter().any(|w| *w < 0.0) {
                    return Err("leaf with negative class weight".to_string());
                }
                Ok(())
            }
            TreeNode::Split { feature, threshold, left, right } => {
                if *feature >= feature_count {
                    return Err(format!(
                        "split on feature index {feature}, artifact has {feature_count} columns"
                    ));
                }
                if !threshold.is_finite() {
                    return Err("non-finite split threshold".to_string());
                }
                left.validate(feature_count)?;
                right.validate(feature_count)
            }
        }
    }
}

/// A fitted tree ensemble. Class probabilities are the mean of the
/// normalized leaf distributions across trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<TreeNode>,
}

impl ForestModel {
    fn predict_proba(&self, x: &[f64]) -> [f64; CLASS_COUNT] {
        let mut acc = [0.0; CLASS_COUNT];
        for tree in &self.trees {
            let weights = tree.leaf_weights(x);
            let total: f64 = weights.iter().sum();
            for (slot, weight) in acc.iter_mut().zip(weights) {
                *slot += weight / total;
            }
        }
        let trees = self.trees.len() as f64;
        for slot in &mut acc {
            *slot /= trees;
        }
        acc
    }
}

/// Classifier output before descriptor mapping.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub level: RiskLevel,
    pub probabilities: [f64; CLASS_COUNT],
}

impl Prediction {
    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.probabilities[self.level.index()]
    }
}

/// A validated (model, scaler) pair for one hazard.
#[derive(Debug)]
pub struct HazardArtifact {
    hazard: HazardKind,
    model: ForestModel,
    scaler: Scaler,
}

impl HazardArtifact {
    /// Assemble an artifact from already-deserialized parts, validating the
    /// column contract. This is also the seam for fake artifacts in tests.
    pub fn from_parts(
        hazard: HazardKind,
        model: ForestModel,
        scaler: Scaler,
    ) -> Result<Self, ArtifactError> {
        let expected = hazard.feature_order();

        if scaler.columns.len() != expected.len()
            || scaler.mean.len() != expected.len()
            || scaler.scale.len() != expected.len()
        {
            return Err(ArtifactError::Shape {
                hazard,
                expected: expected.len(),
                actual: scaler.columns.len().min(scaler.mean.len()).min(scaler.scale.len()),
            });
        }

        for (got, want) in scaler.columns.iter().zip(expected) {
            if got != want {
                return Err(ArtifactError::Columns {
                    hazard,
                    detail: format!("found '{got}' where '{want}' was trained"),
                });
            }
        }

        if scaler.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ArtifactError::Model {
                hazard,
                detail: "scaler has a non-positive scale entry".to_string(),
            });
        }

        if model.trees.is_empty() {
            return Err(ArtifactError::Model { hazard, detail: "ensemble has no trees".to_string() });
        }
        for (index, tree) in model.trees.iter().enumerate() {
            tree.validate(expected.len())
                .map_err(|detail| ArtifactError::Model { hazard, detail: format!("tree {index}: {detail}") })?;
        }

        Ok(Self { hazard, model, scaler })
    }

    /// Load `<hazard>_model.json` and `<hazard>_scaler.json` from `dir`.
    pub fn load(dir: &Path, hazard: HazardKind) -> Result<Self, ArtifactError> {
        let model: ForestModel = read_json(&dir.join(format!("{hazard}_model.json")))?;
        let scaler: Scaler = read_json(&dir.join(format!("{hazard}_scaler.json")))?;

        let artifact = Self::from_parts(hazard, model, scaler)?;
        log::info!(
            "loaded {hazard} artifact: {} trees over {} features",
            artifact.model.trees.len(),
            artifact.scaler.columns.len()
        );
        Ok(artifact)
    }

    pub fn hazard(&self) -> HazardKind {
        self.hazard
    }

    /// Reorder into training column order, scale, infer, arg-max.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, FeatureError> {
        if features.hazard() != self.hazard {
            return Err(FeatureError::HazardMismatch {
                expected: self.hazard,
                actual: features.hazard(),
            });
        }

        let ordered = features.ordered()?;
        let scaled = self.scaler.transform(&ordered);
        let probabilities = self.model.predict_proba(&scaled);

        let mut best = 0;
        for class in 1..CLASS_COUNT {
            if probabilities[class] > probabilities[best] {
                best = class;
            }
        }

        Ok(Prediction { level: RiskLevel::from_index(best), probabilities })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing { path: path.to_path_buf() });
    }

    let contents = fs::read_to_string(path)
        .map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;

    serde_json::from_str(&contents)
        .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })
}

/// Process-wide store of loaded artifacts, keyed by hazard.
///
/// Populated once during initialization; immutable and lock-free to share
/// afterwards.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    loaded: HashMap<HazardKind, Arc<HazardArtifact>>,
}

impl ArtifactStore {
    /// Load artifact pairs for every hazard kind.
    pub fn load_all(dir: &Path) -> Result<Self, ArtifactError> {
        Self::load(dir, HazardKind::all())
    }

    /// Load artifact pairs for a subset of hazards.
    pub fn load(dir: &Path, hazards: &[HazardKind]) -> Result<Self, ArtifactError> {
        let mut loaded = HashMap::new();
        for hazard in hazards {
            loaded.insert(*hazard, Arc::new(HazardArtifact::load(dir, *hazard)?));
        }
        Ok(Self { loaded })
    }

    /// Build a store from pre-assembled artifacts (fakes, embedders).
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = HazardArtifact>) -> Self {
        let loaded =
            artifacts.into_iter().map(|artifact| (artifact.hazard, Arc::new(artifact))).collect();
        Self { loaded }
    }

    pub fn get(&self, hazard: HazardKind) -> Result<&HazardArtifact, ArtifactError> {
        self.loaded.get(&hazard).map(Arc::as_ref).ok_or(ArtifactError::NotLoaded(hazard))
    }

    pub fn is_loaded(&self, hazard: HazardKind) -> bool {
        self.loaded.contains_key(&hazard)
    }
}

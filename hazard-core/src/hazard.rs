use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Hazard type the pipeline assesses. Selects the feature schema, the
/// synthesis formulas and the (model, scaler) artifact pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Flood,
    Cyclone,
    Heatwave,
}

impl HazardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Flood => "flood",
            HazardKind::Cyclone => "cyclone",
            HazardKind::Heatwave => "heatwave",
        }
    }

    pub const fn all() -> &'static [HazardKind] {
        &[HazardKind::Flood, HazardKind::Cyclone, HazardKind::Heatwave]
    }

    /// Feature column order the classifier for this hazard was fit with.
    ///
    /// The models have no field-name awareness at inference time, so this
    /// list is part of the artifact contract: reordering a feature vector
    /// against anything else silently corrupts predictions.
    pub fn feature_order(&self) -> &'static [&'static str] {
        match self {
            HazardKind::Flood => &[
                "rainfall",
                "river_level",
                "humidity",
                "month",
                "wind_speed",
                "temperature",
                "soil_moisture",
                "elevation",
                "drainage_density",
                "land_use_index",
            ],
            HazardKind::Cyclone => &[
                "wind_speed",
                "pressure",
                "sea_surface_temp",
                "rainfall",
                "distance_to_coast",
                "system_movement_speed",
                "humidity",
                "ocean_heat_content",
                "month",
                "elevation",
            ],
            HazardKind::Heatwave => &[
                "max_temperature",
                "heat_index",
                "humidity",
                "consecutive_hot_days",
                "wind_speed",
                "soil_moisture",
                "month",
                "cloud_cover",
                "urban_heat_island_idx",
                "temp_anomaly",
            ],
        }
    }
}

impl std::fmt::Display for HazardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HazardKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "flood" => Ok(HazardKind::Flood),
            "cyclone" => Ok(HazardKind::Cyclone),
            "heatwave" => Ok(HazardKind::Heatwave),
            _ => Err(anyhow::anyhow!(
                "Unknown hazard '{value}'. Supported hazards: flood, cyclone, heatwave."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_kind_as_str_roundtrip() {
        for kind in HazardKind::all() {
            let s = kind.as_str();
            let parsed = HazardKind::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn unknown_hazard_error() {
        let err = HazardKind::try_from("earthquake").unwrap_err();
        assert!(err.to_string().contains("Unknown hazard"));
    }

    #[test]
    fn every_hazard_has_ten_ordered_features() {
        for kind in HazardKind::all() {
            assert_eq!(kind.feature_order().len(), 10, "{kind} column list");
        }
    }

    #[test]
    fn flood_column_order_matches_training() {
        assert_eq!(HazardKind::Flood.feature_order(), &[
            "rainfall",
            "river_level",
            "humidity",
            "month",
            "wind_speed",
            "temperature",
            "soil_moisture",
            "elevation",
            "drainage_density",
            "land_use_index",
        ]);
    }

    #[test]
    fn cyclone_column_order_matches_training() {
        assert_eq!(HazardKind::Cyclone.feature_order(), &[
            "wind_speed",
            "pressure",
            "sea_surface_temp",
            "rainfall",
            "distance_to_coast",
            "system_movement_speed",
            "humidity",
            "ocean_heat_content",
            "month",
            "elevation",
        ]);
    }

    #[test]
    fn heatwave_column_order_matches_training() {
        assert_eq!(HazardKind::Heatwave.feature_order(), &[
            "max_temperature",
            "heat_index",
            "humidity",
            "consecutive_hot_days",
            "wind_speed",
            "soil_moisture",
            "month",
            "cloud_cover",
            "urban_heat_island_idx",
            "temp_anomaly",
        ]);
    }
}

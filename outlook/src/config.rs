//! Settings for parsing, with the defaults that bulletins need.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;

/// Settings for turning a single polyline into regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// How far to extend each end of an open polyline, as a fraction of its end segment.
    pub extension_fraction: f64,
    /// How far to the right of the polyline the test line runs, in degrees.
    pub test_offset: f64,
    /// How far a region may stick out of the outline, in degrees.
    pub erosion_tolerance: f64,
    /// Points closer than this are merged when overlaying a polyline on the outline.
    /// Defaults to a tolerance based on the magnitude of the coordinates.
    pub snap_epsilon: Option<f64>,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        ConstructionConfig {
            extension_fraction: 0.03,
            test_offset: 0.05,
            erosion_tolerance: 0.01,
            snap_epsilon: None,
        }
    }
}

/// Settings for resolving overlapping regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Regions whose intersection has at most this area (in square degrees) don't overlap.
    pub overlap_tolerance: f64,
    /// How many merge steps the resolver may take before giving up on a level.
    pub max_resolve_iterations: usize,
    /// The most vertices of a polyline to look at when measuring how close two polylines are.
    pub tag_sample_limit: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            overlap_tolerance: 1e-6,
            max_resolve_iterations: 1000,
            tag_sample_limit: 200,
        }
    }
}

/// Everything that can be tuned about parsing a bulletin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Settings for building regions from polylines.
    pub construction: ConstructionConfig,
    /// Settings for resolving overlaps.
    pub resolve: ResolveConfig,
    /// Per-product (upper-case name) tables mapping a raw level token to the level it stands for.
    pub overrides: HashMap<String, HashMap<String, RiskLevel>>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        // The 7 April 2006 20Z tornado outlook encodes its 45% contour as TSTM.
        // unwrap: 0.45 is a probability.
        let tornado = HashMap::from([("TSTM".to_owned(), RiskLevel::probability(0.45).unwrap())]);
        ParseConfig {
            construction: ConstructionConfig::default(),
            resolve: ResolveConfig::default(),
            overrides: HashMap::from([("TORNADO".to_owned(), tornado)]),
        }
    }
}

impl ParseConfig {
    /// Parses settings from JSON. Missing fields take their default values.
    pub fn from_json(s: &str) -> Result<ParseConfig, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// The level overrides for a product, which are empty for most products.
    pub fn overrides_for(&self, product: &str) -> HashMap<String, RiskLevel> {
        self.overrides
            .get(&product.to_ascii_uppercase())
            .cloned()
            .unwrap_or_default()
    }
}

//! Neurons - static catalog entries and their per-token firing records

use crate::features::Feature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog entry owned by a layer (immutable configuration)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neuron {
    pub neuron_id: String,
    pub label: String,
    pub role: String,
    /// Feature id → affinity (>= 0)
    pub feature_affinities: BTreeMap<String, f32>,
}

impl Neuron {
    pub fn new(
        neuron_id: impl Into<String>,
        label: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            neuron_id: neuron_id.into(),
            label: label.into(),
            role: role.into(),
            feature_affinities: BTreeMap::new(),
        }
    }

    /// Builder: add (or replace) the affinity for one feature
    pub fn affinity(mut self, feature_id: impl Into<String>, weight: f32) -> Self {
        self.feature_affinities.insert(feature_id.into(), weight);
        self
    }

    /// Per-feature contributions to this neuron, in token feature order.
    ///
    /// Features with no affinity, or a zero product, are skipped.
    pub(crate) fn contributions(&self, features: &[Feature]) -> Vec<DominantFeature> {
        features
            .iter()
            .filter_map(|feature| {
                let affinity = self.feature_affinities.get(&feature.id)?;
                let weight = feature.weight * affinity;
                (weight > 0.0).then(|| DominantFeature {
                    id: feature.id.clone(),
                    weight,
                })
            })
            .collect()
    }

    /// Raw overlap score against a token's features
    pub fn score(&self, features: &[Feature]) -> f32 {
        self.contributions(features).iter().map(|c| c.weight).sum()
    }

    /// True if no feature can ever make this neuron fire
    pub(crate) fn is_silent(&self) -> bool {
        self.feature_affinities.values().all(|&a| a <= 0.0)
    }
}

/// One feature's contribution to a fired neuron
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DominantFeature {
    pub id: String,
    /// `feature.weight × affinity`
    pub weight: f32,
}

/// A neuron that fired for one token in one layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedNeuron {
    pub neuron_id: String,
    pub label: String,
    pub role: String,
    /// Display score in (0, 1], relative to the layer's best neuron
    pub activation: f32,
    /// Raw overlap score used for selection (always > 0)
    pub score: f32,
    /// Strongest contributing features, descending
    pub dominant_features: Vec<DominantFeature>,
}

//! Energy Aggregator - whole-trace firing statistics
//!
//! The energy budget is a proxy for compute saved by sparsity: every
//! (token, layer) pair could have fired its whole catalog, only the
//! selected neurons actually did.

use crate::engine::TokenActivation;
use crate::features::FeatureVocabulary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate firing statistics over a trace
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBudget {
    pub neurons_fired: usize,
    pub total_neurons: usize,
    /// `1 - fired / total`; 1.0 when nothing could fire
    pub sparsity_ratio: f32,
    /// Mean fired neurons per (token, layer) pair
    pub average_top_k: f32,
}

impl EnergyBudget {
    /// Budget of an empty trace
    pub fn idle() -> Self {
        Self {
            sparsity_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Fraction of possible firings that happened (0 when nothing could fire)
    pub fn fired_fraction(&self) -> f32 {
        if self.total_neurons == 0 {
            return 0.0;
        }
        self.neurons_fired as f32 / self.total_neurons as f32
    }
}

/// One entry of the ranked global feature profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureStat {
    pub id: String,
    pub label: String,
    pub value: f32,
}

/// Collapse per-token activations into an energy budget and feature profile.
///
/// The profile sums `dominant_features[*].weight` over every fired neuron,
/// sorted descending (ties by id) and truncated to `top_n`.
pub fn aggregate(
    token_activations: &[TokenActivation],
    vocabulary: &FeatureVocabulary,
    top_n: usize,
) -> (EnergyBudget, Vec<FeatureStat>) {
    let mut fired = 0usize;
    let mut total = 0usize;
    let mut pairs = 0usize;
    let mut flux: HashMap<&str, f32> = HashMap::new();

    for token_activation in token_activations {
        for layer in &token_activation.layers {
            pairs += 1;
            fired += layer.fired();
            total += layer.catalog_size;

            for neuron in &layer.activated {
                for dominant in &neuron.dominant_features {
                    let value = flux.entry(dominant.id.as_str()).or_insert(0.0);
                    // Saturating sum
                    *value = (*value + dominant.weight).min(f32::MAX);
                }
            }
        }
    }

    let mut energy = EnergyBudget {
        neurons_fired: fired,
        total_neurons: total,
        sparsity_ratio: 1.0,
        average_top_k: 0.0,
    };
    energy.sparsity_ratio = 1.0 - energy.fired_fraction();
    if pairs > 0 {
        energy.average_top_k = fired as f32 / pairs as f32;
    }

    let mut profile: Vec<FeatureStat> = flux
        .into_iter()
        .map(|(id, value)| FeatureStat {
            id: id.to_string(),
            label: vocabulary.label(id).unwrap_or(id).to_string(),
            value,
        })
        .collect();
    profile.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.id.cmp(&b.id)));
    profile.truncate(top_n);

    (energy, profile)
}

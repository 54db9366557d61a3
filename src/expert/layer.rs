//! Expert Layer - top-k sparse routing over a fixed neuron catalog

use super::{ActivatedNeuron, Neuron};
use crate::error::{Result, RoutingError};
use crate::features::{check_weight, Feature, FeatureVocabulary};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fraction of a catalog that did not fire
///
/// Defined as 1.0 for an empty catalog.
pub fn layer_sparsity(fired: usize, catalog_size: usize) -> f32 {
    if catalog_size == 0 {
        return 1.0;
    }
    1.0 - (fired as f32 / catalog_size as f32)
}

/// One named layer of the stack
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertLayer {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Maximum neurons fired per token (>= 1)
    pub top_k: usize,
    pub neurons: Vec<Neuron>,
}

impl ExpertLayer {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            top_k,
            neurons: Vec::new(),
        }
    }

    /// Builder: append a neuron to the catalog
    pub fn neuron(mut self, neuron: Neuron) -> Self {
        self.neurons.push(neuron);
        self
    }

    pub fn catalog_size(&self) -> usize {
        self.neurons.len()
    }

    /// Check top_k, catalog, ids and affinities against `vocabulary`
    pub(crate) fn validate(&self, vocabulary: &FeatureVocabulary) -> Result<()> {
        if self.top_k == 0 {
            return Err(RoutingError::InvalidTopK {
                layer: self.id.clone(),
            });
        }
        if self.neurons.is_empty() {
            return Err(RoutingError::EmptyCatalog {
                layer: self.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for neuron in &self.neurons {
            if !seen.insert(neuron.neuron_id.as_str()) {
                return Err(RoutingError::DuplicateNeuron {
                    layer: self.id.clone(),
                    neuron: neuron.neuron_id.clone(),
                });
            }
            for (feature, &affinity) in &neuron.feature_affinities {
                if !vocabulary.contains(feature) {
                    return Err(RoutingError::UnknownFeature {
                        neuron: neuron.neuron_id.clone(),
                        feature: feature.clone(),
                    });
                }
                check_weight(&format!("neuron '{}'", neuron.neuron_id), affinity)?;
            }
            // Worst case: every listened feature at its peak on the same token
            let peak_score: f32 = neuron
                .feature_affinities
                .iter()
                .filter_map(|(feature, &affinity)| {
                    vocabulary.get(feature).map(|def| def.peak_weight() * affinity)
                })
                .sum();
            check_weight(
                &format!("peak score of neuron '{}'", neuron.neuron_id),
                peak_score,
            )?;
            if neuron.is_silent() {
                log::warn!(
                    "Neuron '{}' in layer '{}' has no positive affinity and will never fire",
                    neuron.neuron_id,
                    self.id
                );
            }
        }

        if self.top_k > self.neurons.len() {
            log::debug!(
                "Layer '{}' top_k {} exceeds catalog size {}; firing is capped by the catalog",
                self.id,
                self.top_k,
                self.neurons.len()
            );
        }

        Ok(())
    }

    /// Route one token's features through this layer.
    ///
    /// `dominant_cap` bounds the number of dominant features per fired neuron.
    pub fn route(&self, features: &[Feature], dominant_cap: usize) -> LayerActivation {
        // (catalog index, raw score, contributions)
        let mut candidates: Vec<_> = self
            .neurons
            .iter()
            .enumerate()
            .filter_map(|(idx, neuron)| {
                let contributions = neuron.contributions(features);
                let score: f32 = contributions.iter().map(|c| c.weight).sum();
                (score > 0.0).then_some((idx, score, contributions))
            })
            .collect();

        // Stable sort: equal scores keep catalog order
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(self.top_k);

        let peak = candidates.first().map(|c| c.1).unwrap_or(0.0);

        let activated: Vec<ActivatedNeuron> = candidates
            .into_iter()
            .map(|(idx, score, mut contributions)| {
                let neuron = &self.neurons[idx];
                contributions.sort_by(|a, b| b.weight.total_cmp(&a.weight));
                contributions.truncate(dominant_cap);
                ActivatedNeuron {
                    neuron_id: neuron.neuron_id.clone(),
                    label: neuron.label.clone(),
                    role: neuron.role.clone(),
                    activation: (score / peak).clamp(0.0, 1.0),
                    score,
                    dominant_features: contributions,
                }
            })
            .collect();

        log::trace!(
            "layer {}: fired {}/{} (top_k {})",
            self.id,
            activated.len(),
            self.neurons.len(),
            self.top_k
        );

        LayerActivation::from_layer(self, activated)
    }
}

/// Result of routing one token through one layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerActivation {
    pub layer_id: String,
    pub layer_label: String,
    pub description: String,
    /// Neurons in the layer's catalog
    pub catalog_size: usize,
    /// `1 - activated.len() / catalog_size`
    pub sparsity: f32,
    pub activated: Vec<ActivatedNeuron>,
}

impl LayerActivation {
    /// Build from a layer; sparsity is always derived, never passed in
    pub(crate) fn from_layer(layer: &ExpertLayer, activated: Vec<ActivatedNeuron>) -> Self {
        Self {
            layer_id: layer.id.clone(),
            layer_label: layer.label.clone(),
            description: layer.description.clone(),
            catalog_size: layer.catalog_size(),
            sparsity: layer_sparsity(activated.len(), layer.catalog_size()),
            activated,
        }
    }

    pub fn fired(&self) -> usize {
        self.activated.len()
    }
}

//! Error types for sparsetrace
//!
//! Inference itself never fails. Errors only come from building a custom
//! model or exporting a trace.

use thiserror::Error;

/// Sparsetrace error type
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Layer configured with top_k == 0
    #[error("Layer '{layer}' has top_k = 0 (must be >= 1)")]
    InvalidTopK { layer: String },

    /// Layer without any neurons
    #[error("Layer '{layer}' has an empty neuron catalog")]
    EmptyCatalog { layer: String },

    /// Two layers share an id
    #[error("Duplicate layer id: {0}")]
    DuplicateLayer(String),

    /// Two neurons in one layer share an id
    #[error("Duplicate neuron '{neuron}' in layer '{layer}'")]
    DuplicateNeuron { layer: String, neuron: String },

    /// Two vocabulary entries share an id
    #[error("Duplicate feature id: {0}")]
    DuplicateFeature(String),

    /// Affinity references a feature missing from the vocabulary
    #[error("Neuron '{neuron}' references unknown feature '{feature}'")]
    UnknownFeature { neuron: String, feature: String },

    /// Negative or non-finite weight, strength or affinity
    #[error("Invalid weight {value} on {owner}")]
    InvalidWeight { owner: String, value: f32 },

    /// Term, stem or phrase with no text
    #[error("Feature '{feature}' has an empty trigger")]
    EmptyTrigger { feature: String },

    /// Engine config out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// JSON export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RoutingError>;

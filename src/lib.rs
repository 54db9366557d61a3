//! # Sparsetrace - Sparse Activation Routing
//!
//! A deterministic, explainable simulation of a sparse mixture-of-experts
//! forward pass. Free text goes in, a structured activation [`Trace`] comes
//! out, ready to be rendered verbatim by a UI.
//!
//! ## Pipeline
//!
//! 1. **Tokenizer**: whitespace/punctuation split into indexed [`Token`]s
//! 2. **Feature Extractor**: lexical triggers → weighted semantic [`Feature`]s
//! 3. **Expert Layer Stack**: per token, per layer, top-k neuron selection
//! 4. **Energy Aggregator**: [`EnergyBudget`] + ranked global feature profile
//! 5. **Narrative Summarizer**: one sentence describing the dominant routing
//!
//! ## Design Principles
//!
//! - **No learning**: rule-driven routing over a compiled-in catalog
//! - **Deterministic**: same prompt, identical trace (catalog-order tie-breaks)
//! - **Immutable model**: [`RoutingModel`] is built once and shared by reference
//! - **Never fails**: every prompt, empty included, yields a renderable trace
//!
//! ## Example
//!
//! ```
//! use sparsetrace::{infer, format_percent};
//!
//! let trace = infer("How does a mixture of experts route tokens?");
//! assert_eq!(trace.tokens.len(), trace.token_activations.len());
//! assert!(trace.energy.sparsity_ratio > 0.5);
//!
//! let empty = infer("");
//! assert!(empty.token_activations.is_empty());
//! assert_eq!(format_percent(empty.energy.sparsity_ratio), "100%");
//! ```

// Tokenizer
mod token;
pub use token::{tokenize, Token};

// Feature vocabulary and extraction
pub mod features;
pub use features::{Feature, FeatureDef, FeatureVocabulary, Trigger, TriggerPattern};

// Neuron catalogs and top-k routing
pub mod expert;
pub use expert::{
    layer_sparsity, ActivatedNeuron, DominantFeature, ExpertLayer, LayerActivation, Neuron,
};

// Compiled-in vocabulary and layer stack
pub mod catalog;

// Whole-trace statistics
pub mod energy;
pub use energy::{aggregate, EnergyBudget, FeatureStat};

// Narrative sentence
pub mod narrative;
pub use narrative::{summarize, NO_SIGNAL_SUMMARY};

// Model, config and the inference entry point
pub mod engine;
pub use engine::{infer, EngineConfig, RoutingModel, TokenActivation, Trace};

// Presentation helpers
pub mod report;
pub use report::format_percent;

// Error types
mod error;
pub use error::{Result, RoutingError};

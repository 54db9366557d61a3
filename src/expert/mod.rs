//! # Expert Layer Stack
//!
//! Each [`ExpertLayer`] owns a fixed catalog of [`Neuron`]s and a `top_k`.
//! For every token the layer scores its neurons against the token's
//! features and fires at most `top_k` of them.
//!
//! ## Routing rules
//!
//! 1. **Overlap score**: `Σ feature.weight × affinity` over shared feature ids
//! 2. **Stable ranking**: score descending, ties keep catalog order
//! 3. **Positive only**: a zero score never fires, even with free top-k slots
//! 4. **Peak-relative display**: `activation = score / best score` in the layer
//!
//! Layers do not compound. Every layer sees the same token features, never
//! the neurons a previous layer fired.

// Catalog entries and per-call results
mod neuron;
pub use neuron::{ActivatedNeuron, DominantFeature, Neuron};

// Layer definition and top-k routing
mod layer;
pub use layer::{layer_sparsity, ExpertLayer, LayerActivation};

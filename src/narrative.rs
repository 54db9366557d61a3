//! Narrative Summarizer - one deterministic sentence per trace

use crate::energy::{EnergyBudget, FeatureStat};
use crate::report::format_percent;

/// Sentence used when nothing meaningful fired
pub const NO_SIGNAL_SUMMARY: &str =
    "No strong routing signal detected: every expert stayed idle for this prompt.";

/// Qualitative band for an overall sparsity ratio
pub fn sparsity_band(ratio: f32) -> &'static str {
    if ratio >= 0.9 {
        "highly sparse"
    } else if ratio >= 0.7 {
        "sparse"
    } else if ratio >= 0.4 {
        "moderately dense"
    } else {
        "dense"
    }
}

/// Describe the dominant routing behaviour of a trace.
pub fn summarize(energy: &EnergyBudget, profile: &[FeatureStat]) -> String {
    if energy.total_neurons == 0 {
        return NO_SIGNAL_SUMMARY.to_string();
    }

    let lead = match profile {
        [] => return NO_SIGNAL_SUMMARY.to_string(),
        [only] => only.label.clone(),
        [first, second, ..] => format!("{} with support from {}", first.label, second.label),
    };

    format!(
        "Routing was dominated by {}; the pass stayed {} at {} sparsity, firing {} of {} neurons ({:.1} per layer on average).",
        lead,
        sparsity_band(energy.sparsity_ratio),
        format_percent(energy.sparsity_ratio),
        energy.neurons_fired,
        energy.total_neurons,
        energy.average_top_k,
    )
}

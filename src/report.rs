//! Text Report - human-readable rendering of traces and catalogs
//!
//! The engine only returns raw ratios; this module owns the presentation
//! rules (percentages with one decimal, trailing `.0` trimmed).

use crate::engine::{RoutingModel, Trace};
use std::fmt::Write;

/// Format a ratio in [0, 1] as a percentage: `0.875 → "87.5%"`, `0.9 → "90%"`
pub fn format_percent(ratio: f32) -> String {
    let tenths = (ratio * 1000.0).round() / 10.0;
    let text = format!("{:.1}", tenths);
    let trimmed = text.strip_suffix(".0").unwrap_or(&text);
    format!("{}%", trimmed)
}

/// Render a trace as a multi-line report
pub fn render(trace: &Trace) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_trace(&mut out, trace);
    out
}

fn write_trace(out: &mut String, trace: &Trace) -> std::fmt::Result {
    writeln!(out, "Tokens: {}", trace.tokens.len())?;

    if trace.is_empty() {
        writeln!(out, "  (empty prompt, nothing to route)")?;
    }

    for token_activation in &trace.token_activations {
        let token = &token_activation.token;
        writeln!(out)?;
        writeln!(out, "[{}] \"{}\"", token.index, token.value)?;

        if token_activation.layers.iter().all(|l| l.activated.is_empty()) {
            writeln!(out, "    no features detected, every layer idle")?;
            continue;
        }

        for layer in &token_activation.layers {
            writeln!(
                out,
                "  {:<22} fired {}/{}  ({} sparse)",
                layer.layer_label,
                layer.fired(),
                layer.catalog_size,
                format_percent(layer.sparsity)
            )?;
            for neuron in &layer.activated {
                let dominant: Vec<String> = neuron
                    .dominant_features
                    .iter()
                    .map(|d| format!("{} {:.2}", d.id, d.weight))
                    .collect();
                writeln!(
                    out,
                    "      {:<8} {:<18} [{}] {:>6}  <- {}",
                    neuron.neuron_id,
                    neuron.label,
                    neuron.role,
                    format_percent(neuron.activation),
                    dominant.join(", ")
                )?;
            }
        }
    }

    let energy = &trace.energy;
    writeln!(out)?;
    writeln!(
        out,
        "Energy: {}/{} neurons fired, {} sparsity, {:.2} average top-k",
        energy.neurons_fired,
        energy.total_neurons,
        format_percent(energy.sparsity_ratio),
        energy.average_top_k
    )?;

    if !trace.global_feature_profile.is_empty() {
        writeln!(out, "Feature profile:")?;
        for (rank, stat) in trace.global_feature_profile.iter().enumerate() {
            writeln!(out, "  {}. {:<22} {:.2}", rank + 1, stat.label, stat.value)?;
        }
    }

    writeln!(out, "Summary: {}", trace.narrative_summary)
}

/// Render the model's layer stack and vocabulary
pub fn render_catalog(model: &RoutingModel) -> String {
    let mut out = String::new();
    let _ = write_catalog(&mut out, model);
    out
}

fn write_catalog(out: &mut String, model: &RoutingModel) -> std::fmt::Result {
    writeln!(out, "Features ({}):", model.vocabulary().len())?;
    for def in model.vocabulary().iter() {
        writeln!(
            out,
            "  {:<10} {:<22} base {:.2}, {} triggers",
            def.id,
            def.label,
            def.base_weight,
            def.triggers.len()
        )?;
    }

    for layer in model.layers() {
        writeln!(out)?;
        writeln!(
            out,
            "{} ({}) top_k {} of {}",
            layer.label,
            layer.id,
            layer.top_k,
            layer.catalog_size()
        )?;
        writeln!(out, "  {}", layer.description)?;
        for neuron in &layer.neurons {
            let affinities: Vec<String> = neuron
                .feature_affinities
                .iter()
                .map(|(id, w)| format!("{} {:.1}", id, w))
                .collect();
            writeln!(
                out,
                "    {:<8} {:<18} [{}] {}",
                neuron.neuron_id,
                neuron.label,
                neuron.role,
                affinities.join(", ")
            )?;
        }
    }
    Ok(())
}

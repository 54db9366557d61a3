//! Routing Engine - prompt in, activation trace out
//!
//! [`RoutingModel`] bundles the feature vocabulary, the layer stack and the
//! [`EngineConfig`]. It is immutable once built, so one instance can serve
//! any number of concurrent [`RoutingModel::infer`] calls through `&self`.
//!
//! # Pipeline
//!
//! ```text
//! prompt → tokenize → extract_features → route (per layer) → aggregate → summarize
//! ```

use crate::catalog::{builtin_features, builtin_layers};
use crate::energy::{aggregate, EnergyBudget, FeatureStat};
use crate::error::{Result, RoutingError};
use crate::expert::{ExpertLayer, LayerActivation};
use crate::features::{Feature, FeatureVocabulary};
use crate::narrative::summarize;
use crate::token::{tokenize, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Max dominant features recorded per fired neuron
    pub dominant_feature_cap: usize,
    /// Entries kept in the global feature profile
    pub profile_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dominant_feature_cap: 3,
            profile_top_n: 5,
        }
    }
}

impl EngineConfig {
    /// Smallest traces (single dominant feature, top 3 profile)
    pub fn compact() -> Self {
        Self {
            dominant_feature_cap: 1,
            profile_top_n: 3,
        }
    }

    /// Everything the stack can explain
    pub fn verbose() -> Self {
        Self {
            dominant_feature_cap: 5,
            profile_top_n: 10,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dominant_feature_cap == 0 {
            return Err(RoutingError::InvalidConfig(
                "dominant_feature_cap must be >= 1".to_string(),
            ));
        }
        if self.profile_top_n == 0 {
            return Err(RoutingError::InvalidConfig(
                "profile_top_n must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One token and its result in every layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenActivation {
    pub token: Token,
    /// Same order as the model's layer stack
    pub layers: Vec<LayerActivation>,
}

/// Full output of one inference call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub tokens: Vec<Token>,
    pub token_activations: Vec<TokenActivation>,
    pub energy: EnergyBudget,
    pub global_feature_profile: Vec<FeatureStat>,
    pub narrative_summary: String,
}

impl Trace {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stream the JSON trace into `writer`
    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Write the JSON trace to a file (created or truncated)
    pub fn save_json(&self, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_json(&mut writer, pretty)?;
        writer.flush()?;
        Ok(())
    }
}

/// Immutable routing model: vocabulary + layer stack + config
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoutingModel {
    vocabulary: FeatureVocabulary,
    layers: Vec<ExpertLayer>,
    config: EngineConfig,
}

/// Lazily built model behind the crate-level [`infer`]
static SHARED: OnceLock<RoutingModel> = OnceLock::new();

impl RoutingModel {
    /// Build a custom model, validating every layer against the vocabulary
    pub fn new(
        vocabulary: FeatureVocabulary,
        layers: Vec<ExpertLayer>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut seen = HashSet::new();
        for layer in &layers {
            if !seen.insert(layer.id.as_str()) {
                return Err(RoutingError::DuplicateLayer(layer.id.clone()));
            }
            layer.validate(&vocabulary)?;
        }

        for def in vocabulary.iter() {
            let heard = layers
                .iter()
                .flat_map(|layer| &layer.neurons)
                .any(|neuron| neuron.feature_affinities.contains_key(&def.id));
            if !heard {
                log::warn!("Feature '{}' is not wired to any neuron", def.id);
            }
        }

        if layers.is_empty() {
            log::warn!("Routing model has no layers; every trace will be empty of firings");
        }

        Ok(Self {
            vocabulary,
            layers,
            config,
        })
    }

    /// The compiled-in model (see [`crate::catalog`])
    pub fn builtin() -> Self {
        Self {
            vocabulary: FeatureVocabulary::from_trusted(builtin_features()),
            layers: builtin_layers(),
            config: EngineConfig::default(),
        }
    }

    /// The compiled-in catalog with a different config
    pub fn builtin_with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::builtin()
        })
    }

    /// Process-wide built-in model, built on first use
    pub fn shared() -> &'static RoutingModel {
        SHARED.get_or_init(Self::builtin)
    }

    pub fn vocabulary(&self) -> &FeatureVocabulary {
        &self.vocabulary
    }

    pub fn layers(&self) -> &[ExpertLayer] {
        &self.layers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Neurons a single token could fire across the whole stack
    pub fn neurons_per_token(&self) -> usize {
        self.layers.iter().map(ExpertLayer::catalog_size).sum()
    }

    pub fn extract_features(&self, token: &Token, context: &[Token]) -> Vec<Feature> {
        self.vocabulary.extract_features(token, context)
    }

    /// Route one token through every layer.
    ///
    /// Layers are independent: each sees the token's features unchanged.
    pub fn route_token(&self, token: &Token, context: &[Token]) -> TokenActivation {
        let features = self.extract_features(token, context);
        let layers = self
            .layers
            .iter()
            .map(|layer| layer.route(&features, self.config.dominant_feature_cap))
            .collect();

        TokenActivation {
            token: token.clone(),
            layers,
        }
    }

    /// Energy budget and ranked feature profile for a set of activations
    pub fn aggregate(&self, token_activations: &[TokenActivation]) -> (EnergyBudget, Vec<FeatureStat>) {
        aggregate(token_activations, &self.vocabulary, self.config.profile_top_n)
    }

    /// Run the whole pipeline on `prompt`.
    pub fn infer(&self, prompt: &str) -> Trace {
        let tokens = tokenize(prompt);

        let token_activations: Vec<TokenActivation> = tokens
            .iter()
            .map(|token| self.route_token(token, &tokens))
            .collect();

        let (energy, global_feature_profile) = self.aggregate(&token_activations);
        let narrative_summary = summarize(&energy, &global_feature_profile);

        log::debug!(
            "infer: {} tokens, {}/{} neurons fired, sparsity {:.3}",
            tokens.len(),
            energy.neurons_fired,
            energy.total_neurons,
            energy.sparsity_ratio
        );

        Trace {
            tokens,
            token_activations,
            energy,
            global_feature_profile,
            narrative_summary,
        }
    }
}

impl Default for RoutingModel {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Run `prompt` through the shared built-in model
pub fn infer(prompt: &str) -> Trace {
    RoutingModel::shared().infer(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expert::Neuron;
    use crate::features::FeatureDef;
    use crate::narrative::NO_SIGNAL_SUMMARY;

    const PROMPTS: &[&str] = &[
        "",
        "matrix matrix",
        "How does a mixture of experts route tokens in a sparse transformer?",
        "I feel sad about the ancient history of this city.",
        "Write a poem about quantum gravity and love!",
        "if and only if the proof holds, then the theorem is true",
        "xyzzy plugh",
    ];

    fn layer_ids(activation: &LayerActivation) -> Vec<&str> {
        activation.activated.iter().map(|n| n.neuron_id.as_str()).collect()
    }

    #[test]
    fn test_builtin_passes_validation() {
        let builtin = RoutingModel::builtin();
        let validated = RoutingModel::new(
            FeatureVocabulary::new(builtin_features()).unwrap(),
            builtin_layers(),
            EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(builtin, validated);
        assert_eq!(builtin.neurons_per_token(), 30);
    }

    #[test]
    fn test_empty_prompt() {
        let trace = infer("");
        assert!(trace.is_empty());
        assert!(!infer("matrix").is_empty());
        assert!(trace.tokens.is_empty());
        assert!(trace.token_activations.is_empty());
        assert!(trace.global_feature_profile.is_empty());
        assert_eq!(trace.energy.sparsity_ratio, 1.0);
        assert_eq!(trace.energy.total_neurons, 0);
        assert_eq!(trace.energy.average_top_k, 0.0);
        assert_eq!(trace.narrative_summary, NO_SIGNAL_SUMMARY);

        let json = trace.to_json().unwrap();
        assert!(json.contains("\"tokenActivations\":[]"));
    }

    #[test]
    fn test_unknown_words_fire_nothing() {
        let trace = infer("xyzzy plugh");
        assert_eq!(trace.tokens.len(), 2);
        for token_activation in &trace.token_activations {
            assert_eq!(token_activation.layers.len(), 4);
            for layer in &token_activation.layers {
                assert!(layer.activated.is_empty());
                assert_eq!(layer.sparsity, 1.0);
            }
        }
        assert_eq!(trace.energy.neurons_fired, 0);
        assert_eq!(trace.energy.total_neurons, 60);
        assert_eq!(trace.energy.sparsity_ratio, 1.0);
        assert_eq!(trace.narrative_summary, NO_SIGNAL_SUMMARY);
    }

    #[test]
    fn test_repeated_token_routes_identically() {
        let trace = infer("matrix matrix");
        assert_eq!(trace.token_activations.len(), 2);
        assert_eq!(
            trace.token_activations[0].layers,
            trace.token_activations[1].layers
        );
        assert!(trace.token_activations[0].layers[0].fired() > 0);
    }

    #[test]
    fn test_repeated_trigger_tops_profile() {
        let trace = infer("matrix matrix matrix matrix about a poem");
        assert_eq!(trace.global_feature_profile[0].id, "math");
        assert_eq!(trace.global_feature_profile[0].label, "Mathematics");
        assert!(trace.narrative_summary.contains("Mathematics"));
    }

    #[test]
    fn test_structural_invariants() {
        let model = RoutingModel::builtin();
        for prompt in PROMPTS {
            let trace = model.infer(prompt);

            assert_eq!(trace.token_activations.len(), trace.tokens.len());
            for (i, (token, activation)) in trace
                .tokens
                .iter()
                .zip(&trace.token_activations)
                .enumerate()
            {
                assert_eq!(token.index, i);
                assert_eq!(&activation.token, token);
                assert_eq!(activation.layers.len(), model.layers().len());

                for (layer, result) in model.layers().iter().zip(&activation.layers) {
                    assert_eq!(result.layer_id, layer.id);
                    assert!(result.fired() <= layer.top_k.min(layer.catalog_size()));
                    let expected = 1.0 - result.fired() as f32 / layer.catalog_size() as f32;
                    assert!((result.sparsity - expected).abs() < 1e-6);
                    for neuron in &result.activated {
                        assert!(neuron.score > 0.0);
                        assert!(neuron.activation > 0.0 && neuron.activation <= 1.0);
                        assert!(!neuron.dominant_features.is_empty());
                        assert!(neuron.dominant_features.len() <= 3);
                    }
                }
            }

            let energy = &trace.energy;
            assert!((0.0..=1.0).contains(&energy.sparsity_ratio));
            assert_eq!(
                energy.total_neurons,
                trace.tokens.len() * model.neurons_per_token()
            );
            let fired: usize = trace
                .token_activations
                .iter()
                .flat_map(|t| &t.layers)
                .map(LayerActivation::fired)
                .sum();
            assert_eq!(energy.neurons_fired, fired);

            assert!(trace.global_feature_profile.len() <= 5);
            for pair in trace.global_feature_profile.windows(2) {
                assert!(pair[0].value >= pair[1].value);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for prompt in PROMPTS {
            let first = infer(prompt);
            let second = RoutingModel::builtin().infer(prompt);
            assert_eq!(first, second);
            assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        }
    }

    #[test]
    fn test_reasoning_head_single_winner() {
        let trace = infer("explain the compiler bug");
        for token_activation in &trace.token_activations {
            let head = &token_activation.layers[3];
            assert_eq!(head.layer_id, "reasoning");
            assert!(head.fired() <= 1);
        }
        // "compiler": code feature → Implement head wins
        let compiler = &trace.token_activations[2];
        assert_eq!(layer_ids(&compiler.layers[3]), vec!["head-1"]);
    }

    #[test]
    fn test_phrase_reaches_every_word() {
        let trace = infer("mixture of experts");
        // "of" only carries the ml feature through the phrase
        let of = &trace.token_activations[1];
        assert_eq!(layer_ids(&of.layers[0]), vec!["lex-2"]);
    }

    #[test]
    fn test_parallel_calls_share_model() {
        let model = RoutingModel::builtin();
        let expected: Vec<Trace> = PROMPTS.iter().map(|p| model.infer(p)).collect();

        let model = &model;
        std::thread::scope(|scope| {
            let handles: Vec<_> = PROMPTS
                .iter()
                .map(|&prompt| scope.spawn(move || model.infer(prompt)))
                .collect();
            for (handle, want) in handles.into_iter().zip(&expected) {
                assert_eq!(&handle.join().unwrap(), want);
            }
        });
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(EngineConfig::default().dominant_feature_cap, 3);
        assert!(EngineConfig::compact().validate().is_ok());
        assert!(EngineConfig::verbose().validate().is_ok());

        let bad = EngineConfig {
            dominant_feature_cap: 0,
            profile_top_n: 5,
        };
        assert!(matches!(
            RoutingModel::builtin_with_config(bad),
            Err(RoutingError::InvalidConfig(_))
        ));

        let compact = RoutingModel::builtin_with_config(EngineConfig::compact()).unwrap();
        let trace = compact.infer("neural network training with matrix algebra and python code");
        assert!(trace.global_feature_profile.len() <= 3);
        for neuron in trace
            .token_activations
            .iter()
            .flat_map(|t| &t.layers)
            .flat_map(|l| &l.activated)
        {
            assert_eq!(neuron.dominant_features.len(), 1);
        }
    }

    #[test]
    fn test_custom_model() {
        let vocabulary = FeatureVocabulary::new(vec![
            FeatureDef::new("rust", "Rust", 1.0).term("borrow", 1.0),
        ])
        .unwrap();
        let layers = vec![ExpertLayer::new("only", "Only", "single layer", 1)
            .neuron(Neuron::new("checker", "Borrow checker", "expert").affinity("rust", 1.0))];
        let model = RoutingModel::new(vocabulary, layers, EngineConfig::default()).unwrap();

        let trace = model.infer("borrow borrow nope");
        assert_eq!(trace.energy.neurons_fired, 2);
        assert_eq!(trace.energy.total_neurons, 3);
        assert_eq!(trace.global_feature_profile[0].label, "Rust");
    }

    #[test]
    fn test_overflowing_weights_rejected() {
        let vocabulary =
            FeatureVocabulary::new(vec![FeatureDef::new("big", "Big", f32::MAX).term("huge", 1.0)])
                .unwrap();
        let layers = vec![ExpertLayer::new("only", "Only", "", 1)
            .neuron(Neuron::new("n", "N", "detector").affinity("big", 2.0))];
        let result = RoutingModel::new(vocabulary.clone(), layers, EngineConfig::default());
        assert!(matches!(result, Err(RoutingError::InvalidWeight { .. })));

        // Largest affinity that keeps the score finite still routes cleanly
        let layers = vec![ExpertLayer::new("only", "Only", "", 1)
            .neuron(Neuron::new("n", "N", "detector").affinity("big", 1.0))];
        let model = RoutingModel::new(vocabulary, layers, EngineConfig::default()).unwrap();
        let trace = model.infer("huge huge huge");
        for neuron in trace
            .token_activations
            .iter()
            .flat_map(|t| &t.layers)
            .flat_map(|l| &l.activated)
        {
            assert!(neuron.score.is_finite());
            assert_eq!(neuron.activation, 1.0);
        }
        assert!(trace.global_feature_profile[0].value.is_finite());

        let json = trace.to_json().unwrap();
        assert!(!json.contains("null"));
        let parsed: Trace = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tokens, trace.tokens);
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let vocabulary =
            FeatureVocabulary::new(vec![FeatureDef::new("a", "A", 1.0).term("a", 1.0)]).unwrap();
        let layer = ExpertLayer::new("dup", "Dup", "", 1)
            .neuron(Neuron::new("n", "N", "detector").affinity("a", 1.0));
        let result = RoutingModel::new(vocabulary, vec![layer.clone(), layer], EngineConfig::default());
        assert!(matches!(result, Err(RoutingError::DuplicateLayer(id)) if id == "dup"));
    }

    #[test]
    fn test_json_contract_field_names() {
        let trace = infer("sparse expert routing");
        let value: serde_json::Value = serde_json::from_str(&trace.to_json().unwrap()).unwrap();

        for key in ["tokens", "tokenActivations", "energy", "globalFeatureProfile", "narrativeSummary"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        for key in ["neuronsFired", "totalNeurons", "sparsityRatio", "averageTopK"] {
            assert!(value["energy"].get(key).is_some(), "missing energy.{}", key);
        }
        let layer = &value["tokenActivations"][0]["layers"][0];
        for key in ["layerId", "layerLabel", "description", "sparsity", "activated"] {
            assert!(layer.get(key).is_some(), "missing layer.{}", key);
        }
        let neuron = &layer["activated"][0];
        for key in ["neuronId", "label", "role", "activation", "dominantFeatures"] {
            assert!(neuron.get(key).is_some(), "missing neuron.{}", key);
        }

        let restored: Trace = serde_json::from_value(value).unwrap();
        assert_eq!(restored, trace);
    }

    #[test]
    fn test_save_json() {
        use tempfile::tempdir;

        let trace = infer("what is a tensor");
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.json");

        trace.save_json(&path, true).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let restored: Trace = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, trace);
    }

    #[test]
    fn test_save_json_missing_dir_fails() {
        let trace = infer("matrix");
        let dir = tempfile::tempdir().unwrap();
        let result = trace.save_json(dir.path().join("no/such/dir/trace.json"), false);
        assert!(matches!(result, Err(RoutingError::Io(_))));
    }
}

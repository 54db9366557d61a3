//! Built-in Catalog - the compiled-in vocabulary and layer stack
//!
//! ## Features
//!
//! | Id | Label | Base |
//! |----|-------|------|
//! | math | Mathematics | 1.0 |
//! | code | Software & code | 1.0 |
//! | ml | Machine learning | 1.1 |
//! | science | Natural science | 0.9 |
//! | language | Language & writing | 0.9 |
//! | emotion | Emotion & sentiment | 1.0 |
//! | inquiry | Inquiry | 0.7 |
//! | time | Time & history | 0.8 |
//! | space | Space & geography | 0.8 |
//! | logic | Logic & causality | 0.6 |
//!
//! ## Layers
//!
//! | Layer | top_k | Neurons |
//! |-------|-------|---------|
//! | lexical | 2 | 8 |
//! | compositional | 3 | 8 |
//! | semantic | 2 | 8 |
//! | reasoning | 1 | 6 |

use crate::expert::{ExpertLayer, Neuron};
use crate::features::FeatureDef;

/// Feature definitions of the built-in vocabulary
pub fn builtin_features() -> Vec<FeatureDef> {
    vec![
        FeatureDef::new("math", "Mathematics", 1.0)
            .terms(&[
                "matrix", "matrices", "vector", "equation", "integral", "derivative", "algebra",
                "geometry", "theorem", "sum", "prime", "tensor", "eigenvalue", "number",
            ])
            .stem("calcul", 0.8)
            .phrase("linear algebra", 1.5),
        FeatureDef::new("code", "Software & code", 1.0)
            .terms(&[
                "code", "function", "compiler", "rust", "python", "javascript", "bug", "debug",
                "algorithm", "api", "loop", "variable", "struct",
            ])
            .stem("program", 0.8)
            .phrase("stack trace", 1.4)
            .phrase("source code", 1.2),
        FeatureDef::new("ml", "Machine learning", 1.1)
            .terms(&[
                "neural", "training", "transformer", "attention", "embedding", "llm", "gpt",
                "inference", "gradient", "sparse", "router", "routing",
            ])
            .term("network", 0.6)
            .term("model", 0.7)
            .stem("expert", 0.9)
            .stem("token", 0.8)
            .phrase("neural network", 1.5)
            .phrase("mixture of experts", 1.8)
            .phrase("machine learning", 1.6),
        FeatureDef::new("science", "Natural science", 0.9)
            .terms(&[
                "quantum", "physics", "molecule", "chemistry", "biology", "cell", "gene", "genes",
                "dna", "evolution", "photon", "gravity",
            ])
            .term("energy", 0.6)
            .stem("atom", 1.0),
        FeatureDef::new("language", "Language & writing", 0.9).terms(&[
            "word", "words", "sentence", "grammar", "poem", "poetry", "story", "translate",
            "translation", "language", "write", "essay", "metaphor", "novel",
        ]),
        FeatureDef::new("emotion", "Emotion & sentiment", 1.0)
            .terms(&[
                "love", "happy", "sad", "fear", "angry", "joy", "hate", "anxious", "excited",
                "lonely", "grief",
            ])
            .stem("feel", 0.8),
        FeatureDef::new("inquiry", "Inquiry", 0.7)
            .terms(&[
                "what", "why", "how", "who", "when", "where", "which", "explain", "question",
                "describe",
            ])
            .phrase("what is", 1.0),
        FeatureDef::new("time", "Time & history", 0.8)
            .terms(&[
                "yesterday", "today", "tomorrow", "future", "past", "century", "ancient", "era",
                "decade",
            ])
            .stem("histor", 1.0),
        FeatureDef::new("space", "Space & geography", 0.8)
            .terms(&[
                "planet", "galaxy", "star", "orbit", "universe", "ocean", "mountain", "river",
                "city", "country", "map", "earth",
            ])
            .stem("astro", 0.9),
        FeatureDef::new("logic", "Logic & causality", 0.6)
            .terms(&[
                "if", "then", "because", "therefore", "implies", "proof", "prove", "not", "cause",
                "reason", "hence",
            ])
            .phrase("if and only if", 1.5),
    ]
}

/// Layer stack of the built-in model, in evaluation order
pub fn builtin_layers() -> Vec<ExpertLayer> {
    vec![lexical_layer(), compositional_layer(), semantic_layer(), reasoning_layer()]
}

fn lexical_layer() -> ExpertLayer {
    ExpertLayer::new(
        "lexical",
        "Lexical Router",
        "Surface detectors keyed to individual trigger words.",
        2,
    )
    .neuron(Neuron::new("lex-0", "Numeric lexeme", "detector").affinity("math", 1.0))
    .neuron(Neuron::new("lex-1", "Syntax lexeme", "detector").affinity("code", 1.0))
    .neuron(Neuron::new("lex-2", "Model jargon", "detector").affinity("ml", 1.0))
    .neuron(Neuron::new("lex-3", "Lab vocabulary", "detector").affinity("science", 1.0))
    .neuron(Neuron::new("lex-4", "Prose marker", "detector").affinity("language", 1.0))
    .neuron(Neuron::new("lex-5", "Affect cue", "detector").affinity("emotion", 1.0))
    .neuron(
        Neuron::new("lex-6", "Question word", "detector")
            .affinity("inquiry", 1.0)
            .affinity("logic", 0.3),
    )
    .neuron(
        Neuron::new("lex-7", "Place & era", "detector")
            .affinity("space", 0.8)
            .affinity("time", 0.8),
    )
}

fn compositional_layer() -> ExpertLayer {
    ExpertLayer::new(
        "compositional",
        "Compositional Mixer",
        "Blends co-occurring signals into mid-level concepts.",
        3,
    )
    .neuron(
        Neuron::new("mix-0", "Formal systems", "integrator")
            .affinity("math", 0.9)
            .affinity("logic", 0.7)
            .affinity("code", 0.4),
    )
    .neuron(
        Neuron::new("mix-1", "Computation", "integrator")
            .affinity("code", 0.9)
            .affinity("ml", 0.6)
            .affinity("math", 0.3),
    )
    .neuron(
        Neuron::new("mix-2", "Learning dynamics", "integrator")
            .affinity("ml", 1.0)
            .affinity("math", 0.4)
            .affinity("science", 0.3),
    )
    .neuron(
        Neuron::new("mix-3", "Physical world", "integrator")
            .affinity("science", 0.9)
            .affinity("space", 0.6)
            .affinity("time", 0.2),
    )
    .neuron(
        Neuron::new("mix-4", "Narrative voice", "integrator")
            .affinity("language", 0.9)
            .affinity("emotion", 0.5)
            .affinity("time", 0.3),
    )
    .neuron(
        Neuron::new("mix-5", "Sentiment blend", "integrator")
            .affinity("emotion", 1.0)
            .affinity("language", 0.3),
    )
    .neuron(
        Neuron::new("mix-6", "Causal chain", "integrator")
            .affinity("logic", 1.0)
            .affinity("inquiry", 0.4),
    )
    .neuron(
        Neuron::new("mix-7", "Chronicle", "integrator")
            .affinity("time", 1.0)
            .affinity("space", 0.4)
            .affinity("language", 0.2),
    )
}

fn semantic_layer() -> ExpertLayer {
    ExpertLayer::new(
        "semantic",
        "Semantic Experts",
        "Domain experts competing for ownership of the token.",
        2,
    )
    .neuron(
        Neuron::new("sem-0", "Mathematician", "expert")
            .affinity("math", 1.2)
            .affinity("logic", 0.5),
    )
    .neuron(
        Neuron::new("sem-1", "Engineer", "expert")
            .affinity("code", 1.2)
            .affinity("ml", 0.4),
    )
    .neuron(
        Neuron::new("sem-2", "ML researcher", "expert")
            .affinity("ml", 1.2)
            .affinity("math", 0.3)
            .affinity("code", 0.3),
    )
    .neuron(
        Neuron::new("sem-3", "Scientist", "expert")
            .affinity("science", 1.2)
            .affinity("math", 0.2),
    )
    .neuron(
        Neuron::new("sem-4", "Writer", "expert")
            .affinity("language", 1.1)
            .affinity("emotion", 0.4),
    )
    .neuron(Neuron::new("sem-5", "Counselor", "expert").affinity("emotion", 1.2))
    .neuron(
        Neuron::new("sem-6", "Historian", "expert")
            .affinity("time", 1.1)
            .affinity("space", 0.3),
    )
    .neuron(
        Neuron::new("sem-7", "Explorer", "expert")
            .affinity("space", 1.1)
            .affinity("science", 0.4),
    )
}

fn reasoning_layer() -> ExpertLayer {
    ExpertLayer::new(
        "reasoning",
        "Reasoning Head",
        "Single-winner head that decides how the answer is framed.",
        1,
    )
    .neuron(
        Neuron::new("head-0", "Derive", "router")
            .affinity("math", 0.8)
            .affinity("logic", 0.9)
            .affinity("science", 0.3),
    )
    .neuron(
        Neuron::new("head-1", "Implement", "router")
            .affinity("code", 0.9)
            .affinity("ml", 0.5),
    )
    .neuron(
        Neuron::new("head-2", "Explain", "router")
            .affinity("inquiry", 1.0)
            .affinity("ml", 0.4)
            .affinity("science", 0.4),
    )
    .neuron(
        Neuron::new("head-3", "Narrate", "router")
            .affinity("language", 0.8)
            .affinity("time", 0.6)
            .affinity("emotion", 0.3),
    )
    .neuron(Neuron::new("head-4", "Empathize", "router").affinity("emotion", 1.0))
    .neuron(
        Neuron::new("head-5", "Survey", "router")
            .affinity("space", 0.8)
            .affinity("time", 0.4),
    )
}

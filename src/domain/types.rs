//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - threaded through the pipeline stages as plain values
//! - exported to a JSON summary for quick human review
//! - asserted against in tests without touching the wire format

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Feature columns, in concatenation order.
///
/// Order is significant: the concat layer joins the named scalar inputs in
/// exactly this order, so reordering this list silently changes what each
/// weight in `fc1` means.
pub const FEATURE_NAMES: [&str; 7] = [
    "timestamp",
    "distance",
    "activity",
    "startTime",
    "duration",
    "hour",
    "dayOfWeek",
];

/// Target column in the training CSV.
pub const TARGET_COLUMN: &str = "vibe";

/// The full label enumeration the classifier must represent.
///
/// Deliberately fixed rather than derived from the dataset: a small sample can
/// easily miss rare classes (e.g. Sleep=0), and a model sized to the observed
/// subset could never learn them on-device later.
pub const CLASS_LABELS: [i64; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Hidden width of the single hidden layer.
pub const HIDDEN_WIDTH: usize = 64;

/// Output tensor of the concat layer / input tensor of `fc1`.
pub const FEATURES_VECTOR_NAME: &str = "features_vector";

/// Predicted label output. Also the loss target and the training-input name
/// for ground truth, so the three uses must stay in sync.
pub const PREDICTED_LABEL_NAME: &str = "classLabel";

/// Probability-distribution output produced by the softmax layer.
pub const PROBABILITY_OUTPUT_NAME: &str = "classProbability";

/// Dataset locations probed in priority order when `--csv` is not given.
pub const DEFAULT_CSV_CANDIDATES: [&str; 2] = [
    "vibe_weighted_dataset.csv",
    "DataCollector/Tools/vibe_weighted_dataset.csv",
];

/// Default output artifact path.
pub const DEFAULT_OUTPUT_FILE: &str = "VibeClassifier.mlmodel";

/// A named scalar model input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    /// Array shape of the input; always 1 for this model (scalar features).
    pub shape: u64,
}

impl FeatureSpec {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: 1,
        }
    }
}

/// The fixed feature list as `FeatureSpec`s, in concatenation order.
pub fn feature_specs() -> Vec<FeatureSpec> {
    FEATURE_NAMES.iter().copied().map(FeatureSpec::scalar).collect()
}

/// Supported activation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    Relu,
}

impl ActivationKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ActivationKind::Relu => "ReLU",
        }
    }
}

/// A fully connected layer with explicit weight storage.
///
/// Weights are row-major with shape `output_dim × input_dim`; bias has length
/// `output_dim`.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub name: String,
    pub input: String,
    pub output: String,
    pub input_dim: usize,
    pub output_dim: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
    /// Whether on-device training may refine this layer's weights.
    pub updatable: bool,
}

impl DenseLayer {
    /// Check declared widths against actual tensor sizes.
    ///
    /// A mismatch here must fail fast: silently truncating or padding would
    /// produce an artifact that loads but predicts garbage.
    pub fn check_dimensions(&self) -> Result<(), String> {
        let expected_weights = self.output_dim * self.input_dim;
        if self.weights.len() != expected_weights {
            return Err(format!(
                "Layer '{}': weight tensor has {} values, expected {} ({}x{}).",
                self.name,
                self.weights.len(),
                expected_weights,
                self.output_dim,
                self.input_dim,
            ));
        }
        if self.bias.len() != self.output_dim {
            return Err(format!(
                "Layer '{}': bias tensor has {} values, expected {}.",
                self.name,
                self.bias.len(),
                self.output_dim,
            ));
        }
        Ok(())
    }
}

/// One node of the inference graph.
#[derive(Debug, Clone)]
pub enum LayerNode {
    Concat {
        name: String,
        inputs: Vec<String>,
        output: String,
    },
    Dense(DenseLayer),
    Activation {
        name: String,
        kind: ActivationKind,
        input: String,
        output: String,
    },
    Softmax {
        name: String,
        input: String,
        output: String,
    },
}

impl LayerNode {
    pub fn name(&self) -> &str {
        match self {
            LayerNode::Concat { name, .. } => name,
            LayerNode::Dense(d) => &d.name,
            LayerNode::Activation { name, .. } => name,
            LayerNode::Softmax { name, .. } => name,
        }
    }

    pub fn inputs(&self) -> Vec<&str> {
        match self {
            LayerNode::Concat { inputs, .. } => inputs.iter().map(String::as_str).collect(),
            LayerNode::Dense(d) => vec![d.input.as_str()],
            LayerNode::Activation { input, .. } => vec![input.as_str()],
            LayerNode::Softmax { input, .. } => vec![input.as_str()],
        }
    }

    pub fn output(&self) -> &str {
        match self {
            LayerNode::Concat { output, .. } => output,
            LayerNode::Dense(d) => &d.output,
            LayerNode::Activation { output, .. } => output,
            LayerNode::Softmax { output, .. } => output,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LayerNode::Concat { .. } => "concat",
            LayerNode::Dense(_) => "innerProduct",
            LayerNode::Activation { .. } => "activation",
            LayerNode::Softmax { .. } => "softmax",
        }
    }
}

/// The assembled inference graph plus its classifier bindings.
#[derive(Debug, Clone)]
pub struct ModelGraph {
    /// Named scalar inputs, in concatenation order.
    pub features: Vec<FeatureSpec>,
    /// Fixed label enumeration bound to the classifier output.
    pub class_labels: Vec<i64>,
    /// Layer chain: concat -> dense -> activation -> dense -> softmax.
    pub layers: Vec<LayerNode>,
    /// Name of the derived argmax label output (not a constructed layer).
    pub predicted_label_name: String,
    /// Name of the softmax probability output.
    pub probability_output_name: String,
}

impl ModelGraph {
    /// Names of the dense layers, in graph order.
    pub fn dense_layer_names(&self) -> Vec<String> {
        self.layers
            .iter()
            .filter_map(|l| match l {
                LayerNode::Dense(d) => Some(d.name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Loss function kinds supported by the update interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LossKind {
    CategoricalCrossEntropy,
}

/// Loss-layer wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossSpec {
    pub name: String,
    pub kind: LossKind,
    /// Tensor the loss reads predictions from (the softmax output).
    pub input: String,
    /// Training input carrying ground truth.
    pub target: String,
}

/// Adam optimizer hyperparameters baked into the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdamSpec {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub batch_size: u64,
}

/// Fully populated on-device training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub updatable_layers: Vec<String>,
    pub loss: LossSpec,
    pub optimizer: AdamSpec,
    pub epochs: u64,
}

/// Artifact metadata strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub author: String,
    pub license: String,
    pub description: String,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Dataset locations probed in priority order; first existing path wins.
    pub csv_candidates: Vec<PathBuf>,
    /// Output artifact path.
    pub output: PathBuf,
    /// Optional weight-init seed. `None` means entropy-seeded (the default):
    /// repeated runs produce identical topology but different weights.
    pub seed: Option<u64>,
    pub metadata: ModelMetadata,
    /// Optional JSON summary export path.
    pub export_summary: Option<PathBuf>,
}

/// Resolved input schema for the run.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// Dataset path that actually exists (first match among candidates).
    pub csv_path: PathBuf,
    /// Fixed feature list, in concatenation order.
    pub features: Vec<FeatureSpec>,
    /// CSV column holding the target value.
    pub target_column: String,
    /// Model-side name of the label (loss target + training input).
    pub label_field: String,
    /// Fixed label enumeration; never derived from the data.
    pub class_labels: Vec<i64>,
    pub rows_read: usize,
    /// Rows whose target value did not parse as an integer.
    pub rows_skipped: usize,
    /// Sorted distinct target values actually observed (informational only).
    pub observed_labels: Vec<i64>,
}

//! Inference graph construction.
//!
//! The topology is fixed and deterministic:
//!
//! inputs -> concat("features_vector") -> fc1 -> relu1 -> fc2 -> softmax
//!
//! Only the weight values vary between runs: dense weights are drawn from
//! Normal(0, 0.1) using an entropy-seeded RNG unless an explicit seed is
//! supplied, so repeated runs are intentionally not bit-for-bit reproducible
//! by default.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    DenseLayer, FEATURES_VECTOR_NAME, HIDDEN_WIDTH, LayerNode, ModelGraph, PREDICTED_LABEL_NAME,
    PROBABILITY_OUTPUT_NAME, ResolvedSchema,
};
use crate::error::{AppError, ErrorKind};

/// Standard deviation of the zero-mean Gaussian used for weight init.
pub const WEIGHT_STDDEV: f64 = 0.1;

pub const CONCAT_LAYER_NAME: &str = "concat_inputs";
pub const FC1_LAYER_NAME: &str = "fc1";
pub const RELU_LAYER_NAME: &str = "relu1";
pub const FC2_LAYER_NAME: &str = "fc2";
pub const SOFTMAX_LAYER_NAME: &str = "softmax";

/// Build the inference graph for the resolved schema.
///
/// `seed` pins weight initialization for reproducible runs; `None` draws a
/// fresh entropy seed.
pub fn build_graph(schema: &ResolvedSchema, seed: Option<u64>) -> Result<ModelGraph, AppError> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let normal = Normal::new(0.0, WEIGHT_STDDEV)
        .map_err(|e| AppError::new(ErrorKind::Usage, format!("Weight distribution error: {e}")))?;

    let n_features = schema.features.len();
    let n_classes = schema.class_labels.len();

    let concat = LayerNode::Concat {
        name: CONCAT_LAYER_NAME.to_string(),
        // Feature-list order, not alphabetical: concatenation order defines
        // what each fc1 weight means.
        inputs: schema.features.iter().map(|f| f.name.clone()).collect(),
        output: FEATURES_VECTOR_NAME.to_string(),
    };

    let fc1 = init_dense(
        FC1_LAYER_NAME,
        FEATURES_VECTOR_NAME,
        "hidden1",
        n_features,
        HIDDEN_WIDTH,
        &normal,
        &mut rng,
    );

    let relu = LayerNode::Activation {
        name: RELU_LAYER_NAME.to_string(),
        kind: crate::domain::ActivationKind::Relu,
        input: "hidden1".to_string(),
        output: "relu1_out".to_string(),
    };

    let fc2 = init_dense(
        FC2_LAYER_NAME,
        "relu1_out",
        "logits",
        HIDDEN_WIDTH,
        n_classes,
        &normal,
        &mut rng,
    );

    let softmax = LayerNode::Softmax {
        name: SOFTMAX_LAYER_NAME.to_string(),
        input: "logits".to_string(),
        output: PROBABILITY_OUTPUT_NAME.to_string(),
    };

    let graph = ModelGraph {
        features: schema.features.clone(),
        class_labels: schema.class_labels.clone(),
        layers: vec![
            concat,
            LayerNode::Dense(fc1),
            relu,
            LayerNode::Dense(fc2),
            softmax,
        ],
        predicted_label_name: PREDICTED_LABEL_NAME.to_string(),
        probability_output_name: PROBABILITY_OUTPUT_NAME.to_string(),
    };

    validate_graph(&graph)?;
    Ok(graph)
}

fn init_dense(
    name: &str,
    input: &str,
    output: &str,
    input_dim: usize,
    output_dim: usize,
    normal: &Normal<f64>,
    rng: &mut StdRng,
) -> DenseLayer {
    let weights = (0..output_dim * input_dim)
        .map(|_| normal.sample(rng) as f32)
        .collect();
    DenseLayer {
        name: name.to_string(),
        input: input.to_string(),
        output: output.to_string(),
        input_dim,
        output_dim,
        weights,
        bias: vec![0.0; output_dim],
        updatable: false,
    }
}

/// Validate tensor dimensions and wiring before anything is lowered.
///
/// A mismatch between declared widths and actual tensor sizes is fatal; we
/// never silently truncate or pad.
pub fn validate_graph(graph: &ModelGraph) -> Result<(), AppError> {
    let mut prev_output: Option<&str> = None;
    let mut prev_width: Option<usize> = None;

    for layer in &graph.layers {
        match layer {
            LayerNode::Concat { name, inputs, .. } => {
                let feature_names: Vec<&str> =
                    graph.features.iter().map(|f| f.name.as_str()).collect();
                let concat_inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();
                if concat_inputs != feature_names {
                    return Err(AppError::new(
                        ErrorKind::SpecIntegrity,
                        format!(
                            "Layer '{name}': concat inputs {concat_inputs:?} do not match the declared feature order {feature_names:?}."
                        ),
                    ));
                }
                prev_width = Some(inputs.len());
            }
            LayerNode::Dense(dense) => {
                dense
                    .check_dimensions()
                    .map_err(|msg| AppError::new(ErrorKind::DimensionMismatch, msg))?;
                if let Some(width) = prev_width {
                    if dense.input_dim != width {
                        return Err(AppError::new(
                            ErrorKind::DimensionMismatch,
                            format!(
                                "Layer '{}': declared input dim {} but upstream produces {}.",
                                dense.name, dense.input_dim, width
                            ),
                        ));
                    }
                }
                prev_width = Some(dense.output_dim);
            }
            LayerNode::Activation { .. } | LayerNode::Softmax { .. } => {
                // Width-preserving layers.
            }
        }

        if let Some(prev) = prev_output {
            let inputs = layer.inputs();
            if inputs != vec![prev] {
                return Err(AppError::new(
                    ErrorKind::SpecIntegrity,
                    format!(
                        "Layer '{}': expected input ['{prev}'], got {inputs:?}.",
                        layer.name()
                    ),
                ));
            }
        }
        prev_output = Some(layer.output());
    }

    // The classifier head must be sized to the full label enumeration and end
    // in the reserved probability output.
    if prev_width != Some(graph.class_labels.len()) {
        return Err(AppError::new(
            ErrorKind::DimensionMismatch,
            format!(
                "Classifier output width {:?} does not match the {} declared class labels.",
                prev_width,
                graph.class_labels.len()
            ),
        ));
    }
    if prev_output != Some(graph.probability_output_name.as_str()) {
        return Err(AppError::new(
            ErrorKind::SpecIntegrity,
            format!(
                "Final layer output {:?} is not the reserved probability output '{}'.",
                prev_output, graph.probability_output_name
            ),
        ));
    }

    Ok(())
}

//! Updatability configuration.
//!
//! Marks the dense layers as refinable by on-device training and populates
//! the training interface: categorical-cross-entropy loss over the softmax
//! output, Adam with fixed hyperparameters, and a fixed epoch count.
//!
//! Training itself happens later, on-device; this stage only describes it.

use crate::domain::{
    AdamSpec, LayerNode, LossKind, LossSpec, ModelGraph, TrainingConfig,
};

pub const LOSS_LAYER_NAME: &str = "lossLayer";

pub const LEARNING_RATE: f64 = 0.01;
pub const BETA1: f64 = 0.9;
pub const BETA2: f64 = 0.999;
pub const EPSILON: f64 = 1e-8;
pub const BATCH_SIZE: u64 = 32;
pub const EPOCHS: u64 = 10;

/// Mark the dense layers updatable and build the training configuration.
///
/// Consumes the graph and returns the updated value; nothing else is mutated.
pub fn configure(mut graph: ModelGraph) -> (ModelGraph, TrainingConfig) {
    for layer in &mut graph.layers {
        if let LayerNode::Dense(dense) = layer {
            dense.updatable = true;
        }
    }

    let loss = LossSpec {
        name: LOSS_LAYER_NAME.to_string(),
        kind: LossKind::CategoricalCrossEntropy,
        input: graph.probability_output_name.clone(),
        target: graph.predicted_label_name.clone(),
    };

    let optimizer = AdamSpec {
        learning_rate: LEARNING_RATE,
        beta1: BETA1,
        beta2: BETA2,
        epsilon: EPSILON,
        batch_size: BATCH_SIZE,
    };

    let training = TrainingConfig {
        updatable_layers: graph.dense_layer_names(),
        loss,
        optimizer,
        epochs: EPOCHS,
    };

    (graph, training)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLASS_LABELS, PREDICTED_LABEL_NAME, PROBABILITY_OUTPUT_NAME, TARGET_COLUMN, feature_specs};
    use crate::domain::ResolvedSchema;
    use crate::graph::build_graph;
    use std::path::PathBuf;

    fn configured() -> (ModelGraph, TrainingConfig) {
        let schema = ResolvedSchema {
            csv_path: PathBuf::from("test.csv"),
            features: feature_specs(),
            target_column: TARGET_COLUMN.to_string(),
            label_field: PREDICTED_LABEL_NAME.to_string(),
            class_labels: CLASS_LABELS.to_vec(),
            rows_read: 1,
            rows_skipped: 0,
            observed_labels: vec![1],
        };
        configure(build_graph(&schema, Some(3)).unwrap())
    }

    #[test]
    fn both_dense_layers_become_updatable() {
        let (graph, training) = configured();
        assert_eq!(training.updatable_layers, vec!["fc1", "fc2"]);
        for layer in &graph.layers {
            if let LayerNode::Dense(d) = layer {
                assert!(d.updatable, "layer '{}' should be updatable", d.name);
            }
        }
    }

    #[test]
    fn loss_reads_softmax_and_targets_the_label() {
        let (_, training) = configured();
        assert_eq!(training.loss.name, LOSS_LAYER_NAME);
        assert_eq!(training.loss.kind, LossKind::CategoricalCrossEntropy);
        assert_eq!(training.loss.input, PROBABILITY_OUTPUT_NAME);
        assert_eq!(training.loss.target, PREDICTED_LABEL_NAME);
    }

    #[test]
    fn optimizer_hyperparameters_are_fixed() {
        let (_, training) = configured();
        assert_eq!(training.optimizer.learning_rate, 0.01);
        assert_eq!(training.optimizer.beta1, 0.9);
        assert_eq!(training.optimizer.beta2, 0.999);
        assert_eq!(training.optimizer.epsilon, 1e-8);
        assert_eq!(training.optimizer.batch_size, 32);
        assert_eq!(training.epochs, 10);
    }
}

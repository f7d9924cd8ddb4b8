//! Lowering of the in-memory model into the serialized spec representation.
//!
//! The high-level graph and training configuration are converted into
//! `proto::Model` in one place, with every cross-referenced field (loss
//! target, updatable flag, training-input list) set directly at construction
//! time. This is deliberate: the artifact is modeled as a single consistently
//! constructed value, and the patcher in [`patch`] only audits the result
//! instead of being the mechanism that makes it correct.

pub mod patch;

use crate::domain::{
    ActivationKind, LayerNode, LossKind, ModelGraph, ModelMetadata, TrainingConfig,
};
use crate::error::{AppError, ErrorKind};
use crate::proto;

/// Lower the graph and training configuration into a serialized-level model.
///
/// Re-validates layer dimensions first so a malformed graph can never reach
/// the wire format.
pub fn lower(
    graph: &ModelGraph,
    training: &TrainingConfig,
    metadata: &ModelMetadata,
) -> Result<proto::Model, AppError> {
    crate::graph::validate_graph(graph)?;

    Ok(proto::Model {
        specification_version: proto::UPDATABLE_SPEC_VERSION,
        description: Some(build_description(graph, training, metadata)),
        // True iff updatable layers exist. They always do for this topology,
        // but the invariant is stated, not assumed.
        is_updatable: !training.updatable_layers.is_empty(),
        r#type: Some(proto::model::Type::NeuralNetworkClassifier(
            build_classifier(graph, training)?,
        )),
    })
}

fn build_description(
    graph: &ModelGraph,
    training: &TrainingConfig,
    metadata: &ModelMetadata,
) -> proto::ModelDescription {
    let input: Vec<proto::FeatureDescription> = graph
        .features
        .iter()
        .map(|f| proto::FeatureDescription {
            name: f.name.clone(),
            short_description: String::new(),
            r#type: Some(proto::FeatureType::multi_array(vec![f.shape as i64])),
        })
        .collect();

    let output = vec![
        proto::FeatureDescription {
            name: graph.probability_output_name.clone(),
            short_description: "Probability of each vibe class".to_string(),
            r#type: Some(proto::FeatureType::dictionary_int64_keys()),
        },
        proto::FeatureDescription {
            name: graph.predicted_label_name.clone(),
            short_description: "Most likely vibe class".to_string(),
            r#type: Some(proto::FeatureType::int64()),
        },
    ];

    // Training inputs are the inference inputs plus the ground-truth label.
    // The label entry is what the loss layer's target refers to.
    let mut training_input = input.clone();
    training_input.push(proto::FeatureDescription {
        name: training.loss.target.clone(),
        short_description: "True vibe class (training only)".to_string(),
        r#type: Some(proto::FeatureType::int64()),
    });

    proto::ModelDescription {
        input,
        output,
        predicted_feature_name: graph.predicted_label_name.clone(),
        predicted_probabilities_name: graph.probability_output_name.clone(),
        training_input,
        metadata: Some(proto::Metadata {
            short_description: metadata.description.clone(),
            version_string: String::new(),
            author: metadata.author.clone(),
            license: metadata.license.clone(),
        }),
    }
}

fn build_classifier(
    graph: &ModelGraph,
    training: &TrainingConfig,
) -> Result<proto::NeuralNetworkClassifier, AppError> {
    let layers: Vec<proto::NeuralNetworkLayer> =
        graph.layers.iter().map(lower_layer).collect();

    // The probability output is produced by the final softmax; its layer name
    // is what the classifier declares as its probability source.
    let probability_layer = graph
        .layers
        .iter()
        .find(|l| l.output() == graph.probability_output_name)
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::SpecIntegrity,
                format!(
                    "No layer produces the probability output '{}'.",
                    graph.probability_output_name
                ),
            )
        })?;

    Ok(proto::NeuralNetworkClassifier {
        layers,
        update_params: Some(build_update_params(training)),
        class_labels: Some(
            proto::neural_network_classifier::ClassLabels::Int64ClassLabels(proto::Int64Vector {
                vector: graph.class_labels.clone(),
            }),
        ),
        label_probability_layer_name: probability_layer.name().to_string(),
    })
}

fn lower_layer(node: &LayerNode) -> proto::NeuralNetworkLayer {
    match node {
        LayerNode::Concat {
            name,
            inputs,
            output,
        } => proto::NeuralNetworkLayer {
            name: name.clone(),
            input: inputs.clone(),
            output: vec![output.clone()],
            is_updatable: false,
            layer: Some(proto::neural_network_layer::Layer::Concat(
                proto::ConcatLayerParams {
                    sequence_concat: false,
                },
            )),
        },
        LayerNode::Dense(dense) => proto::NeuralNetworkLayer {
            name: dense.name.clone(),
            input: vec![dense.input.clone()],
            output: vec![dense.output.clone()],
            is_updatable: dense.updatable,
            layer: Some(proto::neural_network_layer::Layer::InnerProduct(
                proto::InnerProductLayerParams {
                    input_channels: dense.input_dim as u64,
                    output_channels: dense.output_dim as u64,
                    has_bias: true,
                    weights: Some(proto::WeightParams {
                        float_value: dense.weights.clone(),
                        is_updatable: dense.updatable,
                    }),
                    bias: Some(proto::WeightParams {
                        float_value: dense.bias.clone(),
                        is_updatable: dense.updatable,
                    }),
                },
            )),
        },
        LayerNode::Activation {
            name,
            kind,
            input,
            output,
        } => proto::NeuralNetworkLayer {
            name: name.clone(),
            input: vec![input.clone()],
            output: vec![output.clone()],
            is_updatable: false,
            layer: Some(proto::neural_network_layer::Layer::Activation(
                match kind {
                    ActivationKind::Relu => proto::ActivationParams {
                        nonlinearity_type: Some(
                            proto::activation_params::NonlinearityType::ReLu(
                                proto::ActivationReLu {},
                            ),
                        ),
                    },
                },
            )),
        },
        LayerNode::Softmax {
            name,
            input,
            output,
        } => proto::NeuralNetworkLayer {
            name: name.clone(),
            input: vec![input.clone()],
            output: vec![output.clone()],
            is_updatable: false,
            layer: Some(proto::neural_network_layer::Layer::Softmax(
                proto::SoftmaxLayerParams {},
            )),
        },
    }
}

fn build_update_params(training: &TrainingConfig) -> proto::NetworkUpdateParameters {
    let loss_layer = proto::LossLayer {
        name: training.loss.name.clone(),
        loss_layer_type: Some(match training.loss.kind {
            LossKind::CategoricalCrossEntropy => {
                proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(
                    proto::CategoricalCrossEntropyLossLayer {
                        input: training.loss.input.clone(),
                        target: training.loss.target.clone(),
                    },
                )
            }
        }),
    };

    proto::NetworkUpdateParameters {
        loss_layers: vec![loss_layer],
        optimizer: Some(proto::Optimizer {
            optimizer_type: Some(proto::optimizer::OptimizerType::AdamOptimizer(
                proto::AdamOptimizer {
                    learning_rate: Some(proto::DoubleParameter::new(
                        training.optimizer.learning_rate,
                    )),
                    mini_batch_size: Some(proto::Int64Parameter::new(
                        training.optimizer.batch_size as i64,
                    )),
                    beta1: Some(proto::DoubleParameter::new(training.optimizer.beta1)),
                    beta2: Some(proto::DoubleParameter::new(training.optimizer.beta2)),
                    eps: Some(proto::DoubleParameter::new(training.optimizer.epsilon)),
                },
            )),
        }),
        epochs: Some(proto::Int64Parameter::new(training.epochs as i64)),
        shuffle: Some(proto::BoolParameter::new(true)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{
        CLASS_LABELS, ModelMetadata, PREDICTED_LABEL_NAME, PROBABILITY_OUTPUT_NAME,
        ResolvedSchema, TARGET_COLUMN, feature_specs,
    };
    use crate::graph::build_graph;
    use crate::training::configure;
    use std::path::PathBuf;

    pub(crate) fn lowered_model() -> proto::Model {
        let schema = ResolvedSchema {
            csv_path: PathBuf::from("test.csv"),
            features: feature_specs(),
            target_column: TARGET_COLUMN.to_string(),
            label_field: PREDICTED_LABEL_NAME.to_string(),
            class_labels: CLASS_LABELS.to_vec(),
            rows_read: 5,
            rows_skipped: 0,
            observed_labels: vec![0, 2, 5],
        };
        let (graph, training) = configure(build_graph(&schema, Some(9)).unwrap());
        let metadata = ModelMetadata {
            author: "Vibe Assistant".to_string(),
            license: "MIT".to_string(),
            description: "Updatable MLP classifier for vibe prediction".to_string(),
        };
        lower(&graph, &training, &metadata).unwrap()
    }

    #[test]
    fn lowered_model_is_updatable_with_version_4() {
        let model = lowered_model();
        assert!(model.is_updatable);
        assert_eq!(model.specification_version, proto::UPDATABLE_SPEC_VERSION);
    }

    #[test]
    fn description_declares_classifier_outputs() {
        let model = lowered_model();
        let desc = model.description.as_ref().unwrap();

        assert_eq!(desc.input.len(), 7);
        assert_eq!(desc.predicted_feature_name, PREDICTED_LABEL_NAME);
        assert_eq!(desc.predicted_probabilities_name, PROBABILITY_OUTPUT_NAME);

        let prob = desc
            .output
            .iter()
            .find(|o| o.name == PROBABILITY_OUTPUT_NAME)
            .unwrap();
        assert_eq!(prob.r#type.as_ref().unwrap().kind_name(), "dictionaryType");

        let label = desc
            .output
            .iter()
            .find(|o| o.name == PREDICTED_LABEL_NAME)
            .unwrap();
        assert!(label.r#type.as_ref().unwrap().is_int64());
    }

    #[test]
    fn training_inputs_include_the_label_as_int64() {
        let model = lowered_model();
        let desc = model.description.as_ref().unwrap();
        let label = desc
            .training_input
            .iter()
            .find(|i| i.name == PREDICTED_LABEL_NAME)
            .expect("label training input must be declared");
        assert!(label.r#type.as_ref().unwrap().is_int64());
    }

    #[test]
    fn classifier_carries_the_full_label_vector() {
        let model = lowered_model();
        let nn = model.classifier().unwrap();
        assert_eq!(nn.int64_class_labels(), &CLASS_LABELS[..]);
        assert_eq!(nn.label_probability_layer_name, "softmax");
        assert_eq!(nn.layers.len(), 5);
    }

    #[test]
    fn loss_layer_targets_the_predicted_label() {
        let model = lowered_model();
        let update = model.classifier().unwrap().update_params.as_ref().unwrap();
        assert_eq!(update.loss_layers.len(), 1);

        let loss = &update.loss_layers[0];
        assert_eq!(loss.name, "lossLayer");
        let Some(proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(cce)) =
            &loss.loss_layer_type
        else {
            panic!("expected categorical cross-entropy loss");
        };
        assert_eq!(cce.input, PROBABILITY_OUTPUT_NAME);
        assert_eq!(cce.target, PREDICTED_LABEL_NAME);
    }

    #[test]
    fn adam_parameters_survive_lowering() {
        let model = lowered_model();
        let update = model.classifier().unwrap().update_params.as_ref().unwrap();
        let Some(proto::optimizer::OptimizerType::AdamOptimizer(adam)) = update
            .optimizer
            .as_ref()
            .and_then(|o| o.optimizer_type.as_ref())
        else {
            panic!("expected Adam optimizer");
        };
        assert_eq!(adam.learning_rate.as_ref().unwrap().default_value, 0.01);
        assert_eq!(adam.mini_batch_size.as_ref().unwrap().default_value, 32);
        assert_eq!(adam.beta1.as_ref().unwrap().default_value, 0.9);
        assert_eq!(adam.beta2.as_ref().unwrap().default_value, 0.999);
        assert_eq!(adam.eps.as_ref().unwrap().default_value, 1e-8);
        assert_eq!(update.epochs.as_ref().unwrap().default_value, 10);
    }

    #[test]
    fn updatable_layers_are_marked_on_the_wire() {
        let model = lowered_model();
        let nn = model.classifier().unwrap();
        let updatable: Vec<&str> = nn
            .layers
            .iter()
            .filter(|l| l.is_updatable)
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(updatable, vec!["fc1", "fc2"]);
    }
}

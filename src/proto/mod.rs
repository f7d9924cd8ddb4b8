//! Hand-written protobuf messages for the model-spec wire format.
//!
//! This is the subset of the public Core ML `Model.proto` /
//! `NeuralNetwork.proto` schema that this tool actually emits: a
//! neural-network classifier with concat / inner-product / activation /
//! softmax layers and an update interface (loss layers, Adam optimizer,
//! epochs). Field numbers match the public schema so the emitted artifact is
//! decodable by standard tooling, and unknown fields written by other tools
//! are simply skipped on decode.
//!
//! We define the messages by hand with `prost` derives rather than running
//! protoc codegen: the subset is small and stable, and keeping it in-tree
//! avoids a build-time dependency on the full upstream schema.

/// Specification version required for updatable models.
pub const UPDATABLE_SPEC_VERSION: i32 = 4;

/// Top-level model container.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Model {
    #[prost(int32, tag = "1")]
    pub specification_version: i32,
    #[prost(message, optional, tag = "2")]
    pub description: Option<ModelDescription>,
    /// Global updatable flag. Must be true iff the contained network has
    /// updatable layers.
    #[prost(bool, tag = "10")]
    pub is_updatable: bool,
    #[prost(oneof = "model::Type", tags = "403")]
    pub r#type: Option<model::Type>,
}

pub mod model {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "403")]
        NeuralNetworkClassifier(super::NeuralNetworkClassifier),
    }
}

impl Model {
    /// The classifier payload, if present.
    pub fn classifier(&self) -> Option<&NeuralNetworkClassifier> {
        match &self.r#type {
            Some(model::Type::NeuralNetworkClassifier(nn)) => Some(nn),
            None => None,
        }
    }

    pub fn classifier_mut(&mut self) -> Option<&mut NeuralNetworkClassifier> {
        match &mut self.r#type {
            Some(model::Type::NeuralNetworkClassifier(nn)) => Some(nn),
            None => None,
        }
    }
}

/// Input/output/training-input declarations plus metadata.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelDescription {
    #[prost(message, repeated, tag = "1")]
    pub input: Vec<FeatureDescription>,
    #[prost(message, repeated, tag = "10")]
    pub output: Vec<FeatureDescription>,
    /// Output holding the predicted class label.
    #[prost(string, tag = "11")]
    pub predicted_feature_name: String,
    /// Output holding the label→probability dictionary.
    #[prost(string, tag = "12")]
    pub predicted_probabilities_name: String,
    /// Inputs supplied only during on-device training. Must include the loss
    /// target.
    #[prost(message, repeated, tag = "50")]
    pub training_input: Vec<FeatureDescription>,
    #[prost(message, optional, tag = "100")]
    pub metadata: Option<Metadata>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Metadata {
    #[prost(string, tag = "1")]
    pub short_description: String,
    #[prost(string, tag = "2")]
    pub version_string: String,
    #[prost(string, tag = "3")]
    pub author: String,
    #[prost(string, tag = "4")]
    pub license: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureDescription {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub short_description: String,
    #[prost(message, optional, tag = "3")]
    pub r#type: Option<FeatureType>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeatureType {
    #[prost(oneof = "feature_type::Type", tags = "1, 5, 6")]
    pub r#type: Option<feature_type::Type>,
    #[prost(bool, tag = "1000")]
    pub is_optional: bool,
}

pub mod feature_type {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "1")]
        Int64Type(super::Int64FeatureType),
        #[prost(message, tag = "5")]
        MultiArrayType(super::ArrayFeatureType),
        #[prost(message, tag = "6")]
        DictionaryType(super::DictionaryFeatureType),
    }
}

impl FeatureType {
    /// A multi-array of doubles with the given shape.
    pub fn multi_array(shape: Vec<i64>) -> Self {
        Self {
            r#type: Some(feature_type::Type::MultiArrayType(ArrayFeatureType {
                shape,
                data_type: ArrayDataType::Double as i32,
            })),
            is_optional: false,
        }
    }

    /// A scalar 64-bit integer.
    pub fn int64() -> Self {
        Self {
            r#type: Some(feature_type::Type::Int64Type(Int64FeatureType {})),
            is_optional: false,
        }
    }

    /// An int64-keyed dictionary (label → probability).
    pub fn dictionary_int64_keys() -> Self {
        Self {
            r#type: Some(feature_type::Type::DictionaryType(DictionaryFeatureType {
                key_type: Some(dictionary_feature_type::KeyType::Int64KeyType(
                    Int64FeatureType {},
                )),
            })),
            is_optional: false,
        }
    }

    /// Short wire-level name of the contained type, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.r#type {
            Some(feature_type::Type::Int64Type(_)) => "int64Type",
            Some(feature_type::Type::MultiArrayType(_)) => "multiArrayType",
            Some(feature_type::Type::DictionaryType(_)) => "dictionaryType",
            None => "(unset)",
        }
    }

    pub fn is_int64(&self) -> bool {
        matches!(&self.r#type, Some(feature_type::Type::Int64Type(_)))
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64FeatureType {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ArrayFeatureType {
    #[prost(int64, repeated, tag = "1")]
    pub shape: Vec<i64>,
    #[prost(enumeration = "ArrayDataType", tag = "2")]
    pub data_type: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ArrayDataType {
    InvalidArrayDataType = 0,
    Float32 = 65568,
    Double = 65600,
    Int32 = 131104,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DictionaryFeatureType {
    #[prost(oneof = "dictionary_feature_type::KeyType", tags = "1")]
    pub key_type: Option<dictionary_feature_type::KeyType>,
}

pub mod dictionary_feature_type {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum KeyType {
        #[prost(message, tag = "1")]
        Int64KeyType(super::Int64FeatureType),
    }
}

/// Neural-network classifier payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NeuralNetworkClassifier {
    #[prost(message, repeated, tag = "1")]
    pub layers: Vec<NeuralNetworkLayer>,
    #[prost(message, optional, tag = "10")]
    pub update_params: Option<NetworkUpdateParameters>,
    #[prost(oneof = "neural_network_classifier::ClassLabels", tags = "101")]
    pub class_labels: Option<neural_network_classifier::ClassLabels>,
    /// Name of the layer producing the probability distribution.
    #[prost(string, tag = "200")]
    pub label_probability_layer_name: String,
}

pub mod neural_network_classifier {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClassLabels {
        #[prost(message, tag = "101")]
        Int64ClassLabels(super::Int64Vector),
    }
}

impl NeuralNetworkClassifier {
    pub fn int64_class_labels(&self) -> &[i64] {
        match &self.class_labels {
            Some(neural_network_classifier::ClassLabels::Int64ClassLabels(v)) => &v.vector,
            None => &[],
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64Vector {
    #[prost(int64, repeated, tag = "1")]
    pub vector: Vec<i64>,
}

/// A single network layer: named tensors plus one set of layer parameters.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NeuralNetworkLayer {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub input: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub output: Vec<String>,
    #[prost(bool, tag = "10")]
    pub is_updatable: bool,
    #[prost(oneof = "neural_network_layer::Layer", tags = "130, 140, 175, 320")]
    pub layer: Option<neural_network_layer::Layer>,
}

pub mod neural_network_layer {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Layer {
        #[prost(message, tag = "130")]
        Activation(super::ActivationParams),
        #[prost(message, tag = "140")]
        InnerProduct(super::InnerProductLayerParams),
        #[prost(message, tag = "175")]
        Softmax(super::SoftmaxLayerParams),
        #[prost(message, tag = "320")]
        Concat(super::ConcatLayerParams),
    }
}

impl NeuralNetworkLayer {
    pub fn kind_name(&self) -> &'static str {
        match &self.layer {
            Some(neural_network_layer::Layer::Activation(_)) => "activation",
            Some(neural_network_layer::Layer::InnerProduct(_)) => "innerProduct",
            Some(neural_network_layer::Layer::Softmax(_)) => "softmax",
            Some(neural_network_layer::Layer::Concat(_)) => "concat",
            None => "(unset)",
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConcatLayerParams {
    #[prost(bool, tag = "100")]
    pub sequence_concat: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InnerProductLayerParams {
    #[prost(uint64, tag = "1")]
    pub input_channels: u64,
    #[prost(uint64, tag = "2")]
    pub output_channels: u64,
    #[prost(bool, tag = "10")]
    pub has_bias: bool,
    #[prost(message, optional, tag = "20")]
    pub weights: Option<WeightParams>,
    #[prost(message, optional, tag = "21")]
    pub bias: Option<WeightParams>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WeightParams {
    #[prost(float, repeated, tag = "1")]
    pub float_value: Vec<f32>,
    #[prost(bool, tag = "50")]
    pub is_updatable: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivationParams {
    #[prost(oneof = "activation_params::NonlinearityType", tags = "10")]
    pub nonlinearity_type: Option<activation_params::NonlinearityType>,
}

pub mod activation_params {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum NonlinearityType {
        #[prost(message, tag = "10")]
        ReLu(super::ActivationReLu),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivationReLu {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SoftmaxLayerParams {}

/// On-device training interface: loss, optimizer, epochs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NetworkUpdateParameters {
    #[prost(message, repeated, tag = "1")]
    pub loss_layers: Vec<LossLayer>,
    #[prost(message, optional, tag = "2")]
    pub optimizer: Option<Optimizer>,
    #[prost(message, optional, tag = "3")]
    pub epochs: Option<Int64Parameter>,
    #[prost(message, optional, tag = "10")]
    pub shuffle: Option<BoolParameter>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LossLayer {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "loss_layer::LossLayerType", tags = "10")]
    pub loss_layer_type: Option<loss_layer::LossLayerType>,
}

pub mod loss_layer {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum LossLayerType {
        #[prost(message, tag = "10")]
        CategoricalCrossEntropyLossLayer(super::CategoricalCrossEntropyLossLayer),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CategoricalCrossEntropyLossLayer {
    /// Tensor carrying predicted probabilities.
    #[prost(string, tag = "1")]
    pub input: String,
    /// Training input carrying ground truth. Mandatory for training to locate
    /// its target; an artifact without it cannot be fine-tuned.
    #[prost(string, tag = "2")]
    pub target: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Optimizer {
    #[prost(oneof = "optimizer::OptimizerType", tags = "11")]
    pub optimizer_type: Option<optimizer::OptimizerType>,
}

pub mod optimizer {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum OptimizerType {
        #[prost(message, tag = "11")]
        AdamOptimizer(super::AdamOptimizer),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AdamOptimizer {
    #[prost(message, optional, tag = "1")]
    pub learning_rate: Option<DoubleParameter>,
    #[prost(message, optional, tag = "2")]
    pub mini_batch_size: Option<Int64Parameter>,
    #[prost(message, optional, tag = "3")]
    pub beta1: Option<DoubleParameter>,
    #[prost(message, optional, tag = "4")]
    pub beta2: Option<DoubleParameter>,
    #[prost(message, optional, tag = "5")]
    pub eps: Option<DoubleParameter>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DoubleParameter {
    #[prost(double, tag = "1")]
    pub default_value: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64Parameter {
    #[prost(int64, tag = "1")]
    pub default_value: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoolParameter {
    #[prost(bool, tag = "1")]
    pub default_value: bool,
}

impl DoubleParameter {
    pub fn new(default_value: f64) -> Self {
        Self { default_value }
    }
}

impl Int64Parameter {
    pub fn new(default_value: i64) -> Self {
        Self { default_value }
    }
}

impl BoolParameter {
    pub fn new(default_value: bool) -> Self {
        Self { default_value }
    }
}

//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline stages stay clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::path::Path;

use crate::domain::{LayerNode, ModelGraph, ResolvedSchema, TrainingConfig};
use crate::proto;

/// Format the summary printed after a successful `vibegen generate`.
pub fn format_run_summary(
    schema: &ResolvedSchema,
    graph: &ModelGraph,
    training: &TrainingConfig,
    output_path: &Path,
) -> String {
    let mut out = String::new();

    out.push_str("=== vibegen - Updatable Vibe Classifier ===\n");
    out.push_str(&format!("Dataset: {}\n", schema.csv_path.display()));
    out.push_str(&format!(
        "Rows: {} read, {} skipped\n",
        schema.rows_read, schema.rows_skipped
    ));
    out.push_str(&format!(
        "Features ({}): {}\n",
        schema.features.len(),
        schema
            .features
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    out.push_str(&format!(
        "Observed labels: {:?} | declared labels: {:?}\n",
        schema.observed_labels, schema.class_labels
    ));

    out.push_str("\nLayers:\n");
    for layer in &graph.layers {
        match layer {
            LayerNode::Dense(d) => {
                let updatable = if d.updatable { " [updatable]" } else { "" };
                out.push_str(&format!(
                    "  {:<14} {:<13} {} -> {}{updatable}\n",
                    d.name,
                    layer.kind_name(),
                    d.input_dim,
                    d.output_dim
                ));
            }
            _ => {
                out.push_str(&format!(
                    "  {:<14} {:<13} {} -> {}\n",
                    layer.name(),
                    layer.kind_name(),
                    layer.inputs().join(", "),
                    layer.output()
                ));
            }
        }
    }

    out.push_str("\nTraining interface:\n");
    out.push_str(&format!(
        "- loss: {:?} on '{}' targeting '{}'\n",
        training.loss.kind, training.loss.input, training.loss.target
    ));
    out.push_str(&format!(
        "- optimizer: Adam lr={} beta1={} beta2={} eps={} batch={}\n",
        training.optimizer.learning_rate,
        training.optimizer.beta1,
        training.optimizer.beta2,
        training.optimizer.epsilon,
        training.optimizer.batch_size
    ));
    out.push_str(&format!("- epochs: {}\n", training.epochs));

    out.push_str(&format!("\nSaved updatable spec to {}\n", output_path.display()));
    out
}

/// Format a saved artifact for `vibegen inspect`.
///
/// Mirrors what the original debugging scripts printed: declarations, class
/// labels, layer list, loss wiring, training inputs, optimizer. Read-only.
pub fn format_model_report(model: &proto::Model) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Specification version: {} | isUpdatable: {}\n",
        model.specification_version, model.is_updatable
    ));

    if let Some(desc) = &model.description {
        if let Some(meta) = &desc.metadata {
            out.push_str(&format!(
                "Author: {} | License: {}\n",
                meta.author, meta.license
            ));
            if !meta.short_description.is_empty() {
                out.push_str(&format!("Description: {}\n", meta.short_description));
            }
        }

        out.push_str("\n--- Inputs ---\n");
        for i in &desc.input {
            out.push_str(&format!("{}: {}\n", i.name, feature_kind(i)));
        }

        out.push_str("\n--- Outputs ---\n");
        for o in &desc.output {
            out.push_str(&format!("{}: {}\n", o.name, feature_kind(o)));
        }
        out.push_str(&format!(
            "predictedFeatureName: {}\npredictedProbabilitiesName: {}\n",
            desc.predicted_feature_name, desc.predicted_probabilities_name
        ));

        out.push_str("\n--- Training Inputs ---\n");
        if desc.training_input.is_empty() {
            out.push_str("(none declared)\n");
        }
        for i in &desc.training_input {
            out.push_str(&format!("{}: {}\n", i.name, feature_kind(i)));
        }
    }

    match model.classifier() {
        Some(nn) => {
            out.push_str("\n--- Class Labels ---\n");
            out.push_str(&format!("{:?}\n", nn.int64_class_labels()));

            out.push_str(&format!("\n--- Layers ({}) ---\n", nn.layers.len()));
            for layer in &nn.layers {
                let updatable = if layer.is_updatable { " [updatable]" } else { "" };
                out.push_str(&format!(
                    "{}: {}{updatable} ({} -> {})\n",
                    layer.name,
                    layer.kind_name(),
                    layer.input.join(", "),
                    layer.output.join(", ")
                ));
            }

            out.push_str("\n--- Update Parameters ---\n");
            match &nn.update_params {
                Some(update) => {
                    for loss in &update.loss_layers {
                        match &loss.loss_layer_type {
                            Some(
                                proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(
                                    cce,
                                ),
                            ) => {
                                out.push_str(&format!(
                                    "{}: categoricalCrossEntropy input='{}' target='{}'\n",
                                    loss.name, cce.input, cce.target
                                ));
                            }
                            None => {
                                out.push_str(&format!("{}: (unset loss kind)\n", loss.name));
                            }
                        }
                    }
                    if let Some(proto::optimizer::OptimizerType::AdamOptimizer(adam)) =
                        update.optimizer.as_ref().and_then(|o| o.optimizer_type.as_ref())
                    {
                        out.push_str(&format!(
                            "optimizer: Adam lr={} batch={} beta1={} beta2={} eps={}\n",
                            param(&adam.learning_rate),
                            int_param(&adam.mini_batch_size),
                            param(&adam.beta1),
                            param(&adam.beta2),
                            param(&adam.eps)
                        ));
                    }
                    if let Some(epochs) = &update.epochs {
                        out.push_str(&format!("epochs: {}\n", epochs.default_value));
                    }
                }
                None => out.push_str("(model has no update parameters)\n"),
            }
        }
        None => out.push_str("\nNo neural-network classifier payload found.\n"),
    }

    out
}

fn feature_kind(desc: &proto::FeatureDescription) -> &'static str {
    desc.r#type
        .as_ref()
        .map(proto::FeatureType::kind_name)
        .unwrap_or("(unset)")
}

fn param(p: &Option<proto::DoubleParameter>) -> String {
    p.as_ref()
        .map(|p| p.default_value.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn int_param(p: &Option<proto::Int64Parameter>) -> String {
    p.as_ref()
        .map(|p| p.default_value.to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::tests::lowered_model;

    #[test]
    fn model_report_names_the_loss_wiring() {
        let report = format_model_report(&lowered_model());
        assert!(report.contains("isUpdatable: true"));
        assert!(report.contains("[0, 1, 2, 3, 4, 5, 6, 7]"));
        assert!(report.contains("lossLayer: categoricalCrossEntropy input='classProbability' target='classLabel'"));
        assert!(report.contains("classLabel: int64Type"));
        assert!(report.contains("epochs: 10"));
    }
}

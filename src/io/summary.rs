//! Write a JSON summary of a generated model.
//!
//! The summary is the "portable" human-readable description of a run:
//! metadata, feature order, label vector, layer table, and the full training
//! configuration. It is meant for quick review in a diff or a notebook
//! without protobuf tooling; the binary artifact stays the source of truth.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSpec, LayerNode, ModelGraph, ModelMetadata, TrainingConfig};
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub tool: String,
    pub metadata: ModelMetadata,
    pub features: Vec<FeatureSpec>,
    pub class_labels: Vec<i64>,
    pub layers: Vec<LayerSummary>,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dim: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dim: Option<usize>,
    pub updatable: bool,
}

pub fn build_summary(
    graph: &ModelGraph,
    training: &TrainingConfig,
    metadata: &ModelMetadata,
) -> ModelSummary {
    let layers = graph
        .layers
        .iter()
        .map(|layer| {
            let (input_dim, output_dim, updatable) = match layer {
                LayerNode::Dense(d) => (Some(d.input_dim), Some(d.output_dim), d.updatable),
                _ => (None, None, false),
            };
            LayerSummary {
                name: layer.name().to_string(),
                kind: layer.kind_name().to_string(),
                input_dim,
                output_dim,
                updatable,
            }
        })
        .collect();

    ModelSummary {
        tool: "vibegen".to_string(),
        metadata: metadata.clone(),
        features: graph.features.clone(),
        class_labels: graph.class_labels.clone(),
        layers,
        training: training.clone(),
    }
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &ModelSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Serialization,
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, summary).map_err(|e| {
        AppError::new(
            ErrorKind::Serialization,
            format!("Failed to write summary JSON: {e}"),
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CLASS_LABELS, PREDICTED_LABEL_NAME, ResolvedSchema, TARGET_COLUMN, feature_specs,
    };
    use crate::graph::build_graph;
    use crate::training::configure;
    use std::path::PathBuf;

    fn summary() -> ModelSummary {
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
        let (graph, training) = configure(build_graph(&schema, Some(5)).unwrap());
        let metadata = ModelMetadata {
            author: "Vibe Assistant".to_string(),
            license: "MIT".to_string(),
            description: "test".to_string(),
        };
        build_summary(&graph, &training, &metadata)
    }

    #[test]
    fn summary_lists_layers_in_graph_order() {
        let s = summary();
        let names: Vec<&str> = s.layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["concat_inputs", "fc1", "relu1", "fc2", "softmax"]);
        assert_eq!(s.class_labels, CLASS_LABELS.to_vec());
    }

    #[test]
    fn json_export_round_trips() {
        let s = summary();
        let path = std::env::temp_dir().join(format!(
            "vibegen_summary_{}_roundtrip.json",
            std::process::id()
        ));

        write_summary_json(&path, &s).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: ModelSummary = serde_json::from_str(&text).unwrap();

        assert_eq!(back.tool, "vibegen");
        assert_eq!(back.layers.len(), 5);
        assert_eq!(back.training.updatable_layers, vec!["fc1", "fc2"]);
        assert_eq!(back.training.epochs, 10);

        std::fs::remove_file(&path).ok();
    }
}

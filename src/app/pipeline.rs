//! The model-authoring pipeline.
//!
//! Strictly sequential, each stage consuming the previous stage's output:
//!
//! resolve schema -> build graph -> configure training -> lower -> patch -> save
//!
//! Any stage failure aborts the whole run; no partial artifact is ever
//! written. There are no retries and no state shared between runs.

use crate::domain::{GenConfig, ModelGraph, ResolvedSchema, TrainingConfig};
use crate::error::AppError;
use crate::proto;

/// All computed outputs of a single `vibegen generate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub schema: ResolvedSchema,
    pub graph: ModelGraph,
    pub training: TrainingConfig,
    /// The serialized-level spec as written to disk (post-patch).
    pub model: proto::Model,
    /// One note per consistency correction the patcher applied.
    pub patch_notes: Vec<String>,
}

/// Execute the full authoring pipeline and write the artifact.
pub fn run_generate(config: &GenConfig) -> Result<RunOutput, AppError> {
    // 1) Resolve the dataset and schema (fails before any construction when
    //    no candidate path exists).
    let schema = crate::schema::resolve_schema(config)?;

    // 2) Build the inference graph; weights are drawn here.
    let graph = crate::graph::build_graph(&schema, config.seed)?;

    // 3) Mark updatable layers and populate the training interface.
    let (graph, training) = crate::training::configure(graph);

    // 4) Lower to the serialized representation.
    let mut model = crate::spec::lower(&graph, &training, &config.metadata)?;

    // 5) Audit the serialized spec; corrections are returned for reporting.
    let patch_notes = crate::spec::patch::patch_spec(&mut model)?;

    // 6) Serialize. A failed write means no artifact was produced.
    crate::io::model_file::write_model(&config.output, &model)?;

    Ok(RunOutput {
        schema,
        graph,
        training,
        model,
        patch_notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLASS_LABELS, ModelMetadata, PREDICTED_LABEL_NAME, PROBABILITY_OUTPUT_NAME};
    use crate::error::ErrorKind;
    use crate::proto;
    use std::path::PathBuf;

    const HEADER: &str = "timestamp,distance,activity,startTime,duration,hour,dayOfWeek,vibe";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vibegen_pipeline_{}_{}", std::process::id(), name))
    }

    fn config(csv: PathBuf, output: PathBuf, seed: Option<u64>) -> GenConfig {
        GenConfig {
            csv_candidates: vec![csv],
            output,
            seed,
            metadata: ModelMetadata {
                author: "Vibe Assistant".to_string(),
                license: "MIT".to_string(),
                description: "Updatable MLP classifier for vibe prediction".to_string(),
            },
            export_summary: None,
        }
    }

    fn write_sparse_csv(name: &str) -> PathBuf {
        // Only vibes {0, 2, 5} occur in this sample.
        let path = temp_path(name);
        let mut contents = format!("{HEADER}\n");
        for (i, vibe) in [0, 2, 5, 0, 2].iter().enumerate() {
            contents.push_str(&format!("{i},1.5,2,8.0,30,9,{},{vibe}\n", i % 7));
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_dataset_aborts_with_no_output_file() {
        let output = temp_path("never_written.mlmodel");
        let cfg = config(temp_path("missing.csv"), output.clone(), None);

        let err = run_generate(&cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatasetNotFound);
        assert!(!output.exists());
    }

    #[test]
    fn sparse_dataset_still_yields_eight_classes() {
        let csv = write_sparse_csv("sparse_run.csv");
        let output = temp_path("sparse_run.mlmodel");
        let run = run_generate(&config(csv, output.clone(), Some(11))).unwrap();

        assert_eq!(run.schema.observed_labels, vec![0, 2, 5]);
        let nn = run.model.classifier().unwrap();
        assert_eq!(nn.int64_class_labels(), &CLASS_LABELS[..]);

        // fc2 sized 8, not 3.
        let fc2 = nn.layers.iter().find(|l| l.name == "fc2").unwrap();
        let Some(proto::neural_network_layer::Layer::InnerProduct(ip)) = &fc2.layer else {
            panic!("fc2 should be an inner-product layer");
        };
        assert_eq!(ip.output_channels, 8);

        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn saved_artifact_is_self_consistent() {
        let csv = write_sparse_csv("artifact.csv");
        let output = temp_path("artifact.mlmodel");
        let run = run_generate(&config(csv, output.clone(), Some(21))).unwrap();

        // A consistently constructed spec needs no patch corrections.
        assert!(run.patch_notes.is_empty(), "unexpected: {:?}", run.patch_notes);

        let saved = crate::io::model_file::read_model(&output).unwrap();
        assert_eq!(saved, run.model);
        assert!(saved.is_updatable);

        let desc = saved.description.as_ref().unwrap();
        let prob = desc
            .output
            .iter()
            .find(|o| o.name == PROBABILITY_OUTPUT_NAME)
            .unwrap();
        assert_eq!(prob.r#type.as_ref().unwrap().kind_name(), "dictionaryType");

        let label_input = desc
            .training_input
            .iter()
            .find(|i| i.name == PREDICTED_LABEL_NAME)
            .expect("loss target must be declared as a training input");
        assert!(label_input.r#type.as_ref().unwrap().is_int64());

        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn reruns_share_topology_but_not_weights() {
        let csv = write_sparse_csv("rerun.csv");
        let out_a = temp_path("rerun_a.mlmodel");
        let out_b = temp_path("rerun_b.mlmodel");

        let a = run_generate(&config(csv.clone(), out_a.clone(), None)).unwrap();
        let b = run_generate(&config(csv, out_b.clone(), None)).unwrap();

        assert_eq!(a.schema.class_labels, b.schema.class_labels);
        assert_eq!(a.training.updatable_layers, b.training.updatable_layers);
        assert_eq!(
            a.model.description.as_ref().unwrap(),
            b.model.description.as_ref().unwrap()
        );

        let weights = |run: &RunOutput| -> Vec<f32> {
            let nn = run.model.classifier().unwrap();
            let fc1 = nn.layers.iter().find(|l| l.name == "fc1").unwrap();
            let Some(proto::neural_network_layer::Layer::InnerProduct(ip)) = &fc1.layer else {
                panic!("fc1 should be an inner-product layer");
            };
            ip.weights.as_ref().unwrap().float_value.clone()
        };
        assert_ne!(weights(&a), weights(&b));

        std::fs::remove_file(&out_a).ok();
        std::fs::remove_file(&out_b).ok();
    }
}

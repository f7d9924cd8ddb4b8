//! Serialized-spec consistency pass.
//!
//! Authoring builders and the wire representation have a history of drifting
//! apart: a builder call can mark layers updatable without flipping the global
//! flag, or attach a loss layer without a target. This pass is the last line
//! of defense before serialization. It inspects the `proto::Model` value
//! directly (never the high-level graph), corrects what it can in place, and
//! returns one note per correction so operators can audit the drift.
//!
//! On a spec produced by [`super::lower`] every check passes and the returned
//! note list is empty.

use crate::error::{AppError, ErrorKind};
use crate::proto;

/// Audit the three consistency invariants, repairing in place where possible.
///
/// Returns the list of corrections applied (empty for a healthy spec). A spec
/// with no categorical-cross-entropy loss layer cannot be repaired and is
/// rejected outright: an artifact that declares itself updatable but has no
/// loss would fail on-device in a far less debuggable way.
pub fn patch_spec(model: &mut proto::Model) -> Result<Vec<String>, AppError> {
    let mut notes = Vec::new();

    let target = model
        .description
        .as_ref()
        .map(|d| d.predicted_feature_name.clone())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::SpecIntegrity,
                "Spec has no predicted feature name; cannot determine the loss target.",
            )
        })?;

    let has_updatable_layers = patch_loss_target(model, &target, &mut notes)?;
    patch_updatable_flag(model, has_updatable_layers, &mut notes);
    patch_training_inputs(model, &target, &mut notes);

    Ok(notes)
}

/// Ensure the cross-entropy loss layer exists and points at the label.
///
/// Returns whether the network has any updatable layers, which the global
/// flag check needs next.
fn patch_loss_target(
    model: &mut proto::Model,
    target: &str,
    notes: &mut Vec<String>,
) -> Result<bool, AppError> {
    let nn = model.classifier_mut().ok_or_else(|| {
        AppError::new(
            ErrorKind::SpecIntegrity,
            "Spec does not contain a neural-network classifier.",
        )
    })?;

    let has_updatable_layers = nn.layers.iter().any(|l| l.is_updatable);

    let cce = nn
        .update_params
        .as_mut()
        .into_iter()
        .flat_map(|u| u.loss_layers.iter_mut())
        .find_map(|loss| match &mut loss.loss_layer_type {
            Some(proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(cce)) => {
                Some((loss.name.clone(), cce))
            }
            None => None,
        });

    let Some((loss_name, cce)) = cce else {
        return Err(AppError::new(
            ErrorKind::SpecIntegrity,
            "No categorical-cross-entropy loss layer found; the artifact would be untrainable.",
        ));
    };

    if cce.target != target {
        let was = if cce.target.is_empty() {
            "unset".to_string()
        } else {
            format!("'{}'", cce.target)
        };
        cce.target = target.to_string();
        notes.push(format!(
            "Loss layer '{loss_name}' target was {was}; set to '{target}'."
        ));
    }

    Ok(has_updatable_layers)
}

/// The global flag must be true whenever updatable layers exist. A false flag
/// with a non-empty updatable set is an integrity violation to correct, not
/// ignore.
fn patch_updatable_flag(model: &mut proto::Model, has_updatable_layers: bool, notes: &mut Vec<String>) {
    if has_updatable_layers && !model.is_updatable {
        model.is_updatable = true;
        notes.push(
            "Spec had updatable layers but isUpdatable was false; forced to true.".to_string(),
        );
    }
}

/// The declared training inputs must include the loss target as an int64
/// field; otherwise the artifact declares a target that is never supplied.
fn patch_training_inputs(model: &mut proto::Model, target: &str, notes: &mut Vec<String>) {
    let Some(desc) = model.description.as_mut() else {
        return;
    };

    match desc.training_input.iter_mut().find(|i| i.name == target) {
        Some(entry) => {
            let is_int64 = entry.r#type.as_ref().is_some_and(proto::FeatureType::is_int64);
            if !is_int64 {
                entry.r#type = Some(proto::FeatureType::int64());
                notes.push(format!(
                    "Training input '{target}' did not have int64 type; corrected."
                ));
            }
        }
        None => {
            desc.training_input.push(proto::FeatureDescription {
                name: target.to_string(),
                short_description: String::new(),
                r#type: Some(proto::FeatureType::int64()),
            });
            notes.push(format!(
                "Target '{target}' was missing from training inputs; added as int64."
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PREDICTED_LABEL_NAME;
    use crate::spec::tests::lowered_model;

    #[test]
    fn healthy_spec_needs_no_corrections() {
        let mut model = lowered_model();
        let before = model.clone();
        let notes = patch_spec(&mut model).unwrap();
        assert!(notes.is_empty(), "unexpected corrections: {notes:?}");
        assert_eq!(model, before);
    }

    #[test]
    fn unset_loss_target_is_repaired() {
        let mut model = lowered_model();
        {
            let update = model
                .classifier_mut()
                .unwrap()
                .update_params
                .as_mut()
                .unwrap();
            let Some(proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(cce)) =
                &mut update.loss_layers[0].loss_layer_type
            else {
                panic!("expected cce loss");
            };
            cce.target.clear();
        }

        let notes = patch_spec(&mut model).unwrap();
        assert_eq!(notes.len(), 1);

        let update = model.classifier().unwrap().update_params.as_ref().unwrap();
        let Some(proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(cce)) =
            &update.loss_layers[0].loss_layer_type
        else {
            panic!("expected cce loss");
        };
        assert_eq!(cce.target, PREDICTED_LABEL_NAME);
    }

    #[test]
    fn false_updatable_flag_with_updatable_layers_is_forced_true() {
        let mut model = lowered_model();
        model.is_updatable = false;

        let notes = patch_spec(&mut model).unwrap();
        assert!(model.is_updatable);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn missing_label_training_input_is_appended() {
        let mut model = lowered_model();
        model
            .description
            .as_mut()
            .unwrap()
            .training_input
            .retain(|i| i.name != PREDICTED_LABEL_NAME);

        let notes = patch_spec(&mut model).unwrap();
        assert_eq!(notes.len(), 1);

        let desc = model.description.as_ref().unwrap();
        let label = desc
            .training_input
            .iter()
            .find(|i| i.name == PREDICTED_LABEL_NAME)
            .expect("label must be re-added");
        assert!(label.r#type.as_ref().unwrap().is_int64());
    }

    #[test]
    fn wrongly_typed_label_training_input_is_corrected() {
        let mut model = lowered_model();
        {
            let desc = model.description.as_mut().unwrap();
            let entry = desc
                .training_input
                .iter_mut()
                .find(|i| i.name == PREDICTED_LABEL_NAME)
                .unwrap();
            entry.r#type = Some(proto::FeatureType::multi_array(vec![1]));
        }

        let notes = patch_spec(&mut model).unwrap();
        assert_eq!(notes.len(), 1);

        let desc = model.description.as_ref().unwrap();
        let entry = desc
            .training_input
            .iter()
            .find(|i| i.name == PREDICTED_LABEL_NAME)
            .unwrap();
        assert!(entry.r#type.as_ref().unwrap().is_int64());
    }

    #[test]
    fn all_three_drifts_are_reported_together() {
        let mut model = lowered_model();
        model.is_updatable = false;
        model
            .description
            .as_mut()
            .unwrap()
            .training_input
            .retain(|i| i.name != PREDICTED_LABEL_NAME);
        {
            let update = model
                .classifier_mut()
                .unwrap()
                .update_params
                .as_mut()
                .unwrap();
            let Some(proto::loss_layer::LossLayerType::CategoricalCrossEntropyLossLayer(cce)) =
                &mut update.loss_layers[0].loss_layer_type
            else {
                panic!("expected cce loss");
            };
            cce.target = "wrongField".to_string();
        }

        let notes = patch_spec(&mut model).unwrap();
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn missing_loss_layer_is_fatal() {
        let mut model = lowered_model();
        model
            .classifier_mut()
            .unwrap()
            .update_params
            .as_mut()
            .unwrap()
            .loss_layers
            .clear();

        let err = patch_spec(&mut model).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SpecIntegrity);
    }
}

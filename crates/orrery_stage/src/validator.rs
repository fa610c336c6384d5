//! Stage validation
//!
//! Validates a stage for structural problems before export. The
//! [`StageValidator`] checks for empty stages, inverted frame ranges, time
//! samples outside the frame range, out-of-range display colors, empty
//! references, and selections that name variants a local variant set does
//! not have.

use crate::layer::TimeRange;
use crate::prim::{tokens, Value};
use crate::stage::Stage;

/// Validation error found in a stage
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Stage has no prims
    EmptyStage,
    /// Frame range end precedes its start
    InvertedTimeRange(TimeRange),
    /// A time sample lies outside the stage's frame range
    SampleOutsideTimeRange { prim: String, attribute: String, frame: i64 },
    /// A display color component lies outside [0, 1]
    ColorOutOfRange { prim: String, variant: Option<String> },
    /// A reference has an empty asset path
    EmptyReference(String),
    /// A selection names a variant missing from the prim's own variant set
    UnknownLocalVariant { prim: String, set: String, variant: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyStage => write!(f, "Stage has no prims"),
            ValidationError::InvertedTimeRange(range) => {
                write!(f, "Inverted time range: [{}, {}]", range.start, range.end)
            }
            ValidationError::SampleOutsideTimeRange { prim, attribute, frame } => {
                write!(f, "Sample at frame {} of {}.{} is outside the time range", frame, prim, attribute)
            }
            ValidationError::ColorOutOfRange { prim, variant: Some(v) } => {
                write!(f, "Display color on {} in variant '{}' is outside [0, 1]", prim, v)
            }
            ValidationError::ColorOutOfRange { prim, variant: None } => {
                write!(f, "Display color on {} is outside [0, 1]", prim)
            }
            ValidationError::EmptyReference(prim) => {
                write!(f, "Prim {} has a reference with an empty asset path", prim)
            }
            ValidationError::UnknownLocalVariant { prim, set, variant } => {
                write!(f, "Prim {} selects unknown variant '{}' in set '{}'", prim, variant, set)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Stage validator that checks for common errors
///
/// # Example
/// ```ignore
/// for error in StageValidator::validate(&stage) {
///     log::warn!("Validation error: {}", error);
/// }
/// ```
pub struct StageValidator;

impl StageValidator {
    /// Validate a stage, returning all errors found
    pub fn validate(stage: &Stage) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if stage.is_empty() {
            errors.push(ValidationError::EmptyStage);
        }

        let range = stage.time_range();
        if let Some(r) = range {
            if r.end < r.start {
                errors.push(ValidationError::InvertedTimeRange(r));
            }
        }

        for spec in stage.traverse() {
            let prim = spec.path.to_string();

            for (name, attr) in &spec.attributes {
                if let Some(r) = range {
                    for &frame in attr.time_samples.keys() {
                        if !r.contains(frame) {
                            errors.push(ValidationError::SampleOutsideTimeRange {
                                prim: prim.clone(),
                                attribute: name.clone(),
                                frame,
                            });
                        }
                    }
                }
                if name == tokens::DISPLAY_COLOR && !colors_in_range(attr.default.as_ref()) {
                    errors.push(ValidationError::ColorOutOfRange { prim: prim.clone(), variant: None });
                }
            }

            for set in &spec.variant_sets {
                for variant in &set.variants {
                    let bad = variant.overs.values().any(|attrs| {
                        attrs
                            .get(tokens::DISPLAY_COLOR)
                            .is_some_and(|a| !colors_in_range(a.default.as_ref()))
                    });
                    if bad {
                        errors.push(ValidationError::ColorOutOfRange {
                            prim: prim.clone(),
                            variant: Some(variant.name.clone()),
                        });
                    }
                }
                if let Some(selected) = spec.variant_selection(&set.name) {
                    if set.variant(selected).is_none() {
                        errors.push(ValidationError::UnknownLocalVariant {
                            prim: prim.clone(),
                            set: set.name.clone(),
                            variant: selected.to_string(),
                        });
                    }
                }
            }

            if spec.references.iter().any(|r| r.asset_path.as_os_str().is_empty()) {
                errors.push(ValidationError::EmptyReference(prim.clone()));
            }
        }

        errors
    }

    /// Validate and return Result (Ok if no errors, Err with all errors)
    pub fn validate_or_error(stage: &Stage) -> Result<(), Vec<ValidationError>> {
        let errors = Self::validate(stage);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn colors_in_range(value: Option<&Value>) -> bool {
    match value.and_then(Value::as_colors) {
        Some(colors) => colors.iter().all(|c| c.in_unit_range()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PrimPath;
    use crate::prim::{PrimType, Reference};
    use orrery_math::{Color3, Vec3};

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s).unwrap()
    }

    fn make_valid_stage() -> Stage {
        let mut stage = Stage::new("Valid");
        stage.set_time_range(0, 4);
        let p = path("/MyScene/shape0");
        stage.define_prim(&p, Some(PrimType::Xform)).unwrap();
        stage.add_reference(&p, Reference::new("MySphere.ron", path("/MySphere"))).unwrap();
        let orbit = stage.add_translate_op(&p, "orbit").unwrap();
        for frame in 0..4 {
            stage.set_time_sample(&p, &orbit, frame, Value::Double3(Vec3::X)).unwrap();
        }
        stage
    }

    #[test]
    fn test_valid_stage_returns_no_errors() {
        let errors = StageValidator::validate(&make_valid_stage());
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
        assert!(StageValidator::validate_or_error(&make_valid_stage()).is_ok());
    }

    #[test]
    fn test_empty_stage_error() {
        let errors = StageValidator::validate(&Stage::new("Empty"));
        assert!(errors.contains(&ValidationError::EmptyStage));
    }

    #[test]
    fn test_inverted_time_range() {
        let mut stage = make_valid_stage();
        stage.set_time_range(10, 0);
        let errors = StageValidator::validate(&stage);
        assert!(errors.contains(&ValidationError::InvertedTimeRange(TimeRange::new(10, 0))));
    }

    #[test]
    fn test_sample_outside_time_range() {
        let mut stage = make_valid_stage();
        let p = path("/MyScene/shape0");
        stage
            .set_time_sample(&p, "xformOp:translate:orbit", 99, Value::Double3(Vec3::ZERO))
            .unwrap();
        let errors = StageValidator::validate(&stage);
        assert_eq!(
            errors,
            vec![ValidationError::SampleOutsideTimeRange {
                prim: "/MyScene/shape0".to_string(),
                attribute: "xformOp:translate:orbit".to_string(),
                frame: 99,
            }]
        );
    }

    #[test]
    fn test_color_out_of_range_in_variant() {
        let mut stage = Stage::new("Asset");
        let root = path("/MyCube");
        let mesh = path("/MyCube/MeshData");
        stage.define_prim(&mesh, Some(PrimType::Cube)).unwrap();
        stage.add_variant_set(&root, "ColorsRGB").unwrap();
        stage.add_variant(&root, "ColorsRGB", "Hot").unwrap();
        stage
            .variant_edit(&root, "ColorsRGB", "Hot")
            .unwrap()
            .set_attribute(&mesh, tokens::DISPLAY_COLOR, Value::Color3Array(vec![Color3::new(2.0, 0.0, 0.0)]))
            .unwrap();

        let errors = StageValidator::validate(&stage);
        assert!(errors.contains(&ValidationError::ColorOutOfRange {
            prim: "/MyCube".to_string(),
            variant: Some("Hot".to_string()),
        }));
    }

    #[test]
    fn test_unknown_local_variant_selection() {
        let mut stage = Stage::new("Asset");
        let root = path("/MyCube");
        stage.define_prim(&root, None).unwrap();
        stage.add_variant_set(&root, "ColorsRGB").unwrap();
        stage.add_variant(&root, "ColorsRGB", "Red").unwrap();
        stage.set_variant_selection(&root, "ColorsRGB", "Pink").unwrap();

        let errors = StageValidator::validate(&stage);
        assert!(errors.contains(&ValidationError::UnknownLocalVariant {
            prim: "/MyCube".to_string(),
            set: "ColorsRGB".to_string(),
            variant: "Pink".to_string(),
        }));
    }

    #[test]
    fn test_empty_reference() {
        let mut stage = make_valid_stage();
        let p = path("/MyScene/shape1");
        stage.define_prim(&p, None).unwrap();
        stage.add_reference(&p, Reference::new("", path("/MySphere"))).unwrap();
        let errors = StageValidator::validate(&stage);
        assert!(errors.contains(&ValidationError::EmptyReference("/MyScene/shape1".to_string())));
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(format!("{}", ValidationError::EmptyStage), "Stage has no prims");
        assert!(format!("{}", ValidationError::InvertedTimeRange(TimeRange::new(5, 1))).contains("[5, 1]"));
        assert_eq!(
            format!("{}", ValidationError::EmptyReference("/A".to_string())),
            "Prim /A has a reference with an empty asset path"
        );
    }
}

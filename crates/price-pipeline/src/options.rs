//! Form options derived from the schema

use feature_engine::{FeatureSchema, FieldDependency, FieldKind};
use serde::Serialize;

/// What a form should offer for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOptions {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// Choices in display order (categorical fields)
    pub choices: Vec<String>,
    /// Inclusive bounds (numeric fields)
    pub range: Option<(f64, f64)>,
    /// Narrower choices keyed by another field's value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<FieldDependency>,
}

/// Option lists for every field, in schema order.
///
/// Generated from the loaded schema so offered choices can never drift from
/// what the encoder accepts.
pub fn form_options(schema: &FeatureSchema) -> Vec<FieldOptions> {
    schema
        .describe()
        .iter()
        .map(|field| FieldOptions {
            name: field.name.clone(),
            label: field.display_label().to_string(),
            kind: field.kind,
            choices: field.allowed_values.clone(),
            range: field.numeric_range,
            depends_on: field.depends_on.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FieldSpec;

    #[test]
    fn test_options_follow_schema() {
        let schema = FeatureSchema::new(vec![
            FieldSpec::categorical("transmission", ["Manual", "Automatic"]).with_label("Transmission"),
            FieldSpec::numeric("Kms Driven", Some((100.0, 100_000.0))),
        ])
        .unwrap();

        let options = form_options(&schema);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Transmission");
        assert_eq!(options[0].choices, vec!["Manual", "Automatic"]);
        assert!(options[0].range.is_none());
        assert_eq!(options[1].kind, FieldKind::Numeric);
        assert_eq!(options[1].range, Some((100.0, 100_000.0)));
        assert!(options[1].choices.is_empty());
    }

    #[test]
    fn test_options_carry_dependency() {
        let schema = FeatureSchema::new(vec![
            FieldSpec::categorical("Brand", ["Maruti", "Honda"]),
            FieldSpec::categorical("model", ["Swift", "City"]).depending_on("Brand", [("Honda", vec!["City"])]),
        ])
        .unwrap();

        let options = form_options(&schema);
        assert!(options[0].depends_on.is_none());
        let dep = options[1].depends_on.as_ref().unwrap();
        assert_eq!(dep.field, "Brand");
        assert_eq!(dep.choices["Honda"], vec!["City"]);
        // Full list stays available for brands without an entry
        assert_eq!(options[1].choices, vec!["Swift", "City"]);
    }
}

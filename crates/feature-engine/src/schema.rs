//! Feature Schema
//!
//! The schema is the single source of truth for field order. Every other
//! component looks fields up by name; only the schema knows positions.

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Kind of an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Finite set of named values, label-encoded before scaling
    Categorical,
    /// Real or integer value, passed through unchanged before scaling
    Numeric,
}

impl FieldKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Categorical => "categorical",
            FieldKind::Numeric => "numeric",
        }
    }
}

/// Narrows a categorical field by the value chosen for an earlier one,
/// e.g. the models a brand actually makes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDependency {
    /// Controlling categorical field
    pub field: String,
    /// Controlling value to the values offered with it. Controlling values
    /// without an entry leave the field unrestricted.
    pub choices: BTreeMap<String, Vec<String>>,
}

impl FieldDependency {
    /// Whether `value` may be chosen alongside `parent_value`
    pub fn offers(&self, parent_value: &str, value: &str) -> bool {
        match self.choices.get(parent_value) {
            Some(offered) => offered.iter().any(|v| v == value),
            None => true,
        }
    }
}

/// Declaration of a single input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name used at training time
    pub name: String,
    /// Human-facing label for forms
    #[serde(default)]
    pub label: Option<String>,
    /// Categorical or numeric
    pub kind: FieldKind,
    /// Offered values in display order (categorical only)
    #[serde(default)]
    pub allowed_values: Vec<String>,
    /// Inclusive (min, max) bounds (numeric only)
    #[serde(default)]
    pub numeric_range: Option<(f64, f64)>,
    /// Choices restricted by another field (categorical only)
    #[serde(default)]
    pub depends_on: Option<FieldDependency>,
}

impl FieldSpec {
    /// Create a categorical field
    pub fn categorical<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            label: None,
            kind: FieldKind::Categorical,
            allowed_values: values.into_iter().map(Into::into).collect(),
            numeric_range: None,
            depends_on: None,
        }
    }

    /// Create a numeric field with optional inclusive bounds
    pub fn numeric(name: &str, range: Option<(f64, f64)>) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            kind: FieldKind::Numeric,
            allowed_values: Vec::new(),
            numeric_range: range,
            depends_on: None,
        }
    }

    /// Attach a display label
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Restrict choices by the value of `field`
    pub fn depending_on<I, K, V>(mut self, field: &str, choices: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.depends_on = Some(FieldDependency {
            field: field.to_string(),
            choices: choices
                .into_iter()
                .map(|(k, vs)| (k.into(), vs.into_iter().map(Into::into).collect()))
                .collect(),
        });
        self
    }

    /// Label for display, falling back to the column name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn is_categorical(&self) -> bool {
        self.kind == FieldKind::Categorical
    }

    /// Whether a categorical value is among the allowed values
    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.iter().any(|v| v == value)
    }

    fn check(&self) -> Result<(), FeatureError> {
        if self.name.trim().is_empty() {
            return Err(FeatureError::InvalidSchema("field with empty name".to_string()));
        }

        match self.kind {
            FieldKind::Categorical => {
                if self.allowed_values.is_empty() {
                    return Err(FeatureError::InvalidSchema(format!(
                        "categorical field {} declares no allowed values",
                        self.name
                    )));
                }
                if self.numeric_range.is_some() {
                    return Err(FeatureError::InvalidSchema(format!(
                        "categorical field {} declares a numeric range",
                        self.name
                    )));
                }
                let mut seen = HashSet::with_capacity(self.allowed_values.len());
                for value in &self.allowed_values {
                    if !seen.insert(value.as_str()) {
                        return Err(FeatureError::InvalidSchema(format!(
                            "field {} lists {:?} twice",
                            self.name, value
                        )));
                    }
                }
            }
            FieldKind::Numeric => {
                if !self.allowed_values.is_empty() {
                    return Err(FeatureError::InvalidSchema(format!(
                        "numeric field {} declares allowed values",
                        self.name
                    )));
                }
                if self.depends_on.is_some() {
                    return Err(FeatureError::InvalidSchema(format!(
                        "numeric field {} declares a dependency",
                        self.name
                    )));
                }
                if let Some((min, max)) = self.numeric_range {
                    if !min.is_finite() || !max.is_finite() || min > max {
                        return Err(FeatureError::InvalidSchema(format!(
                            "numeric field {} has invalid range [{}, {}]",
                            self.name, min, max
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Dependencies must name an earlier categorical field and stay within
    /// both fields' allowed values
    fn check_dependency(&self, earlier: &[FieldSpec]) -> Result<(), FeatureError> {
        let Some(dep) = &self.depends_on else {
            return Ok(());
        };

        let parent = earlier
            .iter()
            .find(|f| f.name == dep.field)
            .filter(|f| f.is_categorical())
            .ok_or_else(|| {
                FeatureError::InvalidSchema(format!(
                    "field {} depends on {}, which is not an earlier categorical field",
                    self.name, dep.field
                ))
            })?;

        for (parent_value, offered) in &dep.choices {
            if !parent.allows(parent_value) {
                return Err(FeatureError::InvalidSchema(format!(
                    "field {} maps {:?}, which {} does not allow",
                    self.name, parent_value, parent.name
                )));
            }
            if let Some(value) = offered.iter().find(|v| !self.allows(v)) {
                return Err(FeatureError::InvalidSchema(format!(
                    "field {} offers {:?} with {:?} but does not allow it",
                    self.name, value, parent_value
                )));
            }
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SchemaDef {
    fields: Vec<FieldSpec>,
}

/// Ordered feature schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct FeatureSchema {
    fields: Vec<FieldSpec>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicate or malformed fields
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, FeatureError> {
        if fields.is_empty() {
            return Err(FeatureError::InvalidSchema("schema has no fields".to_string()));
        }

        let mut positions = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            field.check()?;
            field.check_dependency(&fields[..idx])?;
            if positions.insert(field.name.clone(), idx).is_some() {
                return Err(FeatureError::InvalidSchema(format!(
                    "duplicate field {}",
                    field.name
                )));
            }
        }

        Ok(Self { fields, positions })
    }

    /// Ordered field declarations, identical to the training column order
    pub fn describe(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Total feature count
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.positions.get(name).map(|&idx| &self.fields[idx])
    }

    /// Column position of a field
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Allowed values of a categorical field
    pub fn allowed_values(&self, name: &str) -> Option<&[String]> {
        self.field(name)
            .filter(|f| f.is_categorical())
            .map(|f| f.allowed_values.as_slice())
    }

    /// Categorical fields in column order
    pub fn categorical_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_categorical())
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl TryFrom<SchemaDef> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        Self::new(def.fields)
    }
}

impl From<FeatureSchema> for SchemaDef {
    fn from(schema: FeatureSchema) -> Self {
        Self { fields: schema.fields }
    }
}

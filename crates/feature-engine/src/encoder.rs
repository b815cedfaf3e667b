//! Categorical Label Encoding

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Fitted bijection between category strings and integer codes.
///
/// Classes are kept in fitted order and the code of a class is its index,
/// so every code lies in `[0, len - 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build from already-fitted classes
    pub fn new(classes: Vec<String>) -> Result<Self, FeatureError> {
        if classes.is_empty() {
            return Err(FeatureError::InvalidVocabulary("no classes".to_string()));
        }
        if classes.len() > u32::MAX as usize {
            return Err(FeatureError::InvalidVocabulary(format!(
                "{} classes exceed the code space",
                classes.len()
            )));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code as u32).is_some() {
                return Err(FeatureError::InvalidVocabulary(format!(
                    "class {:?} appears twice",
                    class
                )));
            }
        }

        Ok(Self { classes, codes })
    }

    /// Fit from raw observations: unique values in sorted order
    pub fn fit<I, S>(values: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = values.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self::new(classes)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn code(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    pub fn class(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = FeatureError;

    fn try_from(classes: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(classes)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.classes
    }
}

/// Per-field label encoder, immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    vocabularies: BTreeMap<String, Vocabulary>,
}

impl CategoricalEncoder {
    /// Create an encoder from fitted vocabularies
    pub fn new(vocabularies: BTreeMap<String, Vocabulary>) -> Self {
        Self { vocabularies }
    }

    /// Add a fitted vocabulary for a field
    pub fn with_field(mut self, field: &str, vocabulary: Vocabulary) -> Self {
        self.vocabularies.insert(field.to_string(), vocabulary);
        self
    }

    /// Encode a category into its fitted code.
    ///
    /// Unseen values fail with [`FeatureError::UnknownCategory`]; there is no
    /// fallback code.
    pub fn encode(&self, field: &str, value: &str) -> Result<u32, FeatureError> {
        let vocabulary = self
            .vocabularies
            .get(field)
            .ok_or_else(|| FeatureError::UnknownField(field.to_string()))?;

        vocabulary
            .code(value)
            .ok_or_else(|| FeatureError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
    }

    /// Map a code back to its category
    pub fn decode(&self, field: &str, code: u32) -> Option<&str> {
        self.vocabularies.get(field)?.class(code)
    }

    /// Fitted vocabulary of a field
    pub fn vocabulary(&self, field: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(field)
    }

    /// Names of all encoded fields
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.vocabularies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vocabularies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabularies.is_empty()
    }
}

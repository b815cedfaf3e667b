//! Standard Scaling of Assembled Feature Vectors

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct ScalerParams {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Fitted per-feature centering and scaling.
///
/// Applies `(x - mean) / scale` position by position. There is no clipping:
/// values outside the training distribution are scaled like any other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerParams", into = "ScalerParams")]
pub struct NumericScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl NumericScaler {
    /// Create a scaler from fitted parameters
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, FeatureError> {
        if mean.len() != scale.len() {
            return Err(FeatureError::InvalidScaler(format!(
                "{} means but {} scales",
                mean.len(),
                scale.len()
            )));
        }
        if mean.is_empty() {
            return Err(FeatureError::InvalidScaler("no parameters".to_string()));
        }
        if let Some(idx) = mean.iter().position(|m| !m.is_finite()) {
            return Err(FeatureError::InvalidScaler(format!(
                "mean[{}] is not finite",
                idx
            )));
        }
        if let Some(idx) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(FeatureError::InvalidScaler(format!(
                "scale[{}] must be finite and non-zero",
                idx
            )));
        }

        Ok(Self { mean, scale })
    }

    /// Identity scaler (mean 0, scale 1) of the given width
    pub fn identity(len: usize) -> Result<Self, FeatureError> {
        Self::new(vec![0.0; len], vec![1.0; len])
    }

    /// Number of fitted features
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Scale a full feature vector
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, FeatureError> {
        self.check_len(values.len())?;

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }

    fn check_len(&self, actual: usize) -> Result<(), FeatureError> {
        if actual != self.len() {
            return Err(FeatureError::SchemaMismatch {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }
}

impl TryFrom<ScalerParams> for NumericScaler {
    type Error = FeatureError;

    fn try_from(params: ScalerParams) -> Result<Self, Self::Error> {
        Self::new(params.mean, params.scale)
    }
}

impl From<NumericScaler> for ScalerParams {
    fn from(scaler: NumericScaler) -> Self {
        Self {
            mean: scaler.mean,
            scale: scaler.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_transform_standardizes() {
        let scaler = NumericScaler::new(vec![2018.0, 40_000.0], vec![4.0, 20_000.0]).unwrap();
        let out = scaler.transform(&[2022.0, 20_000.0]).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let scaler = NumericScaler::identity(3).unwrap();
        assert_eq!(
            scaler.transform(&[1.0, 2.0]),
            Err(FeatureError::SchemaMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_out_of_distribution_passes_through() {
        let scaler = NumericScaler::new(vec![50_000.0], vec![25_000.0]).unwrap();
        let out = scaler.transform(&[10_000_000.0]).unwrap();
        assert!((out[0] - 398.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(NumericScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(NumericScaler::new(vec![0.0], vec![0.0]).is_err());
        assert!(NumericScaler::new(vec![f64::NAN], vec![1.0]).is_err());
        assert!(NumericScaler::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_deserialize_rejects_zero_scale() {
        let json = r#"{"mean": [1.0, 2.0], "scale": [1.0, 0.0]}"#;
        assert!(serde_json::from_str::<NumericScaler>(json).is_err());
    }

    proptest! {
        #[test]
        fn prop_transform_is_affine_per_feature(
            params in prop::collection::vec((-1e6f64..1e6, 0.001f64..1e5), 1..16),
            seed in -1e7f64..1e7,
        ) {
            let (mean, scale): (Vec<f64>, Vec<f64>) = params.into_iter().unzip();
            let scaler = NumericScaler::new(mean.clone(), scale.clone()).unwrap();
            let input: Vec<f64> = (0..mean.len()).map(|i| seed + i as f64).collect();

            let out = scaler.transform(&input).unwrap();
            prop_assert_eq!(out.len(), input.len());
            for i in 0..input.len() {
                prop_assert_eq!(out[i], (input[i] - mean[i]) / scale[i]);
            }
        }
    }
}

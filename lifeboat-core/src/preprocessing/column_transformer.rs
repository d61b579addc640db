//! Column-wise transformer over the three feature groups
//!
//! Applies a distinct strategy per group: numeric columns are mean-imputed
//! then standard-scaled, ordinal columns are most-frequent-imputed and
//! passed through, categorical columns are most-frequent-imputed then
//! one-hot expanded. Output columns appear in group order: numeric,
//! ordinal, expanded categorical. Anything not named in a group is
//! dropped.

use super::{FeatureGroups, ImputeStrategy, Imputer, OneHotEncoder, Scaler, ScalerType};
use crate::error::{LifeboatError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column transformer; stateless until fit, then carries the learned
/// statistics of every sub-transformer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    groups: FeatureGroups,
    numeric_imputer: Imputer,
    scaler: Scaler,
    ordinal_imputer: Imputer,
    categorical_imputer: Imputer,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnTransformer {
    /// Build a transformer plan over the given feature groups
    pub fn new(groups: FeatureGroups) -> Self {
        Self {
            groups,
            numeric_imputer: Imputer::new(ImputeStrategy::Mean),
            scaler: Scaler::new(ScalerType::Standard),
            ordinal_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            categorical_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    /// Fit every sub-transformer. Encoders and scalers see imputed data,
    /// the same view they will see at transform time.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.groups.is_empty() {
            return Err(LifeboatError::PreprocessingError(
                "no feature groups configured".to_string(),
            ));
        }

        if !self.groups.numeric.is_empty() {
            self.numeric_imputer.fit(df, &self.groups.numeric)?;
            let imputed = self.numeric_imputer.transform(df)?;
            self.scaler.fit(&imputed, &self.groups.numeric)?;
        }

        if !self.groups.ordinal.is_empty() {
            self.ordinal_imputer.fit(df, &self.groups.ordinal)?;
        }

        if !self.groups.categorical.is_empty() {
            self.categorical_imputer.fit(df, &self.groups.categorical)?;
            let imputed = self.categorical_imputer.transform(df)?;
            self.encoder.fit(&imputed, &self.groups.categorical)?;
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a frame into the plan's output columns. Row count is
    /// preserved; column count is `numeric + ordinal + total categories`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(LifeboatError::ModelNotFitted);
        }

        let mut parts: Vec<DataFrame> = Vec::with_capacity(3);

        if !self.groups.numeric.is_empty() {
            let imputed = self.numeric_imputer.transform(df)?;
            let scaled = self.scaler.transform(&imputed)?;
            parts.push(scaled.select(self.groups.numeric.iter().cloned())?);
        }

        if !self.groups.ordinal.is_empty() {
            let imputed = self.ordinal_imputer.transform(df)?;
            parts.push(imputed.select(self.groups.ordinal.iter().cloned())?);
        }

        if !self.groups.categorical.is_empty() {
            let imputed = self.categorical_imputer.transform(df)?;
            let encoded = self.encoder.transform(&imputed)?;
            parts.push(encoded.select(self.encoder.output_columns())?);
        }

        let mut result = parts
            .first()
            .cloned()
            .ok_or_else(|| LifeboatError::PreprocessingError("empty transform".to_string()))?;
        for part in &parts[1..] {
            result = result.hstack(part.get_columns())?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the transformed frame's columns, in output order
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        columns.extend(self.groups.numeric.iter().cloned());
        columns.extend(self.groups.ordinal.iter().cloned());
        columns.extend(self.encoder.output_columns());
        columns
    }

    /// The configured feature groups
    pub fn groups(&self) -> &FeatureGroups {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> FeatureGroups {
        FeatureGroups {
            numeric: vec!["num1".to_string()],
            ordinal: vec!["ord1".to_string()],
            categorical: vec!["cat1".to_string()],
        }
    }

    fn sample() -> DataFrame {
        df!(
            "num1" => &[1.0, 2.0, 3.0, 4.0, 5.0],
            "ord1" => &[1i64, 0, 1, 0, 1],
            "cat1" => &["a", "b", "a", "b", "a"],
        )
        .unwrap()
    }

    #[test]
    fn test_adds_one_column_per_extra_category() {
        // 1 numeric + 1 ordinal + 1 categorical with 2 categories:
        // 3 input columns become 4 output columns, rows unchanged.
        let df = sample();
        let mut transformer = ColumnTransformer::new(groups());
        let result = transformer.fit_transform(&df).unwrap();

        assert_eq!(result.width(), df.width() + 1);
        assert_eq!(result.height(), df.height());
    }

    #[test]
    fn test_output_column_order() {
        let mut transformer = ColumnTransformer::new(groups());
        transformer.fit(&sample()).unwrap();

        assert_eq!(
            transformer.output_columns(),
            vec!["num1", "ord1", "cat10", "cat11"]
        );

        let result = transformer.transform(&sample()).unwrap();
        let names: Vec<String> = result
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, transformer.output_columns());
    }

    #[test]
    fn test_unlisted_columns_dropped() {
        let df = df!(
            "num1" => &[1.0, 2.0],
            "ord1" => &[0i64, 1],
            "cat1" => &["a", "b"],
            "Noise" => &["x", "y"],
        )
        .unwrap();

        let mut transformer = ColumnTransformer::new(groups());
        let result = transformer.fit_transform(&df).unwrap();
        assert!(result.column("Noise").is_err());
    }

    #[test]
    fn test_handles_missing_values() {
        let df = df!(
            "num1" => &[Some(1.0), None, Some(3.0)],
            "ord1" => &[Some(1i64), Some(1), None],
            "cat1" => &[Some("a"), None, Some("b")],
        )
        .unwrap();

        let mut transformer = ColumnTransformer::new(groups());
        let result = transformer.fit_transform(&df).unwrap();

        for col in result.get_columns() {
            assert_eq!(col.null_count(), 0, "{} still has nulls", col.name());
        }
    }

    #[test]
    fn test_missing_group_column_fails() {
        let df = df!("num1" => &[1.0, 2.0]).unwrap();
        let mut transformer = ColumnTransformer::new(groups());
        assert!(matches!(
            transformer.fit(&df),
            Err(LifeboatError::FeatureNotFound(_))
        ));
    }
}

//! One-hot encoding for categorical columns
//!
//! The expansion contract: every observed category of an input column
//! becomes one indicator column named `<column><category-index>`, where the
//! index is the category's position in the lexicographically sorted
//! vocabulary. `Sex` with categories `female`/`male` expands to `Sex0`
//! (female) and `Sex1` (male).

use crate::error::{LifeboatError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder with per-column sorted vocabularies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // (column, sorted categories) in the order columns were given at fit
    vocabularies: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            vocabularies: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the sorted category vocabulary of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.vocabularies.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| LifeboatError::FeatureNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| LifeboatError::DataError(e.to_string()))?;

            let categories: BTreeSet<String> =
                ca.into_iter().flatten().map(String::from).collect();
            if categories.is_empty() {
                return Err(LifeboatError::PreprocessingError(format!(
                    "column {col_name} has no observed categories"
                )));
            }

            self.vocabularies
                .push((col_name.to_string(), categories.into_iter().collect()));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its indicator columns.
    ///
    /// Values unseen during fit map to an all-zero indicator row.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(LifeboatError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, categories) in &self.vocabularies {
            let column = df
                .column(col_name)
                .map_err(|_| LifeboatError::FeatureNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| LifeboatError::DataError(e.to_string()))?;

            for (idx, category) in categories.iter().enumerate() {
                let name = indicator_name(col_name, idx);
                let values: Vec<i32> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1 } else { 0 })
                    .collect();

                result = result
                    .with_column(Series::new(name.into(), values))?
                    .clone();
            }

            result = result.drop(col_name)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Names of the indicator columns, in fit order
    pub fn output_columns(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flat_map(|(col_name, categories)| {
                (0..categories.len()).map(move |idx| indicator_name(col_name, idx))
            })
            .collect()
    }

    /// Sorted vocabulary learned for a column
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.vocabularies
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cats)| cats.as_slice())
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn indicator_name(column: &str, index: usize) -> String {
    format!("{column}{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_columns_three_categories_each() {
        let df = df!(
            "CategoricalFeature1" => &["A", "B", "A", "C", "B"],
            "CategoricalFeature2" => &["X", "Y", "Z", "X", "Y"],
        )
        .unwrap();

        let columns = vec![
            "CategoricalFeature1".to_string(),
            "CategoricalFeature2".to_string(),
        ];
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &columns).unwrap();

        assert_eq!(
            encoder.output_columns(),
            vec![
                "CategoricalFeature10",
                "CategoricalFeature11",
                "CategoricalFeature12",
                "CategoricalFeature20",
                "CategoricalFeature21",
                "CategoricalFeature22",
            ]
        );
    }

    #[test]
    fn test_indicator_values() {
        let df = df!("Sex" => &["male", "female", "male"]).unwrap();

        let mut encoder = OneHotEncoder::new();
        let result = encoder.fit_transform(&df, &["Sex".to_string()]).unwrap();

        // Sorted vocabulary: female = 0, male = 1
        assert!(result.column("Sex").is_err());
        let female = result.column("Sex0").unwrap().i32().unwrap();
        let male = result.column("Sex1").unwrap().i32().unwrap();
        assert_eq!(female.get(0), Some(0));
        assert_eq!(male.get(0), Some(1));
        assert_eq!(female.get(1), Some(1));
        assert_eq!(male.get(1), Some(0));
    }

    #[test]
    fn test_unknown_category_is_all_zero() {
        let train = df!("port" => &["C", "S"]).unwrap();
        let test = df!("port" => &["Q"]).unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["port".to_string()]).unwrap();
        let result = encoder.transform(&test).unwrap();

        assert_eq!(result.column("port0").unwrap().i32().unwrap().get(0), Some(0));
        assert_eq!(result.column("port1").unwrap().i32().unwrap().get(0), Some(0));
    }

    #[test]
    fn test_categories_sorted() {
        let df = df!("c" => &["b", "a", "c", "a"]).unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["c".to_string()]).unwrap();

        assert_eq!(
            encoder.categories("c").unwrap(),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = df!("c" => &["a"]).unwrap();
        let encoder = OneHotEncoder::new();
        assert!(matches!(
            encoder.transform(&df),
            Err(LifeboatError::ModelNotFitted)
        ));
    }
}

//! Feature engineering for the raw passenger data
//!
//! Derives `FamilySize` (sum of the sibling/spouse and parent/child counts)
//! and the `IsAlone` flag, and drops the identifier/free-text columns the
//! models never see. All derivations fail fast when a required column is
//! missing — partial frames never leave this module.

use crate::error::{LifeboatError, Result};
use polars::prelude::*;

/// Identifier and free-text columns removed before preprocessing
pub const DROPPED_COLUMNS: [&str; 4] = ["Cabin", "PassengerId", "Name", "Ticket"];

const SIBLINGS_SPOUSES: &str = "SibSp";
const PARENTS_CHILDREN: &str = "Parch";

/// Derived column: `SibSp + Parch`
pub const FAMILY_SIZE: &str = "FamilySize";
/// Derived flag: 1 when `FamilySize` is zero, 0 otherwise
pub const IS_ALONE: &str = "IsAlone";

/// Drop identifier columns and add the derived family features.
///
/// Requires `Cabin`, `PassengerId`, `Name`, `Ticket`, `SibSp` and `Parch`
/// to be present.
pub fn engineer_features(df: &DataFrame) -> Result<DataFrame> {
    for required in DROPPED_COLUMNS
        .iter()
        .copied()
        .chain([SIBLINGS_SPOUSES, PARENTS_CHILDREN])
    {
        if df.column(required).is_err() {
            return Err(LifeboatError::FeatureNotFound(required.to_string()));
        }
    }

    let siblings = integer_values(df, SIBLINGS_SPOUSES)?;
    let parents = integer_values(df, PARENTS_CHILDREN)?;

    let family_size: Vec<i64> = siblings
        .iter()
        .zip(parents.iter())
        .map(|(s, p)| s + p)
        .collect();
    let is_alone: Vec<i64> = family_size
        .iter()
        .map(|&n| if n == 0 { 1 } else { 0 })
        .collect();

    let mut result = df.clone();
    for dropped in DROPPED_COLUMNS {
        result = result.drop(dropped)?;
    }
    result = result
        .with_column(Series::new(FAMILY_SIZE.into(), family_size))?
        .clone();
    result = result
        .with_column(Series::new(IS_ALONE.into(), is_alone))?
        .clone();

    Ok(result)
}

/// Split an engineered frame into features and a float target vector.
pub fn split_features(df: &DataFrame, target: &str) -> Result<(DataFrame, ndarray::Array1<f64>)> {
    let target_series = df
        .column(target)
        .map_err(|_| LifeboatError::FeatureNotFound(target.to_string()))?
        .as_materialized_series()
        .clone();

    let y: ndarray::Array1<f64> = target_series
        .cast(&DataType::Float64)?
        .f64()
        .map_err(|e| LifeboatError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    let features = df.drop(target)?;
    Ok((features, y))
}

/// Nulls count as zero relatives, matching the raw data's encoding of
/// passengers traveling alone.
fn integer_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int64)
        .map_err(|_| {
            LifeboatError::DataError(format!("column {name} is not integer-valued"))
        })?
        .i64()
        .map_err(|e| LifeboatError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_passengers() -> DataFrame {
        df!(
            "PassengerId" => &[1i64, 2, 3],
            "Name" => &["Braund", "Cumings", "Heikkinen"],
            "Ticket" => &["A/5 21171", "PC 17599", "STON/O2"],
            "Cabin" => &[None, Some("C85"), None::<&str>],
            "Survived" => &[0i64, 1, 1],
            "Pclass" => &[3i64, 1, 3],
            "Sex" => &["male", "female", "female"],
            "Age" => &[22.0, 38.0, 26.0],
            "SibSp" => &[1i64, 1, 0],
            "Parch" => &[0i64, 0, 0],
            "Fare" => &[7.25, 71.2833, 7.925],
        )
        .unwrap()
    }

    #[test]
    fn test_derived_columns() {
        let engineered = engineer_features(&raw_passengers()).unwrap();

        let family = engineered.column(FAMILY_SIZE).unwrap().i64().unwrap();
        assert_eq!(family.get(0), Some(1));
        assert_eq!(family.get(2), Some(0));

        let alone = engineered.column(IS_ALONE).unwrap().i64().unwrap();
        assert_eq!(alone.get(0), Some(0));
        assert_eq!(alone.get(2), Some(1));
    }

    #[test]
    fn test_identifier_columns_dropped() {
        let engineered = engineer_features(&raw_passengers()).unwrap();
        for dropped in DROPPED_COLUMNS {
            assert!(engineered.column(dropped).is_err(), "{dropped} should be gone");
        }
        // Model columns survive
        assert!(engineered.column("Sex").is_ok());
        assert!(engineered.column("Age").is_ok());
    }

    #[test]
    fn test_missing_required_column_fails() {
        let df = raw_passengers().drop("Ticket").unwrap();
        let err = engineer_features(&df).unwrap_err();
        assert!(matches!(err, LifeboatError::FeatureNotFound(name) if name == "Ticket"));
    }

    #[test]
    fn test_split_features() {
        let engineered = engineer_features(&raw_passengers()).unwrap();
        let (x, y) = split_features(&engineered, "Survived").unwrap();

        assert!(x.column("Survived").is_err());
        assert_eq!(y.len(), 3);
        assert_eq!(y[0], 0.0);
        assert_eq!(y[1], 1.0);
    }
}

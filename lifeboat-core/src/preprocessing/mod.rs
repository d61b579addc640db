//! Column-wise preprocessing
//!
//! The transformer plan mirrors the workflow's three feature groups:
//! numeric columns are imputed and scaled, ordinal columns are imputed and
//! passed through, categorical columns are imputed and one-hot expanded.

mod column_transformer;
mod encoder;
mod imputer;
mod scaler;
mod selection;

pub use column_transformer::ColumnTransformer;
pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::{Scaler, ScalerType};
pub use selection::SelectKBest;

use serde::{Deserialize, Serialize};

/// The three disjoint column groups a transformer plan is built from.
///
/// Groups come from configuration; nothing here inspects dtypes to guess
/// membership.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroups {
    pub numeric: Vec<String>,
    pub ordinal: Vec<String>,
    pub categorical: Vec<String>,
}

impl FeatureGroups {
    /// All configured column names, in group order
    pub fn all_columns(&self) -> Vec<String> {
        self.numeric
            .iter()
            .chain(self.ordinal.iter())
            .chain(self.categorical.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.ordinal.is_empty() && self.categorical.is_empty()
    }
}

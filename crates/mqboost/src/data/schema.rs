//! Feature schema: per-column name and logical type.

use std::collections::HashMap;

/// Logical feature types.
///
/// Values are stored as `f32` regardless of type. Categorical features hold
/// non-negative integer category codes (`0.0, 1.0, 2.0, ...`); missing values
/// are `f32::NAN` for both kinds.
///
/// The type is metadata only: it travels with the schema through stacking,
/// but the native engine splits categorical codes as ordinal values, exactly
/// like numeric columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FeatureType {
    #[default]
    Numeric,
    Categorical,
}

impl FeatureType {
    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureType::Categorical)
    }
}

/// Metadata for a single column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureMeta {
    /// Column name. Unnamed columns never match a name lookup.
    pub name: Option<String>,
    pub feature_type: FeatureType,
}

impl FeatureMeta {
    pub fn numeric() -> Self {
        Self::default()
    }

    pub fn numeric_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            feature_type: FeatureType::Numeric,
        }
    }

    pub fn categorical_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            feature_type: FeatureType::Categorical,
        }
    }

    /// Column name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Schema describing the columns of a [`FeatureFrame`](super::FeatureFrame).
#[derive(Clone, Debug, Default)]
pub struct DatasetSchema {
    features: Vec<FeatureMeta>,
    /// Name → index; unnamed columns are absent.
    name_index: HashMap<String, usize>,
}

impl PartialEq for DatasetSchema {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features
    }
}

impl DatasetSchema {
    /// Build a schema from column metadata.
    ///
    /// Returns the first duplicated name as `Err` if two columns share one.
    pub fn from_features(features: Vec<FeatureMeta>) -> Result<Self, String> {
        let mut name_index = HashMap::with_capacity(features.len());
        for (idx, meta) in features.iter().enumerate() {
            if let Some(name) = meta.name() {
                if name_index.insert(name.to_string(), idx).is_some() {
                    return Err(name.to_string());
                }
            }
        }
        Ok(Self {
            features,
            name_index,
        })
    }

    /// Schema with `n_features` unnamed numeric columns.
    pub fn all_numeric(n_features: usize) -> Self {
        Self {
            features: vec![FeatureMeta::numeric(); n_features],
            name_index: HashMap::new(),
        }
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn get(&self, index: usize) -> Option<&FeatureMeta> {
        self.features.get(index)
    }

    pub fn feature_type(&self, index: usize) -> FeatureType {
        self.features
            .get(index)
            .map(|m| m.feature_type)
            .unwrap_or_default()
    }

    /// Column index for a name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureMeta> {
        self.features.iter()
    }

    /// A copy of this schema with one more column appended.
    pub(crate) fn with_appended(&self, meta: FeatureMeta) -> Result<Self, String> {
        let mut features = self.features.clone();
        features.push(meta);
        Self::from_features(features)
    }

    /// A copy of this schema without the column at `index`.
    pub(crate) fn without(&self, index: usize) -> Self {
        let features = self
            .features
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, m)| m.clone())
            .collect();
        // Removing a column cannot introduce a duplicate name.
        Self::from_features(features).unwrap_or_default()
    }
}

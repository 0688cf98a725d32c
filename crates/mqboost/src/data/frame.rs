//! Feature frame container and builder.

use std::ops::Range;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis, s};

use super::schema::{DatasetSchema, FeatureMeta};
use crate::error::ValidationError;

/// A table of N rows and C columns, numeric or categorical.
///
/// # Storage Layout
///
/// Values are stored **feature-major**: `[n_columns, n_rows]`. Each column's
/// values are contiguous, which makes block replication and per-feature split
/// search cheap.
///
/// # Construction
///
/// - [`FeatureFrame::builder`] for named, mixed-type columns
/// - [`FeatureFrame::from_samples`] for a sample-major `[n_rows, n_columns]` matrix
/// - [`FeatureFrame::from_vector`] for a single column
///
/// # Example
///
/// ```
/// use mqboost::data::FeatureFrame;
/// use ndarray::array;
///
/// let frame = FeatureFrame::builder()
///     .add_numeric("age", array![25.0, 30.0, 35.0].view())
///     .add_categorical("color", array![0.0, 1.0, 2.0].view())
///     .build()
///     .unwrap();
///
/// assert_eq!(frame.n_rows(), 3);
/// assert_eq!(frame.n_columns(), 2);
/// assert_eq!(frame.column("age").unwrap()[1], 30.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    /// `[n_columns, n_rows]`.
    features: Array2<f32>,
    schema: DatasetSchema,
}

impl FeatureFrame {
    /// Create a frame from feature-major values and a matching schema.
    pub fn new(features: Array2<f32>, schema: DatasetSchema) -> Result<Self, ValidationError> {
        if schema.n_features() != features.nrows() {
            return Err(ValidationError::ShapeMismatch {
                field: "schema",
                expected: features.nrows(),
                got: schema.n_features(),
            });
        }
        Ok(Self { features, schema })
    }

    /// Create a frame of unnamed numeric columns from a sample-major matrix.
    pub fn from_samples(samples: ArrayView2<f32>) -> Self {
        let features = samples.t().as_standard_layout().into_owned();
        let schema = DatasetSchema::all_numeric(features.nrows());
        Self { features, schema }
    }

    /// Create a single unnamed numeric column.
    pub fn from_vector(values: ArrayView1<f32>) -> Self {
        let features = values.insert_axis(Axis(0)).to_owned();
        Self {
            features,
            schema: DatasetSchema::all_numeric(1),
        }
    }

    pub fn builder() -> FrameBuilder {
        FrameBuilder::default()
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.features.nrows()
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    /// Feature-major view `[n_columns, n_rows]`.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Values of the column at `index`.
    ///
    /// # Panics
    ///
    /// If `index >= n_columns()`.
    pub fn column_at(&self, index: usize) -> ArrayView1<'_, f32> {
        self.features.row(index)
    }

    /// Values of the column called `name`.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f32>> {
        self.schema.index_of(name).map(|idx| self.features.row(idx))
    }

    /// Copy of the rows in `rows`, all columns kept.
    pub fn slice_rows(&self, rows: Range<usize>) -> FeatureFrame {
        Self {
            features: self.features.slice(s![.., rows]).to_owned(),
            schema: self.schema.clone(),
        }
    }

    /// Copy of this frame without the column at `index`.
    pub(crate) fn drop_column(&self, index: usize) -> FeatureFrame {
        let kept: Vec<usize> = (0..self.n_columns()).filter(|&c| c != index).collect();
        Self {
            features: self.features.select(Axis(0), &kept),
            schema: self.schema.without(index),
        }
    }

    pub(crate) fn from_parts(features: Array2<f32>, schema: DatasetSchema) -> Self {
        debug_assert_eq!(features.nrows(), schema.n_features());
        Self { features, schema }
    }
}

/// Builder for frames with named and typed columns.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    columns: Vec<Vec<f32>>,
    metas: Vec<FeatureMeta>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric column.
    pub fn add_numeric(mut self, name: &str, values: ArrayView1<f32>) -> Self {
        self.columns.push(values.to_vec());
        self.metas.push(FeatureMeta::numeric_named(name));
        self
    }

    /// Add a categorical column.
    ///
    /// Values are non-negative integer codes encoded as floats.
    pub fn add_categorical(mut self, name: &str, codes: ArrayView1<f32>) -> Self {
        self.columns.push(codes.to_vec());
        self.metas.push(FeatureMeta::categorical_named(name));
        self
    }

    /// Build the frame.
    ///
    /// # Errors
    ///
    /// - no columns were added
    /// - columns have different lengths
    /// - two columns share a name
    pub fn build(self) -> Result<FeatureFrame, ValidationError> {
        let Some(first) = self.columns.first() else {
            return Err(ValidationError::EmptyFrame);
        };
        let n_rows = first.len();
        let n_columns = self.columns.len();

        if let Some(bad) = self.columns.iter().find(|c| c.len() != n_rows) {
            return Err(ValidationError::ShapeMismatch {
                field: "features",
                expected: n_rows,
                got: bad.len(),
            });
        }

        let schema =
            DatasetSchema::from_features(self.metas).map_err(ValidationError::DuplicateColumn)?;

        let flat: Vec<f32> = self.columns.into_iter().flatten().collect();
        let features = Array2::from_shape_vec((n_columns, n_rows), flat).map_err(|_| {
            ValidationError::ShapeMismatch {
                field: "features",
                expected: n_columns * n_rows,
                got: 0,
            }
        })?;

        Ok(FeatureFrame { features, schema })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn from_samples_transposes() {
        // 3 rows, 2 columns, sample-major
        let samples = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let frame = FeatureFrame::from_samples(samples.view());

        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.n_columns(), 2);
        assert_eq!(frame.column_at(1).to_vec(), vec![10.0, 20.0, 30.0]);
        assert!(frame.column("0").is_none());
    }

    #[test]
    fn from_vector_is_single_column() {
        let frame = FeatureFrame::from_vector(array![4.0, 5.0].view());
        assert_eq!(frame.n_columns(), 1);
        assert_eq!(frame.column_at(0).to_vec(), vec![4.0, 5.0]);
    }

    #[test]
    fn builder_rejects_ragged_columns() {
        let err = FeatureFrame::builder()
            .add_numeric("a", array![1.0, 2.0].view())
            .add_numeric("b", array![1.0].view())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ShapeMismatch {
                field: "features",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn builder_rejects_duplicate_names() {
        let err = FeatureFrame::builder()
            .add_numeric("a", array![1.0].view())
            .add_categorical("a", array![0.0].view())
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateColumn("a".into()));
    }

    #[test]
    fn builder_rejects_empty() {
        assert_eq!(FeatureFrame::builder().build(), Err(ValidationError::EmptyFrame));
    }

    #[test]
    fn slice_and_drop() {
        let frame = FeatureFrame::builder()
            .add_numeric("a", array![1.0, 2.0, 3.0].view())
            .add_numeric("b", array![4.0, 5.0, 6.0].view())
            .build()
            .unwrap();

        let middle = frame.slice_rows(1..2);
        assert_eq!(middle.n_rows(), 1);
        assert_eq!(middle.column("b").unwrap()[0], 5.0);

        let only_b = frame.drop_column(0);
        assert_eq!(only_b.n_columns(), 1);
        assert_eq!(only_b.schema().index_of("b"), Some(0));
    }

    #[test]
    fn new_checks_schema_width() {
        let values = Array2::<f32>::zeros((2, 3));
        assert!(FeatureFrame::new(values.clone(), DatasetSchema::all_numeric(2)).is_ok());
        assert!(FeatureFrame::new(values, DatasetSchema::all_numeric(3)).is_err());
    }
}

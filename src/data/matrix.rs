//! Dense row-major observation matrix.

use super::dataset::DatasetError;

/// Dense row-major matrix of `f64` observations.
///
/// One row per sample, one column per feature. All features are pre-encoded
/// as doubles; there is no missing-value handling.
///
/// The storage generic allows zero-copy views over borrowed slices as well as
/// owned allocations.
///
/// # Example
///
/// ```
/// use arbor::data::DenseMatrix;
///
/// let m = DenseMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
/// assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
/// assert_eq!(m.value(0, 2), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<S: AsRef<[f64]> = Box<[f64]>> {
    data: S,
    num_rows: usize,
    num_cols: usize,
}

/// Borrowed view of a [`DenseMatrix`].
pub type MatrixView<'a> = DenseMatrix<&'a [f64]>;

// =============================================================================
// Constructors
// =============================================================================

impl DenseMatrix<Box<[f64]>> {
    /// Create a matrix from row-major data, taking ownership.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_cols`.
    pub fn from_vec(data: Vec<f64>, num_rows: usize, num_cols: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_cols,
            "Data length {} does not match dimensions {}x{}",
            data.len(),
            num_rows,
            num_cols
        );
        Self {
            data: data.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Create a matrix from a list of rows.
    ///
    /// Fails if the rows do not all have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, DatasetError> {
        let num_cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * num_cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != num_cols {
                return Err(DatasetError::RaggedRow {
                    row,
                    expected: num_cols,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self {
            data: data.into_boxed_slice(),
            num_rows: rows.len(),
            num_cols,
        })
    }

    /// Create a matrix from feature columns.
    ///
    /// Fails if the columns do not all have the same length.
    pub fn from_columns<C: AsRef<[f64]>>(columns: &[C]) -> Result<Self, DatasetError> {
        let num_rows = columns.first().map_or(0, |c| c.as_ref().len());
        for (feature, values) in columns.iter().enumerate() {
            if values.as_ref().len() != num_rows {
                return Err(DatasetError::RaggedColumn {
                    feature,
                    expected: num_rows,
                    got: values.as_ref().len(),
                });
            }
        }
        let num_cols = columns.len();
        let mut data = vec![0.0; num_rows * num_cols];
        for (col, values) in columns.iter().enumerate() {
            for (row, &v) in values.as_ref().iter().enumerate() {
                data[row * num_cols + col] = v;
            }
        }
        Ok(Self::from_vec(data, num_rows, num_cols))
    }
}

impl<'a> DenseMatrix<&'a [f64]> {
    /// Create a borrowed view from a row-major slice.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_cols`.
    pub fn from_slice(data: &'a [f64], num_rows: usize, num_cols: usize) -> Self {
        DenseMatrix::new(data, num_rows, num_cols)
    }
}

impl<S: AsRef<[f64]>> DenseMatrix<S> {
    /// Create a matrix from storage.
    ///
    /// # Panics
    ///
    /// Panics if `storage.as_ref().len() != num_rows * num_cols`.
    pub fn new(storage: S, num_rows: usize, num_cols: usize) -> Self {
        assert_eq!(
            storage.as_ref().len(),
            num_rows * num_cols,
            "Storage length {} does not match dimensions {}x{}",
            storage.as_ref().len(),
            num_rows,
            num_cols
        );
        Self {
            data: storage,
            num_rows,
            num_cols,
        }
    }

    /// Borrow as a [`MatrixView`].
    #[inline]
    pub fn view(&self) -> MatrixView<'_> {
        DenseMatrix {
            data: self.data.as_ref(),
            num_rows: self.num_rows,
            num_cols: self.num_cols,
        }
    }

    /// Underlying row-major data.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.data.as_ref()
    }

    /// Number of rows (samples).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (features).
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Element at (row, col), or `None` if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }
        Some(self.data.as_ref()[row * self.num_cols + col])
    }

    /// Element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if out of bounds.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        debug_assert!(col < self.num_cols, "column {col} out of bounds");
        self.data.as_ref()[row * self.num_cols + col]
    }

    /// Row `i` as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= num_rows()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.num_cols;
        &self.data.as_ref()[start..start + self.num_cols]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.num_rows).map(move |i| self.row(i))
    }

    /// Iterate over the values of column `col`, top to bottom.
    pub fn column(&self, col: usize) -> impl ExactSizeIterator<Item = f64> + '_ {
        let data = self.data.as_ref();
        let stride = self.num_cols;
        (0..self.num_rows).map(move |row| data[row * stride + col])
    }
}

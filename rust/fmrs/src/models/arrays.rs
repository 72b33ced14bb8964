use crate::errors::{
    FmrsError,
    Result,
};

/// Simple row-major 2D array of `f64`.
///
/// `values` is a flattened array of values,
/// `ncols` is the number of values in each row,
/// `nrows` is the number of rows.
///
/// Values that belong to the same row are adjacent in memory, so row
/// access is a slice while column access is a strided iterator.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2D {
    values: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl Array2D {
    pub fn new<S: AsRef<[f64]>, C: AsRef<[S]>>(rows: C) -> Result<Array2D> {
        let nrows = rows.as_ref().len();
        let ncols = rows.as_ref().first().map(|r| r.as_ref().len()).unwrap_or(0);

        let mut values = Vec::with_capacity(nrows * ncols);
        for (i, row) in rows.as_ref().iter().enumerate() {
            if row.as_ref().len() != ncols {
                return Err(FmrsError::DimensionMismatch {
                    expected: ncols,
                    found: row.as_ref().len(),
                    context: format!("row {} has a different number of columns", i),
                });
            }
            values.extend_from_slice(row.as_ref());
        }

        Ok(Array2D {
            values,
            nrows,
            ncols,
        })
    }

    pub fn from_flat_vector(values: Vec<f64>, nrows: usize, ncols: usize) -> Result<Array2D> {
        if values.len() != nrows * ncols {
            return Err(FmrsError::DimensionMismatch {
                expected: nrows * ncols,
                found: values.len(),
                context: "flat vector does not match the requested shape".to_string(),
            });
        }
        Ok(Array2D {
            values,
            nrows,
            ncols,
        })
    }

    pub fn filled(nrows: usize, ncols: usize, value: f64) -> Array2D {
        Array2D {
            values: vec![value; nrows * ncols],
            nrows,
            ncols,
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        Some(self.values[row * self.ncols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.nrows && col < self.ncols, "index out of bounds");
        self.values[row * self.ncols + col] = value;
    }

    pub fn get_row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.nrows {
            return None;
        }
        let start = row * self.ncols;
        Some(&self.values[start..start + self.ncols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks(0)` panics, an array without columns yields empty rows.
        let step = self.ncols.max(1);
        self.values
            .chunks(step)
            .chain(std::iter::repeat::<&[f64]>(&[]))
            .take(self.nrows)
    }

    /// Copies column `col` into a new vector.
    ///
    /// ```
    /// use fmrs::models::Array2D;
    /// let array = Array2D::new(vec![vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
    /// assert_eq!(array.column(1).unwrap(), vec![2., 5.]);
    /// assert!(array.column(3).is_none());
    /// ```
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.ncols {
            return None;
        }
        Some(
            self.values
                .iter()
                .skip(col)
                .step_by(self.ncols)
                .copied()
                .collect(),
        )
    }

    pub fn transpose(&self) -> Array2D {
        let mut out = Array2D::filled(self.ncols, self.nrows, 0.0);
        for r in 0..self.nrows {
            for c in 0..self.ncols {
                out.values[c * self.nrows + r] = self.values[r * self.ncols + c];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array2d_shape() {
        let array = Array2D::new(vec![vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
        assert_eq!(array.nrows(), 2);
        assert_eq!(array.ncols(), 3);
        assert_eq!(array.get(1, 2), Some(6.));
        assert_eq!(array.get(2, 0), None);
        assert_eq!(array.get_row(0).unwrap(), &[1., 2., 3.]);
    }

    #[test]
    fn test_array2d_ragged_rows() {
        let res = Array2D::new(vec![vec![1., 2.], vec![3.]]);
        assert!(matches!(res, Err(FmrsError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_array2d_transpose() {
        let array = Array2D::new(vec![vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
        let t = array.transpose();
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.get_row(2).unwrap(), &[3., 6.]);
        assert_eq!(t.transpose(), array);
    }

    #[test]
    fn test_iter_rows() {
        let array = Array2D::from_flat_vector(vec![1., 2., 3., 4.], 2, 2).unwrap();
        let rows: Vec<_> = array.iter_rows().collect();
        assert_eq!(rows, vec![&[1., 2.][..], &[3., 4.][..]]);
        assert!(Array2D::from_flat_vector(vec![1.], 2, 2).is_err());
    }
}

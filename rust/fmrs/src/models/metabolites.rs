use crate::errors::{
    FmrsError,
    Result,
};
use crate::models::Array2D;

/// Leading columns of every quantification row that carry metadata rather
/// than metabolite concentrations.
pub const RESERVED_COLUMNS: usize = 3;

/// One row of quantification output for a single window.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantifiedRow {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

/// Metabolite-by-time table.
///
/// Rows are post-averaging time samples, columns follow `names`. The first
/// [`RESERVED_COLUMNS`] columns are kept for output but never correlated.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaboliteMatrix {
    names: Vec<String>,
    data: Array2D,
}

impl MetaboliteMatrix {
    pub fn new(names: Vec<String>, data: Array2D) -> Result<Self> {
        if data.nrows() > 0 && names.len() != data.ncols() {
            return Err(FmrsError::DimensionMismatch {
                expected: names.len(),
                found: data.ncols(),
                context: "metabolite names vs. data columns".to_string(),
            });
        }
        Ok(Self { names, data })
    }

    /// Stacks rows produced window by window.
    ///
    /// Every row must carry the same header as the first one.
    pub fn from_rows(rows: Vec<QuantifiedRow>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(FmrsError::DimensionMismatch {
                expected: 1,
                found: 0,
                context: "no quantification rows".to_string(),
            });
        };
        let names = first.names.clone();
        for (i, row) in rows.iter().enumerate() {
            if row.names != names {
                return Err(FmrsError::DimensionMismatch {
                    expected: names.len(),
                    found: row.names.len(),
                    context: format!("header of row {} differs from the first row", i + 1),
                });
            }
        }
        let values: Vec<&[f64]> = rows.iter().map(|r| r.values.as_slice()).collect();
        let data = Array2D::new(values)?;
        Self::new(names, data)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names of the columns taking part in the correlation.
    pub fn metabolite_names(&self) -> &[String] {
        let start = RESERVED_COLUMNS.min(self.names.len());
        &self.names[start..]
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_metabolites(&self) -> usize {
        self.names.len().saturating_sub(RESERVED_COLUMNS)
    }

    pub fn data(&self) -> &Array2D {
        &self.data
    }

    /// Time series of the `i`-th metabolite (0-based, reserved columns skipped).
    pub fn metabolite(&self, i: usize) -> Option<Vec<f64>> {
        self.data.column(RESERVED_COLUMNS + i)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter_rows()
    }
}

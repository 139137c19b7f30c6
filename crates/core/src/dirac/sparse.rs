//! Compressed sparse row storage

use nalgebra::{Complex, DVector};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Complex matrix in CSR form
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_cols: usize,
    row_offsets: Vec<usize>,
    columns: Vec<usize>,
    values: Vec<Complex<f64>>,
}

impl CsrMatrix {
    /// Build from per-row accumulators
    ///
    /// Each row's entries are sorted by column. Entries that cancelled to exactly zero
    /// are dropped.
    pub fn from_rows(n_cols: usize, rows: Vec<FxHashMap<usize, Complex<f64>>>) -> Self {
        let mut row_offsets = Vec::with_capacity(rows.len() + 1);
        let mut columns = Vec::new();
        let mut values = Vec::new();
        row_offsets.push(0);

        for row in rows {
            let mut entries: Vec<(usize, Complex<f64>)> = row
                .into_iter()
                .filter(|(_, value)| value.norm_sqr() > 0.0)
                .collect();
            entries.sort_unstable_by_key(|&(column, _)| column);
            for (column, value) in entries {
                debug_assert!(column < n_cols, "column {column} out of range");
                columns.push(column);
                values.push(value);
            }
            row_offsets.push(columns.len());
        }

        Self {
            n_cols,
            row_offsets,
            columns,
            values,
        }
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.row_offsets.len() - 1
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Entry at (row, column), zero if not stored
    pub fn get(&self, row: usize, column: usize) -> Complex<f64> {
        let range = self.row_offsets[row]..self.row_offsets[row + 1];
        match self.columns[range.clone()].binary_search(&column) {
            Ok(offset) => self.values[range.start + offset],
            Err(_) => Complex::new(0.0, 0.0),
        }
    }

    /// `y = A x`, rows in parallel
    ///
    /// `x` must have `n_cols` entries.
    pub fn spmv(&self, x: &DVector<Complex<f64>>) -> DVector<Complex<f64>> {
        debug_assert_eq!(x.len(), self.n_cols);
        let y: Vec<Complex<f64>> = (0..self.n_rows())
            .into_par_iter()
            .map(|row| {
                let range = self.row_offsets[row]..self.row_offsets[row + 1];
                self.columns[range.clone()]
                    .iter()
                    .zip(&self.values[range])
                    .map(|(&column, value)| value * x[column])
                    .sum()
            })
            .collect();
        DVector::from_vec(y)
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column-wise standardization (`(x - mean) / std`).
///
/// Population standard deviation is used; a constant column gets a scale of
/// `1.0` so it maps to zero instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major samples.
    ///
    /// # Arguments
    /// * `rows` - samples, every row the same width
    ///
    /// # Returns
    /// * `Result<Self>` - fails on an empty sample set or ragged rows
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::InvalidConfig("cannot fit scaler on zero samples".to_string()))?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::InvalidConfig("scaler rows have different widths".to_string()));
        }
        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in rows {
            for ((acc, v), m) in var.iter_mut().zip(row).zip(&mean) {
                let d = v - m;
                *acc += d * d;
            }
        }
        let scale = var
            .into_iter()
            .map(|acc| {
                let std = (acc / n).sqrt();
                if std > f64::EPSILON { std } else { 1.0 }
            })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.width() {
            return Err(Error::DimensionMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}

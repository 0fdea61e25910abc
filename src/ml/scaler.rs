//! Per-feature standardization: `(x - mean) / scale`

use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    /// Standard deviation, or 1.0 when the column is constant
    pub scale: f64,
}

impl ColumnStats {
    /// `None` for an empty column
    pub fn fit<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        Some(ColumnStats {
            mean,
            scale: if std > f64::EPSILON { std } else { 1.0 },
        })
    }

    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// A fitted standardization transform over named features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on rows that all have one value per feature name
    pub fn fit<R: AsRef<[f64]>>(feature_names: &[&str], rows: &[R]) -> Result<Self> {
        if rows.is_empty() {
            return Err(StatsError::EmptyDataset("no rows to fit the scaler on".to_string()));
        }
        let dims = feature_names.len();
        if let Some(bad) = rows.iter().position(|r| r.as_ref().len() != dims) {
            return Err(StatsError::Model(format!(
                "row {} has {} values, expected {}",
                bad + 1,
                rows[bad].as_ref().len(),
                dims
            )));
        }

        let mut mean = Vec::with_capacity(dims);
        let mut scale = Vec::with_capacity(dims);
        for col in 0..dims {
            let stats = ColumnStats::fit(rows.iter().map(|r| r.as_ref()[col]))
                .ok_or_else(|| StatsError::EmptyDataset(feature_names[col].to_string()))?;
            mean.push(stats.mean);
            scale.push(stats.scale);
        }

        Ok(StandardScaler {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            mean,
            scale,
        })
    }

    /// Standardize one row with the stored mean/scale; never refits
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.mean.len() {
            return Err(StatsError::Model(format!(
                "expected {} features, got {}",
                self.mean.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }

    pub fn transform_all<R: AsRef<[f64]>>(&self, rows: &[R]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_stats_population_std() {
        let stats = ColumnStats::fit([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.scale, 2.0);
        assert_eq!(stats.apply(9.0), 2.0);
        assert!(ColumnStats::fit(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let scaler = StandardScaler::fit(&["a", "b"], &[[1.0, 0.0], [3.0, 0.0]]).unwrap();
        assert_eq!(scaler.mean, vec![2.0, 0.0]);
        assert_eq!(scaler.scale, vec![1.0, 1.0]);
        assert_eq!(scaler.transform(&[3.0, 5.0]).unwrap(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = StandardScaler::fit(&["a"], &[[1.0], [2.0]]).unwrap();
        assert!(scaler.transform(&[1.0, 2.0]).is_err());
        assert!(StandardScaler::fit(&["a", "b"], &[vec![1.0]]).is_err());
        assert!(StandardScaler::fit(&["a"], &Vec::<Vec<f64>>::new()).is_err());
    }
}

//! Feature diagnostics over the ML-ready table: correlation matrix and PCA explained variance

use crate::clean::round_to;
use crate::error::{Result, StatsError};
use crate::table::{StagedOutputs, Table, PROCESSED_DELIMITER};
use std::path::Path;

const JACOBI_MAX_SWEEPS: usize = 100;
const JACOBI_EPSILON: f64 = 1e-20;

/// Every numeric column of a table, blanks as `None`
pub fn numeric_columns(table: &Table) -> Vec<(String, Vec<Option<f64>>)> {
    table
        .headers
        .iter()
        .filter_map(|name| table.numeric_column(name).ok().map(|values| (name.clone(), values)))
        .collect()
}

/// Pearson correlation over rows where both values are present.
/// `None` when fewer than two such rows exist or either side is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        sxy += (a - mean_x) * (b - mean_y);
        sxx += (a - mean_x).powi(2);
        syy += (b - mean_y).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|(_, x)| columns.iter().map(|(_, y)| pearson(x, y)).collect())
        .collect();
    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}

/// Sample covariance (n - 1) of complete rows
pub fn covariance_matrix(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dims = rows.first().map(Vec::len).unwrap_or(0);
    let n = rows.len() as f64;
    let means: Vec<f64> = (0..dims)
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
        .collect();

    let mut cov = vec![vec![0.0; dims]; dims];
    for row in rows {
        for i in 0..dims {
            for j in i..dims {
                cov[i][j] += (row[i] - means[i]) * (row[j] - means[j]);
            }
        }
    }
    let denom = (n - 1.0).max(1.0);
    for i in 0..dims {
        for j in i..dims {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Eigenvalues of a symmetric matrix by cyclic Jacobi rotation, sorted descending
pub fn symmetric_eigenvalues(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j] * a[i][j])
            .sum();
        if off < JACOBI_EPSILON {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
            }
        }
    }

    let mut eigenvalues: Vec<f64> = (0..n).map(|i| a[i][i]).collect();
    eigenvalues.sort_by(|x, y| y.total_cmp(x));
    eigenvalues
}

/// Share of total variance carried by each principal component, largest first
pub fn explained_variance_ratio(rows: &[Vec<f64>]) -> Result<Vec<f64>> {
    if rows.len() < 2 {
        return Err(StatsError::EmptyDataset(
            "PCA needs at least two complete rows".to_string(),
        ));
    }
    let eigenvalues = symmetric_eigenvalues(&covariance_matrix(rows));
    // Tiny negative eigenvalues are rounding noise on a PSD matrix
    let eigenvalues: Vec<f64> = eigenvalues.into_iter().map(|e| e.max(0.0)).collect();
    let total: f64 = eigenvalues.iter().sum();
    if total <= 0.0 {
        return Err(StatsError::Model("all features are constant".to_string()));
    }
    Ok(eigenvalues.into_iter().map(|e| e / total).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub features: usize,
    pub complete_rows: usize,
    pub explained_variance: Vec<f64>,
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| format!("{:?}", round_to(v, 6))).unwrap_or_default()
}

/// Write the correlation matrix and PCA explained-variance reports for one ML-ready table
pub fn analyze_season(ml_ready_path: &Path, correlation_path: &Path, pca_path: &Path) -> Result<AnalysisSummary> {
    log::info!("Analyzing Features for: {}", ml_ready_path.display());
    let table = Table::read(ml_ready_path, PROCESSED_DELIMITER)?;
    let columns = numeric_columns(&table);
    if columns.is_empty() {
        return Err(StatsError::EmptyDataset(format!(
            "no numeric columns in {}",
            ml_ready_path.display()
        )));
    }

    let correlation = correlation_matrix(&columns);

    let complete_rows: Vec<Vec<f64>> = (0..table.rows.len())
        .filter_map(|r| columns.iter().map(|(_, values)| values[r]).collect())
        .collect();
    let explained_variance = explained_variance_ratio(&complete_rows)?;

    let mut correlation_report = Table {
        headers: std::iter::once("Feature".to_string())
            .chain(correlation.columns.iter().cloned())
            .collect(),
        rows: Vec::new(),
    };
    for (name, values) in correlation.columns.iter().zip(&correlation.values) {
        let mut row = vec![name.clone()];
        row.extend(values.iter().map(|v| format_value(*v)));
        correlation_report.rows.push(row);
    }

    let mut pca_report = Table {
        headers: vec![
            "Component".to_string(),
            "Explained Variance Ratio".to_string(),
            "Cumulative Variance Ratio".to_string(),
        ],
        rows: Vec::new(),
    };
    let mut cumulative = 0.0;
    for (idx, ratio) in explained_variance.iter().enumerate() {
        cumulative += ratio;
        pca_report.rows.push(vec![
            (idx + 1).to_string(),
            format_value(Some(*ratio)),
            format_value(Some(cumulative)),
        ]);
    }

    let mut outputs = StagedOutputs::new();
    correlation_report.stage(&mut outputs, correlation_path, PROCESSED_DELIMITER)?;
    pca_report.stage(&mut outputs, pca_path, PROCESSED_DELIMITER)?;
    outputs.commit()?;
    log::info!(
        "Saved correlation matrix to {} and PCA variance to {}",
        correlation_path.display(),
        pca_path.display()
    );

    Ok(AnalysisSummary {
        features: columns.len(),
        complete_rows: complete_rows.len(),
        explained_variance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pearson() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&x, &[Some(2.0), Some(4.0), Some(6.0)]), Some(1.0));
        assert_eq!(pearson(&x, &[Some(3.0), Some(2.0), Some(1.0)]), Some(-1.0));
        assert_eq!(pearson(&x, &[Some(5.0), Some(5.0), Some(5.0)]), None);
        // Only the complete pairs count
        assert_eq!(pearson(&x, &[Some(1.0), None, Some(3.0)]), Some(1.0));
        assert_eq!(pearson(&x, &[None, None, Some(1.0)]), None);
    }

    #[test]
    fn test_eigenvalues_of_known_matrix() {
        let values = symmetric_eigenvalues(&[vec![2.0, 1.0], vec![1.0, 2.0]]);
        assert!(close(values[0], 3.0));
        assert!(close(values[1], 1.0));
    }

    #[test]
    fn test_explained_variance_ratio() {
        let rows = vec![
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
            vec![0.0, 2.0],
            vec![0.0, -2.0],
        ];
        let ratios = explained_variance_ratio(&rows).unwrap();
        assert!(close(ratios[0], 0.8));
        assert!(close(ratios[1], 0.2));
        assert!(explained_variance_ratio(&rows[..1]).is_err());
    }

    #[test]
    fn test_analyze_season_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let ml = dir.path().join("ml.csv");
        fs::write(&ml, "PTS;AST;Note\n1;2;x\n2;4;y\n3;7;z\n4;;w\n").unwrap();
        let corr = dir.path().join("analysis").join("corr.csv");
        let pca = dir.path().join("analysis").join("pca.csv");

        let summary = analyze_season(&ml, &corr, &pca).unwrap();
        assert_eq!(summary.features, 2);
        assert_eq!(summary.complete_rows, 3);
        assert!(close(summary.explained_variance.iter().sum::<f64>(), 1.0));

        let corr_content = fs::read_to_string(&corr).unwrap();
        assert!(corr_content.starts_with("Feature;PTS;AST\nPTS;1.0;"));
        let pca_content = fs::read_to_string(&pca).unwrap();
        assert_eq!(pca_content.lines().count(), 3);
    }
}

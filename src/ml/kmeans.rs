//! Seeded k-means over standardized feature vectors.
//!
//! k-means++ seeding, Lloyd iterations, `n_init` restarts. Restart `i` draws from an RNG
//! seeded with `seed + i`, and the restart with the lowest inertia wins (earliest on ties),
//! so fitting the same rows with the same config always gives the same centroids.

use crate::error::{Result, StatsError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for k-means fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Number of clusters
    pub k: usize,
    /// Base random seed
    pub seed: u64,
    /// Number of restarts (best result kept)
    pub n_init: usize,
    /// Maximum Lloyd iterations per restart
    pub max_iterations: usize,
    /// Stop once the summed squared centroid shift falls below this
    pub tolerance: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        ClusteringConfig {
            k: 4,
            seed: 42,
            n_init: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

/// A fitted partition: one centroid per cluster, in standardized space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansModel {
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances of the training rows to their centroid
    pub inertia: f64,
    pub iterations: usize,
    pub config: ClusteringConfig,
}

/// Result of [`KMeansModel::fit`]: the model and each training row's cluster
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: KMeansModel,
    pub labels: Vec<usize>,
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Index of the closest centroid; the lowest index wins ties
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best.1 {
            best = (idx, d);
        }
    }
    best
}

impl KMeansModel {
    pub fn fit<P: AsRef<[f64]>>(points: &[P], config: &ClusteringConfig) -> Result<FitResult> {
        if points.is_empty() {
            return Err(StatsError::EmptyDataset("cannot cluster an empty dataset".to_string()));
        }
        if config.k == 0 {
            return Err(StatsError::Model("k must be at least 1".to_string()));
        }
        if config.k > points.len() {
            return Err(StatsError::Model(format!(
                "k ({}) cannot exceed number of rows ({})",
                config.k,
                points.len()
            )));
        }
        let dims = points[0].as_ref().len();
        if let Some(bad) = points.iter().position(|p| p.as_ref().len() != dims) {
            return Err(StatsError::Model(format!(
                "row {} has {} values, expected {}",
                bad + 1,
                points[bad].as_ref().len(),
                dims
            )));
        }

        let mut best: Option<FitResult> = None;
        for init in 0..config.n_init.max(1) {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(init as u64));
            let result = Self::fit_single(points, config, &mut rng);
            log::debug!("k-means restart {}: inertia {:.4}", init, result.model.inertia);
            let better = best
                .as_ref()
                .map_or(true, |b| result.model.inertia < b.model.inertia);
            if better {
                best = Some(result);
            }
        }

        best.ok_or_else(|| StatsError::Model("all clustering attempts failed".to_string()))
    }

    /// One k-means++ seeded Lloyd run
    fn fit_single<P: AsRef<[f64]>>(points: &[P], config: &ClusteringConfig, rng: &mut StdRng) -> FitResult {
        let dims = points[0].as_ref().len();
        let mut centroids = Self::kmeans_plus_plus_init(points, config.k, rng);
        let mut labels = vec![0usize; points.len()];
        let mut iterations = 0;

        for iter in 0..config.max_iterations {
            iterations = iter + 1;

            // Assign
            let mut distances = vec![0.0; points.len()];
            for (idx, point) in points.iter().enumerate() {
                let (cluster, d) = nearest(point.as_ref(), &centroids);
                labels[idx] = cluster;
                distances[idx] = d;
            }

            // Update
            let mut sums = vec![vec![0.0; dims]; config.k];
            let mut counts = vec![0usize; config.k];
            for (point, &cluster) in points.iter().zip(&labels) {
                counts[cluster] += 1;
                for (sum, value) in sums[cluster].iter_mut().zip(point.as_ref()) {
                    *sum += value;
                }
            }

            let mut new_centroids: Vec<Vec<f64>> = Vec::with_capacity(config.k);
            for (cluster, sum) in sums.into_iter().enumerate() {
                if counts[cluster] > 0 {
                    new_centroids.push(sum.into_iter().map(|s| s / counts[cluster] as f64).collect());
                } else {
                    // Empty cluster: move it onto the row farthest from its centroid
                    let far = distances
                        .iter()
                        .enumerate()
                        .fold((0, f64::NEG_INFINITY), |acc, (i, &d)| if d > acc.1 { (i, d) } else { acc })
                        .0;
                    distances[far] = 0.0;
                    new_centroids.push(points[far].as_ref().to_vec());
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(&new_centroids)
                .map(|(old, new)| squared_distance(old, new))
                .sum();
            centroids = new_centroids;
            if shift <= config.tolerance {
                break;
            }
        }

        // Final assignment against the final centroids
        let mut inertia = 0.0;
        for (idx, point) in points.iter().enumerate() {
            let (cluster, d) = nearest(point.as_ref(), &centroids);
            labels[idx] = cluster;
            inertia += d;
        }

        FitResult {
            model: KMeansModel {
                centroids,
                inertia,
                iterations,
                config: config.clone(),
            },
            labels,
        }
    }

    /// k-means++ seeding: first centroid uniform, the rest weighted by squared distance
    fn kmeans_plus_plus_init<P: AsRef<[f64]>>(points: &[P], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
        let first = rng.gen_range(0..points.len());
        centroids.push(points[first].as_ref().to_vec());

        let mut closest: Vec<f64> = points
            .iter()
            .map(|p| squared_distance(p.as_ref(), &centroids[0]))
            .collect();

        while centroids.len() < k {
            let total: f64 = closest.iter().sum();
            let selected = if total <= 0.0 {
                // Every row sits on a centroid already
                rng.gen_range(0..points.len())
            } else {
                let threshold = rng.gen::<f64>() * total;
                let mut cumsum = 0.0;
                let mut selected = points.len() - 1;
                for (i, &d) in closest.iter().enumerate() {
                    cumsum += d;
                    if cumsum > threshold {
                        selected = i;
                        break;
                    }
                }
                selected
            };

            let centroid = points[selected].as_ref().to_vec();
            for (d, p) in closest.iter_mut().zip(points) {
                *d = d.min(squared_distance(p.as_ref(), &centroid));
            }
            centroids.push(centroid);
        }

        centroids
    }

    /// Cluster of a standardized row
    pub fn predict(&self, point: &[f64]) -> usize {
        nearest(point, &self.centroids).0
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn dimensions(&self) -> usize {
        self.centroids.first().map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        let mut points = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            for i in 0..5 {
                let offset = i as f64 * 0.1;
                points.push(vec![cx + offset, cy - offset]);
            }
        }
        points
    }

    fn config(k: usize) -> ClusteringConfig {
        ClusteringConfig {
            k,
            ..ClusteringConfig::default()
        }
    }

    #[test]
    fn test_separates_blobs() {
        let points = blobs();
        let fit = KMeansModel::fit(&points, &config(3)).unwrap();
        assert_eq!(fit.model.k(), 3);
        assert_eq!(fit.model.dimensions(), 2);
        for blob in fit.labels.chunks(5) {
            assert!(blob.iter().all(|&l| l == blob[0]));
        }
        assert_ne!(fit.labels[0], fit.labels[5]);
        assert_ne!(fit.labels[5], fit.labels[10]);
        assert_ne!(fit.labels[0], fit.labels[10]);
    }

    #[test]
    fn test_same_seed_same_result() {
        let points = blobs();
        let a = KMeansModel::fit(&points, &config(4)).unwrap();
        let b = KMeansModel::fit(&points, &config(4)).unwrap();
        assert_eq!(a.model.centroids, b.model.centroids);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn test_predict_matches_training_labels() {
        let points = blobs();
        let fit = KMeansModel::fit(&points, &config(3)).unwrap();
        for (point, &label) in points.iter().zip(&fit.labels) {
            assert_eq!(fit.model.predict(point), label);
        }
    }

    #[test]
    fn test_duplicate_points_fill_all_clusters() {
        let points = vec![vec![1.0, 1.0]; 4];
        let fit = KMeansModel::fit(&points, &config(2)).unwrap();
        assert_eq!(fit.model.k(), 2);
        assert_eq!(fit.model.inertia, 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            KMeansModel::fit(&empty, &config(2)),
            Err(StatsError::EmptyDataset(_))
        ));
        assert!(KMeansModel::fit(&[vec![1.0]], &config(2)).is_err());
        assert!(KMeansModel::fit(&[vec![1.0], vec![1.0, 2.0]], &config(1)).is_err());
        assert!(KMeansModel::fit(&[vec![1.0]], &config(0)).is_err());
    }

    #[test]
    fn test_nearest_prefers_first_on_ties() {
        let centroids = vec![vec![-1.0], vec![1.0]];
        assert_eq!(nearest(&[0.0], &centroids).0, 0);
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }
}

use std::collections::BTreeMap;

/// k-nearest-neighbours classifier over integer class labels.
///
/// Distances are Euclidean. Equidistant neighbours are taken in training
/// order, and a tied vote goes to the smallest label.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    points: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl KnnClassifier {
    /// `k` is capped at the number of training points. Returns `None` for an
    /// empty training set or `k == 0`.
    pub fn fit(points: Vec<Vec<f64>>, labels: Vec<usize>, k: usize) -> Option<Self> {
        if points.is_empty() || points.len() != labels.len() || k == 0 {
            return None;
        }
        let k = k.min(points.len());
        Some(KnnClassifier { k, points, labels })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn predict_one(&self, query: &[f64]) -> usize {
        let mut by_distance: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (squared_distance(p, query), i))
            .collect();
        // Stable sort keeps training order among equal distances.
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
        for &(_, i) in by_distance.iter().take(self.k) {
            *votes.entry(self.labels[i]).or_default() += 1;
        }

        let mut best = (0, 0);
        for (label, count) in votes {
            if count > best.1 {
                best = (label, count);
            }
        }
        best.0
    }

    pub fn predict(&self, queries: &[Vec<f64>]) -> Vec<usize> {
        queries.iter().map(|q| self.predict_one(q)).collect()
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

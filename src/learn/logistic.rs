//! Multinomial logistic regression (softmax) trained by full-batch gradient
//! descent on standardised features.

use serde::{Deserialize, Serialize};

/// Training parameters for [`SoftmaxClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Upper bound on gradient steps.
    pub max_iter: usize,
    /// Inverse L2 regularisation strength.
    pub c: f64,
    pub learning_rate: f64,
    /// Stop once the largest gradient component falls below this.
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            c: 1.0,
            learning_rate: 0.5,
            tol: 1e-4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SoftmaxClassifier {
    /// Distinct training labels, ascending; row `k` of `weights` scores `classes[k]`.
    classes: Vec<usize>,
    mean: Vec<f64>,
    scale: Vec<f64>,
    /// `classes.len()` rows of `n_features + 1` weights, bias last.
    weights: Vec<Vec<f64>>,
}

impl SoftmaxClassifier {
    pub fn fit(x: &[Vec<f64>], y: &[usize], config: &LogisticConfig) -> Option<Self> {
        let n = x.len();
        if n == 0 || n != y.len() {
            return None;
        }
        let p = x[0].len();

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mean: Vec<f64> = (0..p)
            .map(|j| x.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        let scale: Vec<f64> = (0..p)
            .map(|j| {
                let var = x.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n as f64;
                if var > 0.0 { var.sqrt() } else { 1.0 }
            })
            .collect();

        let mut model = SoftmaxClassifier {
            classes,
            mean,
            scale,
            weights: Vec::new(),
        };
        let n_classes = model.classes.len();
        model.weights = vec![vec![0.0; p + 1]; n_classes];
        if n_classes < 2 {
            return Some(model);
        }

        let z: Vec<Vec<f64>> = x.iter().map(|r| model.standardise(r)).collect();
        let targets: Vec<usize> = y
            .iter()
            .map(|label| model.classes.partition_point(|c| c < label))
            .collect();

        let step = config.learning_rate / (1.0 + p as f64 / 2.0);
        let penalty = 1.0 / (config.c.max(f64::MIN_POSITIVE) * n as f64);

        for iter in 0..config.max_iter {
            let mut grad = vec![vec![0.0; p + 1]; n_classes];
            for (row, &target) in z.iter().zip(&targets) {
                let probs = softmax(&model.scores(row));
                for (k, prob) in probs.iter().enumerate() {
                    let err = prob - if k == target { 1.0 } else { 0.0 };
                    for j in 0..p {
                        grad[k][j] += err * row[j];
                    }
                    grad[k][p] += err;
                }
            }

            let mut largest = 0.0f64;
            for (g_row, w_row) in grad.iter_mut().zip(&model.weights) {
                for j in 0..=p {
                    g_row[j] /= n as f64;
                    if j < p {
                        g_row[j] += penalty * w_row[j];
                    }
                    largest = largest.max(g_row[j].abs());
                }
            }
            if largest < config.tol {
                log::debug!("softmax converged after {iter} iterations");
                break;
            }

            for (w_row, g_row) in model.weights.iter_mut().zip(&grad) {
                for (w, g) in w_row.iter_mut().zip(g_row) {
                    *w -= step * g;
                }
            }
        }

        Some(model)
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn predict_one(&self, row: &[f64]) -> usize {
        let z = self.standardise(row);
        let scores = self.scores(&z);
        let mut best = 0;
        for (k, s) in scores.iter().enumerate() {
            if *s > scores[best] {
                best = k;
            }
        }
        self.classes[best]
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        rows.iter().map(|r| self.predict_one(r)).collect()
    }

    fn standardise(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    fn scores(&self, z: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| {
                let (bias, coef) = w.split_last().map_or((0.0, &[][..]), |(b, c)| (*b, c));
                bias + coef.iter().zip(z).map(|(a, b)| a * b).sum::<f64>()
            })
            .collect()
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separable_two_classes() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<usize> = (0..20).map(|i| if i < 10 { 0 } else { 1 }).collect();
        let clf = SoftmaxClassifier::fit(&x, &y, &LogisticConfig::default()).unwrap();
        assert_eq!(clf.predict_one(&[1.0]), 0);
        assert_eq!(clf.predict_one(&[18.0]), 1);
    }

    #[test]
    fn test_three_classes_on_two_features() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for (label, (cx, cy)) in [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)].into_iter().enumerate() {
            for d in [-0.5, 0.0, 0.5] {
                x.push(vec![cx + d, cy - d]);
                y.push(label * 2);
            }
        }
        let clf = SoftmaxClassifier::fit(&x, &y, &LogisticConfig::default()).unwrap();
        assert_eq!(clf.classes(), &[0, 2, 4]);
        assert_eq!(clf.predict_one(&[0.2, 0.1]), 0);
        assert_eq!(clf.predict_one(&[9.5, 0.3]), 2);
        assert_eq!(clf.predict_one(&[0.1, 9.8]), 4);
    }

    #[test]
    fn test_single_class_predicts_it() {
        let clf = SoftmaxClassifier::fit(&[vec![1.0], vec![2.0]], &[3, 3], &LogisticConfig::default())
            .unwrap();
        assert_eq!(clf.predict_one(&[100.0]), 3);
    }

    #[test]
    fn test_config_deserialises_with_defaults() {
        let cfg: LogisticConfig = serde_json::from_str(r#"{"max_iter": 50}"#).unwrap();
        assert_eq!(cfg.max_iter, 50);
        assert_eq!(cfg.c, 1.0);
    }
}

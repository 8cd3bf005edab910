//! Least-squares linear regression with an intercept.

/// Fitted `y = intercept + coef · x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coef: Vec<f64>,
}

impl LinearModel {
    /// Ordinary least squares.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Option<Self> {
        Self::fit_ridge(x, y, 0.0)
    }

    /// Least squares with an L2 penalty `alpha` on the coefficients (the
    /// intercept is never penalised).
    ///
    /// Returns `None` for empty input or mismatched lengths. A singular
    /// system is retried once with a tiny ridge term scaled to the data.
    pub fn fit_ridge(x: &[Vec<f64>], y: &[f64], alpha: f64) -> Option<Self> {
        let n = x.len();
        if n == 0 || n != y.len() {
            return None;
        }
        let p = x[0].len();
        if x.iter().any(|row| row.len() != p) {
            return None;
        }

        let x_mean: Vec<f64> = (0..p)
            .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        // Centred normal equations: (XcᵀXc + αI) β = Xcᵀ yc
        let mut gram = vec![vec![0.0; p]; p];
        let mut rhs = vec![0.0; p];
        for (row, &target) in x.iter().zip(y) {
            let yc = target - y_mean;
            for i in 0..p {
                let xi = row[i] - x_mean[i];
                rhs[i] += xi * yc;
                for j in i..p {
                    gram[i][j] += xi * (row[j] - x_mean[j]);
                }
            }
        }
        for i in 0..p {
            for j in 0..i {
                gram[i][j] = gram[j][i];
            }
            gram[i][i] += alpha;
        }

        let coef = match solve(gram.clone(), rhs.clone()) {
            Some(beta) => beta,
            None => {
                let trace: f64 = (0..p).map(|i| gram[i][i]).sum();
                let jitter = (trace / p.max(1) as f64).abs() * 1e-10 + 1e-12;
                for (i, row) in gram.iter_mut().enumerate() {
                    row[i] += jitter;
                }
                log::debug!("singular least-squares system, retrying with ridge {jitter:e}");
                solve(gram, rhs)?
            }
        };

        let intercept = y_mean - coef.iter().zip(&x_mean).map(|(b, m)| b * m).sum::<f64>();
        Some(LinearModel { intercept, coef })
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + self.coef.iter().zip(row).map(|(b, v)| b * v).sum::<f64>()
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_row(r)).collect()
    }
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot is numerically zero relative to the largest
/// entry of `a`.
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    let eps = scale.max(f64::MIN_POSITIVE) * 1e-12;

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= eps {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

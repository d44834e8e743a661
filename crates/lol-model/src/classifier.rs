use anyhow::{anyhow, Context, Result};
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Lower bound on the class rate used for the constant fallback model
const RATE_FLOOR: f64 = 1e-3;

/// L-BFGS settings handed to `linfa-logistic`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainParams {
    pub max_iterations: u64,
    /// L2 penalty on weights (not on the intercept)
    pub l2: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            l2: 1e-2,
        }
    }
}

/// Stack equal-width rows into a record matrix
pub fn to_matrix(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let cells: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), width), cells)
        .context("feature rows have uneven widths")
}

/// Binary logistic classifier over a fixed-width feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    /// Untrained model that predicts 0.5 everywhere
    pub fn neutral(width: usize) -> Self {
        Self {
            weights: vec![0.0; width],
            bias: 0.0,
        }
    }

    /// Fit with L-BFGS from a zero start. linfa needs both classes and at
    /// least one column; otherwise the model is the constant log-odds of
    /// the observed win rate.
    pub fn fit(records: &Array2<f64>, labels: &[bool], params: &TrainParams) -> Result<Self> {
        let width = records.ncols();
        if records.nrows() != labels.len() {
            anyhow::bail!(
                "{} feature row(s) but {} label(s)",
                records.nrows(),
                labels.len()
            );
        }
        if labels.is_empty() {
            return Ok(Self::neutral(width));
        }
        let wins = labels.iter().filter(|&&l| l).count();
        if width == 0 || wins == 0 || wins == labels.len() {
            let rate = (wins as f64 / labels.len() as f64).clamp(RATE_FLOOR, 1.0 - RATE_FLOOR);
            return Ok(Self {
                weights: vec![0.0; width],
                bias: (rate / (1.0 - rate)).ln(),
            });
        }

        let dataset = Dataset::new(records.clone(), Array1::from(labels.to_vec()));
        let fitted = LogisticRegression::default()
            .alpha(params.l2)
            .max_iterations(params.max_iterations)
            .fit(&dataset)
            .map_err(|e| anyhow!("logistic regression failed: {}", e))?;

        // linfa picks its own positive class; orient towards wins
        let sign = if fitted.labels().pos.class { 1.0 } else { -1.0 };
        Ok(Self {
            weights: fitted.params().iter().map(|w| sign * w).collect(),
            bias: sign * fitted.intercept(),
        })
    }

    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }

    /// Mean negative log-likelihood
    pub fn log_loss(&self, records: &Array2<f64>, labels: &[bool]) -> f64 {
        if records.nrows() == 0 {
            return 0.0;
        }
        let total: f64 = records
            .rows()
            .into_iter()
            .zip(labels)
            .map(|(row, &label)| {
                let row: Vec<f64> = row.to_vec();
                let p = self.predict_proba(&row).clamp(1e-12, 1.0 - 1e-12);
                if label {
                    -p.ln()
                } else {
                    -(1.0 - p).ln()
                }
            })
            .sum();
        total / records.nrows() as f64
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

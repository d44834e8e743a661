use anyhow::{anyhow, Result};
use linfa::traits::{Fit, Transformer};
use linfa::DatasetBase;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column standardization fitted on training rows. NaN cells are
/// imputed with the column mean before fitting and scale to 0 afterwards.
/// `None` for an empty or zero-width fit, which passes rows through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    fitted: Option<LinearScaler<f64>>,
}

impl StandardScaler {
    pub fn fit(records: &Array2<f64>) -> Result<Self> {
        if records.nrows() == 0 || records.ncols() == 0 {
            return Ok(Self::default());
        }
        let mut imputed = records.clone();
        for mut col in imputed.columns_mut() {
            let (sum, n) = col
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            let mean = if n == 0 { 0.0 } else { sum / n as f64 };
            col.mapv_inplace(|v| if v.is_nan() { mean } else { v });
        }
        let fitted = LinearScaler::standard()
            .fit(&DatasetBase::from(imputed))
            .map_err(|e| anyhow!("failed to fit scaler: {}", e))?;
        Ok(Self {
            fitted: Some(fitted),
        })
    }

    /// Scale a record matrix. Missing or non-finite results become 0.
    pub fn transform_matrix(&self, records: Array2<f64>) -> Array2<f64> {
        let scaled = match &self.fitted {
            Some(fitted) if records.nrows() > 0 => fitted.transform(records),
            _ => records,
        };
        scaled.mapv(|v| if v.is_finite() { v } else { 0.0 })
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        let records = Array1::from(row.to_vec()).insert_axis(Axis(0));
        self.transform_matrix(records).into_iter().collect()
    }
}

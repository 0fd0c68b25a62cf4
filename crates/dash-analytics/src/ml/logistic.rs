//! L2 정규화 로지스틱 회귀 (이진 분류).
//!
//! 목적 함수는 `C × Σ logloss + ½‖w‖²`이며, 표본 수로 나눈 형태로
//! 전체 배치 경사 하강법을 적용합니다. 절편은 정규화하지 않습니다.
//! 초기값이 0으로 고정되어 있어 결과는 결정적입니다.

use ndarray::{Array1, Array2};
use tracing::debug;

use super::error::{MlError, MlResult};

/// 로지스틱 회귀 하이퍼파라미터.
#[derive(Debug, Clone, Copy)]
pub struct LogisticParams {
    /// 역정규화 강도 (클수록 약한 정규화)
    pub c: f64,
    /// 학습률
    pub learning_rate: f64,
    /// 최대 반복 횟수
    pub max_iter: usize,
    /// 비용 변화 수렴 기준
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 0.1,
            max_iter: 5000,
            tolerance: 1e-9,
        }
    }
}

/// 로지스틱 회귀 분류기.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    params: LogisticParams,
    weights: Option<Array1<f64>>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(params: LogisticParams) -> Self {
        Self {
            params,
            weights: None,
            intercept: 0.0,
        }
    }

    /// 역정규화 강도 `c`로 생성.
    pub fn with_c(c: f64) -> Self {
        Self::new(LogisticParams {
            c,
            ..Default::default()
        })
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let e = z.exp();
            e / (1.0 + e)
        }
    }

    fn cost(&self, y: &Array1<f64>, proba: &Array1<f64>, weights: &Array1<f64>) -> f64 {
        let n = y.len() as f64;
        let eps = 1e-15;
        let log_loss = -y
            .iter()
            .zip(proba.iter())
            .map(|(&t, &p)| {
                let p = p.clamp(eps, 1.0 - eps);
                t * p.ln() + (1.0 - t) * (1.0 - p).ln()
            })
            .sum::<f64>()
            / n;
        log_loss + weights.dot(weights) / (2.0 * self.params.c * n)
    }

    /// 모델을 학습합니다.
    ///
    /// # Errors
    /// - 행 수와 라벨 수가 다르면 `DimensionMismatch`
    /// - 라벨이 한 종류뿐이면 `SingleClass`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> MlResult<()> {
        if x.nrows() != y.len() {
            return Err(MlError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(MlError::InsufficientData {
                required: 2,
                actual: 0,
            });
        }
        if self.params.c <= 0.0 {
            return Err(MlError::InvalidParameter(format!(
                "C must be positive, got {}",
                self.params.c
            )));
        }
        let first = y[0];
        if y.iter().all(|label| *label == first) {
            return Err(MlError::SingleClass(first));
        }

        let target = y.mapv(f64::from);
        let n = x.nrows() as f64;
        let lr = self.params.learning_rate;
        let reg = 1.0 / (self.params.c * n);

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut intercept = 0.0;
        let mut prev_cost = f64::INFINITY;
        let mut iterations = 0;

        for iter in 0..self.params.max_iter {
            iterations = iter + 1;
            let proba = (x.dot(&weights) + intercept).mapv(Self::sigmoid);
            let errors = &proba - &target;

            let grad_w = x.t().dot(&errors) / n + &weights * reg;
            let grad_b = errors.sum() / n;

            weights = weights - grad_w * lr;
            intercept -= grad_b * lr;

            let cost = self.cost(&target, &proba, &weights);
            if (prev_cost - cost).abs() < self.params.tolerance {
                break;
            }
            prev_cost = cost;
        }

        debug!(iterations, features = x.ncols(), "Logistic regression fitted");

        self.weights = Some(weights);
        self.intercept = intercept;
        Ok(())
    }

    fn fitted_weights(&self, x: &Array2<f64>) -> MlResult<&Array1<f64>> {
        let weights = self
            .weights
            .as_ref()
            .ok_or(MlError::NotFitted("LogisticRegression"))?;
        if x.ncols() != weights.len() {
            return Err(MlError::DimensionMismatch {
                expected: weights.len(),
                got: x.ncols(),
            });
        }
        Ok(weights)
    }

    /// 상승(1) 확률.
    pub fn predict_proba(&self, x: &Array2<f64>) -> MlResult<Array1<f64>> {
        let weights = self.fitted_weights(x)?;
        Ok((x.dot(weights) + self.intercept).mapv(Self::sigmoid))
    }

    /// 클래스 예측 (확률 0.5 초과면 1).
    pub fn predict(&self, x: &Array2<f64>) -> MlResult<Array1<u8>> {
        Ok(self.predict_proba(x)?.mapv(|p| u8::from(p > 0.5)))
    }

    /// 학습된 계수.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }
}

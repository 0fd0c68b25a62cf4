//! 전처리: 평균 대치, 표준화, 학습/테스트 분할.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{MlError, MlResult};

/// 열 평균으로 결측값(NaN)을 채웁니다.
///
/// 관측값이 하나도 없는 열은 학습 시점에 제외되며, 변환 결과에서도
/// 같은 열이 제외됩니다.
#[derive(Debug, Clone, Default)]
pub struct MeanImputer {
    means: Option<Vec<Option<f64>>>,
}

impl MeanImputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 열별 평균을 학습합니다.
    pub fn fit(&mut self, x: &Array2<f64>) -> &mut Self {
        let means = x
            .axis_iter(Axis(1))
            .map(|col| {
                let (sum, count) = col
                    .iter()
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                (count > 0).then(|| sum / count as f64)
            })
            .collect();
        self.means = Some(means);
        self
    }

    /// 유지되는 열 인덱스.
    pub fn kept_columns(&self) -> Vec<usize> {
        self.means
            .as_ref()
            .map(|means| {
                means
                    .iter()
                    .enumerate()
                    .filter_map(|(i, m)| m.map(|_| i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 결측값을 채우고 전부 결측이던 열을 제거합니다.
    pub fn transform(&self, x: &Array2<f64>) -> MlResult<Array2<f64>> {
        let means = self.means.as_ref().ok_or(MlError::NotFitted("MeanImputer"))?;
        if x.ncols() != means.len() {
            return Err(MlError::DimensionMismatch {
                expected: means.len(),
                got: x.ncols(),
            });
        }

        let kept: Vec<(usize, f64)> = means
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|mean| (i, mean)))
            .collect();
        if kept.is_empty() {
            return Err(MlError::NoFeatures);
        }

        let mut out = Array2::<f64>::zeros((x.nrows(), kept.len()));
        for (j, (src, mean)) in kept.iter().enumerate() {
            for i in 0..x.nrows() {
                let v = x[[i, *src]];
                out[[i, j]] = if v.is_nan() { *mean } else { v };
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> MlResult<Array2<f64>> {
        self.fit(x).transform(x)
    }
}

/// 평균 0, 분산 1로 표준화합니다 (모표준편차 사용).
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 열별 평균과 표준편차를 학습합니다. 표준편차가 0인 열은 1로 나눕니다.
    pub fn fit(&mut self, x: &Array2<f64>) -> MlResult<&mut Self> {
        if x.nrows() == 0 {
            return Err(MlError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let mean = x.mean_axis(Axis(0)).ok_or(MlError::InsufficientData {
            required: 1,
            actual: 0,
        })?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s.abs() < f64::EPSILON { 1.0 } else { s });

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(self)
    }

    pub fn transform(&self, x: &Array2<f64>) -> MlResult<Array2<f64>> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(MlError::NotFitted("StandardScaler")),
        };
        if x.ncols() != mean.len() {
            return Err(MlError::DimensionMismatch {
                expected: mean.len(),
                got: x.ncols(),
            });
        }
        Ok((x - mean) / scale)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> MlResult<Array2<f64>> {
        self.fit(x)?.transform(x)
    }
}

/// 분할 결과.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<u8>,
    pub y_test: Array1<u8>,
}

/// 테스트 행 수 (올림).
pub fn test_count(n: usize, test_size: f64) -> usize {
    (n as f64 * test_size).ceil() as usize
}

/// 시드 고정 셔플 후 학습/테스트로 분할합니다.
///
/// 섞인 순서의 앞쪽 `ceil(n × test_size)`개가 테스트 세트입니다.
pub fn train_test_split(x: &Array2<f64>, y: &Array1<u8>, test_size: f64, seed: u64) -> MlResult<Split> {
    let n = x.nrows();
    if y.len() != n {
        return Err(MlError::DimensionMismatch {
            expected: n,
            got: y.len(),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MlError::InvalidParameter(format!(
            "test_size must be within (0, 1), got {}",
            test_size
        )));
    }

    let n_test = test_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(MlError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(Split {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    })
}

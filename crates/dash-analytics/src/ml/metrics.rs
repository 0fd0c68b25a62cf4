//! 분류 평가 지표.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// 정확도 (예측이 맞은 비율).
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// 클래스 하나의 지표.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// 분류 리포트 (클래스별 지표, 정확도, macro/weighted 평균).
///
/// 분모가 0인 지표는 0으로 둡니다.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    /// (라벨, 지표) 라벨 오름차순
    pub classes: Vec<(u8, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// 정답과 예측으로 리포트를 계산합니다.
    ///
    /// 라벨 집합은 정답과 예측에 등장한 값의 합집합입니다.
    pub fn new(y_true: &[u8], y_pred: &[u8]) -> Self {
        let labels: BTreeSet<u8> = y_true.iter().chain(y_pred).copied().collect();
        let total = y_true.len();

        let classes: Vec<(u8, ClassMetrics)> = labels
            .into_iter()
            .map(|label| {
                let tp = y_true
                    .iter()
                    .zip(y_pred)
                    .filter(|(t, p)| **t == label && **p == label)
                    .count();
                let predicted = y_pred.iter().filter(|p| **p == label).count();
                let support = y_true.iter().filter(|t| **t == label).count();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                (
                    label,
                    ClassMetrics {
                        precision,
                        recall,
                        f1,
                        support,
                    },
                )
            })
            .collect();

        let k = classes.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|(_, m)| m.precision).sum::<f64>() / k,
            recall: classes.iter().map(|(_, m)| m.recall).sum::<f64>() / k,
            f1: classes.iter().map(|(_, m)| m.f1).sum::<f64>() / k,
            support: total,
        };

        let weight = |m: &ClassMetrics| ratio(m.support, total);
        let weighted_avg = ClassMetrics {
            precision: classes.iter().map(|(_, m)| m.precision * weight(m)).sum(),
            recall: classes.iter().map(|(_, m)| m.recall * weight(m)).sum(),
            f1: classes.iter().map(|(_, m)| m.f1 * weight(m)).sum(),
            support: total,
        };

        Self {
            classes,
            accuracy: accuracy(y_true, y_pred),
            macro_avg,
            weighted_avg,
        }
    }

    /// 평가 행 수.
    pub fn support(&self) -> usize {
        self.macro_avg.support
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>12}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        for (label, metrics) in &self.classes {
            row(f, &label.to_string(), metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 1], &[1, 0, 0, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_report_values() {
        let y_true = [0, 0, 1, 1, 1];
        let y_pred = [0, 1, 1, 1, 0];
        let report = ClassificationReport::new(&y_true, &y_pred);

        let (label0, m0) = report.classes[0];
        assert_eq!(label0, 0);
        assert_eq!(m0.precision, 0.5);
        assert_eq!(m0.recall, 0.5);
        assert_eq!(m0.support, 2);

        let (_, m1) = report.classes[1];
        assert!((m1.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m1.recall - 2.0 / 3.0).abs() < 1e-12);

        assert_eq!(report.accuracy, 0.6);
        assert!((report.macro_avg.f1 - (0.5 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((report.weighted_avg.recall - 0.6).abs() < 1e-12);
        assert_eq!(report.support(), 5);
    }

    #[test]
    fn test_missing_predictions_count_as_zero() {
        // 1을 한 번도 예측하지 않음
        let report = ClassificationReport::new(&[0, 1, 1], &[0, 0, 0]);
        let (_, m1) = report.classes[1];
        assert_eq!(m1.precision, 0.0);
        assert_eq!(m1.f1, 0.0);
    }

    #[test]
    fn test_report_layout() {
        let report = ClassificationReport::new(&[0, 0, 1, 1, 1], &[0, 1, 1, 1, 0]);
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "              precision    recall  f1-score   support");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "           0       0.50      0.50      0.50         2");
        assert_eq!(lines[5], "    accuracy                           0.60         5");
        assert_eq!(lines[7], "weighted avg       0.60      0.60      0.60         5");
    }
}

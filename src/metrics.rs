use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::labels;

/// Machine-readable evaluation record persisted as `metrics.json`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Metrics {
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// F1 over the positive class.
    pub f1_score: f64,
}

/// Precision/recall/F1 and support for one class.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class classification report over the two sentiment classes.
#[derive(Clone, Debug)]
pub struct ClassificationReport {
    /// Metrics per class, in ascending class order (negative, positive).
    pub classes: Vec<(u8, ClassMetrics)>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Total number of scored rows.
    pub total: usize,
}

impl ClassificationReport {
    /// Compute the report from aligned truth/prediction vectors.
    pub fn compute(y_true: &[u8], y_pred: &[u8]) -> Self {
        let classes = [labels::NEGATIVE_CLASS, labels::POSITIVE_CLASS]
            .into_iter()
            .map(|class| (class, class_metrics(y_true, y_pred, class)))
            .collect();
        Self {
            classes,
            accuracy: accuracy(y_true, y_pred),
            total: y_true.len(),
        }
    }

    /// F1 of the positive class.
    pub fn positive_f1(&self) -> f64 {
        self.classes
            .iter()
            .find(|(class, _)| *class == labels::POSITIVE_CLASS)
            .map(|(_, metrics)| metrics.f1)
            .unwrap_or(0.0)
    }

    fn macro_avg(&self) -> ClassMetrics {
        let count = self.classes.len().max(1) as f64;
        let mut avg = ClassMetrics::default();
        for (_, metrics) in &self.classes {
            avg.precision += metrics.precision / count;
            avg.recall += metrics.recall / count;
            avg.f1 += metrics.f1 / count;
            avg.support += metrics.support;
        }
        avg
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
        for (class, metrics) in &self.classes {
            let name = match *class {
                labels::POSITIVE_CLASS => labels::POSITIVE,
                _ => labels::NEGATIVE,
            };
            writeln!(
                f,
                "{:>12}  {:>9.4} {:>9.4} {:>9.4} {:>9}",
                name, metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12}  {:>9} {:>9} {:>9.4} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        let avg = self.macro_avg();
        writeln!(
            f,
            "{:>12}  {:>9.4} {:>9.4} {:>9.4} {:>9}",
            "macro avg", avg.precision, avg.recall, avg.f1, avg.support
        )
    }
}

/// Fraction of predictions matching the truth (0 on empty input).
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(truth, pred)| truth == pred)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Precision/recall/F1 treating `class` as the positive class.
pub fn class_metrics(y_true: &[u8], y_pred: &[u8], class: u8) -> ClassMetrics {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    let mut support = 0usize;
    for (truth, pred) in y_true.iter().zip(y_pred) {
        if *truth == class {
            support += 1;
        }
        match (*truth == class, *pred == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

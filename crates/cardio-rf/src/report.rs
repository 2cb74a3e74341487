//! Text and JSON classification report built from a confusion matrix.

use std::fmt;

use serde::Serialize;

use crate::confusion::ConfusionMatrix;
use crate::error::RfError;

/// One line of a classification report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    /// Class name, or the aggregate name for average rows.
    pub label: String,
    /// Precision for the class or average.
    pub precision: f64,
    /// Recall for the class or average.
    pub recall: f64,
    /// F1 score for the class or average.
    pub f1: f64,
    /// Number of true samples covered by the row.
    pub support: usize,
}

/// Per-class precision/recall/F1 plus accuracy, macro and weighted averages.
///
/// Only classes that occur in the true or predicted labels are listed.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    /// One row per class present in truth or prediction.
    pub classes: Vec<ReportRow>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Unweighted mean of the class rows.
    pub macro_avg: ReportRow,
    /// Support-weighted mean of the class rows.
    pub weighted_avg: ReportRow,
}

const DIGITS: usize = 2;
const WEIGHTED_AVG: &str = "weighted avg";

impl ClassificationReport {
    /// Build a report naming class `i` by `class_names[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::ClassNameMismatch`] if `class_names` does not have
    /// one entry per class of `matrix`.
    pub fn new(matrix: &ConfusionMatrix, class_names: &[String]) -> Result<Self, RfError> {
        if class_names.len() != matrix.n_classes() {
            return Err(RfError::ClassNameMismatch {
                n_classes: matrix.n_classes(),
                n_names: class_names.len(),
            });
        }

        let classes: Vec<ReportRow> = matrix
            .class_metrics()
            .into_iter()
            .filter(|m| m.support > 0 || matrix.predicted_count(m.class) > 0)
            .map(|m| ReportRow {
                label: class_names[m.class].clone(),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect();

        let total = matrix.total();
        let n_rows = classes.len().max(1) as f64;
        let macro_avg = ReportRow {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|r| r.precision).sum::<f64>() / n_rows,
            recall: classes.iter().map(|r| r.recall).sum::<f64>() / n_rows,
            f1: classes.iter().map(|r| r.f1).sum::<f64>() / n_rows,
            support: total,
        };

        let weight = |pick: fn(&ReportRow) -> f64| -> f64 {
            if total == 0 {
                return 0.0;
            }
            classes.iter().map(|r| pick(r) * r.support as f64).sum::<f64>() / total as f64
        };
        let weighted_avg = ReportRow {
            label: WEIGHTED_AVG.to_string(),
            precision: weight(|r| r.precision),
            recall: weight(|r| r.recall),
            f1: weight(|r| r.f1),
            support: total,
        };

        Ok(Self {
            classes,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        })
    }

    /// Total number of evaluated samples.
    #[must_use]
    pub fn support(&self) -> usize {
        self.weighted_avg.support
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &ReportRow, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.DIGITS$} {:>9.DIGITS$} {:>9.DIGITS$} {:>9}",
        row.label, row.precision, row.recall, row.f1, row.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|r| r.label.len())
            .chain([WEIGHTED_AVG.len(), DIGITS])
            .max()
            .unwrap_or(WEIGHTED_AVG.len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for row in &self.classes {
            write_row(f, row, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.DIGITS$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )?;
        write_row(f, &self.macro_avg, width)?;
        write_row(f, &self.weighted_avg, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["0".to_string(), "1".to_string()]
    }

    fn sample_matrix() -> ConfusionMatrix {
        // 4 TN, 1 FP, 2 FN, 3 TP
        let truth = vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        let pred = vec![0, 0, 0, 0, 1, 0, 0, 1, 1, 1];
        ConfusionMatrix::from_labels(&truth, &pred, 2).unwrap()
    }

    #[test]
    fn averages() {
        let report = ClassificationReport::new(&sample_matrix(), &names()).unwrap();
        assert_eq!(report.classes.len(), 2);
        assert!((report.accuracy - 0.7).abs() < 1e-12);
        let expected_macro_precision = (4.0 / 6.0 + 0.75) / 2.0;
        assert!((report.macro_avg.precision - expected_macro_precision).abs() < 1e-12);
        // equal supports: weighted == macro
        assert!((report.weighted_avg.recall - report.macro_avg.recall).abs() < 1e-12);
        assert_eq!(report.support(), 10);
    }

    #[test]
    fn weighted_average_uses_support() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 0, 1], &[0, 0, 0, 0], 2).unwrap();
        let report = ClassificationReport::new(&cm, &names()).unwrap();
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-12);
        assert!((report.macro_avg.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn absent_classes_are_not_listed() {
        let cm = ConfusionMatrix::from_labels(&[0, 2], &[0, 2], 3).unwrap();
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let report = ClassificationReport::new(&cm, &labels).unwrap();
        let listed: Vec<&str> = report.classes.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(listed, ["a", "c"]);
    }

    #[test]
    fn text_layout() {
        let report = ClassificationReport::new(&sample_matrix(), &names()).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "              precision    recall  f1-score   support");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "           0       0.67      0.80      0.73         5");
        assert_eq!(lines[3], "           1       0.75      0.60      0.67         5");
        assert_eq!(lines[5], "    accuracy                           0.70        10");
        assert!(lines[6].starts_with("   macro avg       0.71"));
        assert!(lines[7].starts_with("weighted avg"));
    }

    #[test]
    fn name_count_must_match() {
        let err = ClassificationReport::new(&sample_matrix(), &["0".to_string()]).unwrap_err();
        assert!(matches!(err, RfError::ClassNameMismatch { n_classes: 2, n_names: 1 }));
    }
}

//! Marks to percentages and letter grades.

use serde::Serialize;

/// `marks / max_marks * 100`; `None` when there is no positive maximum.
pub fn percentage(marks: f64, max_marks: f64) -> Option<f64> {
    if max_marks <= 0.0 {
        return None;
    }
    Some(marks / max_marks * 100.0)
}

pub fn letter_grade(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "A+"
    } else if percentage >= 80.0 {
        "A"
    } else if percentage >= 70.0 {
        "B"
    } else if percentage >= 60.0 {
        "C"
    } else {
        "F"
    }
}

fn one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub count: usize,
    pub average_percentage: f64,
    pub letter_grade: Option<&'static str>,
}

/// Mean of the per-grade percentages over `(marks, max_marks)` pairs, one
/// decimal. Pairs without a positive maximum are skipped.
pub fn summarize<I>(grades: I) -> GradeSummary
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pcts: Vec<f64> = grades
        .into_iter()
        .filter_map(|(marks, max)| percentage(marks, max))
        .collect();
    if pcts.is_empty() {
        return GradeSummary::default();
    }
    let avg = pcts.iter().sum::<f64>() / pcts.len() as f64;
    GradeSummary {
        count: pcts.len(),
        average_percentage: one_decimal(avg),
        letter_grade: Some(letter_grade(avg)),
    }
}

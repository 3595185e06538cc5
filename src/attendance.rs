use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::HalfDay => "HALF_DAY",
            AttendanceStatus::Excused => "EXCUSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => Some(AttendanceStatus::Present),
            "ABSENT" => Some(AttendanceStatus::Absent),
            "LATE" => Some(AttendanceStatus::Late),
            "HALF_DAY" => Some(AttendanceStatus::HalfDay),
            "EXCUSED" => Some(AttendanceStatus::Excused),
            _ => None,
        }
    }

    /// Credit toward the attendance percentage.
    fn credit(self) -> f64 {
        match self {
            AttendanceStatus::Present | AttendanceStatus::Late => 1.0,
            AttendanceStatus::HalfDay => 0.5,
            AttendanceStatus::Absent | AttendanceStatus::Excused => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AttendanceBand {
    pub fn for_percentage(p: f64) -> Self {
        if p >= 90.0 {
            AttendanceBand::Excellent
        } else if p >= 75.0 {
            AttendanceBand::Good
        } else if p >= 60.0 {
            AttendanceBand::Fair
        } else {
            AttendanceBand::Poor
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub marked_days: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub half_day: usize,
    pub excused: usize,
    pub percentage: f64,
    pub band: Option<AttendanceBand>,
}

/// Percentage over all marked days, rounded to one decimal. No marked
/// days yields 0 with no band.
pub fn summarize<I>(statuses: I) -> AttendanceSummary
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let mut s = AttendanceSummary::default();
    let mut credit = 0.0;
    for status in statuses {
        s.marked_days += 1;
        credit += status.credit();
        match status {
            AttendanceStatus::Present => s.present += 1,
            AttendanceStatus::Absent => s.absent += 1,
            AttendanceStatus::Late => s.late += 1,
            AttendanceStatus::HalfDay => s.half_day += 1,
            AttendanceStatus::Excused => s.excused += 1,
        }
    }
    if s.marked_days > 0 {
        let pct = 100.0 * credit / s.marked_days as f64;
        s.percentage = (pct * 10.0).round() / 10.0;
        s.band = Some(AttendanceBand::for_percentage(s.percentage));
    }
    s
}

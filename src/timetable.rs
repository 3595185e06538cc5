//! Weekly timetable layout.

use crate::repo::timetable::TimetableEntry;
use serde::Serialize;

/// (id, name, short name), Monday first.
pub const DAYS_OF_WEEK: [(u8, &str, &str); 7] = [
    (1, "Monday", "Mon"),
    (2, "Tuesday", "Tue"),
    (3, "Wednesday", "Wed"),
    (4, "Thursday", "Thu"),
    (5, "Friday", "Fri"),
    (6, "Saturday", "Sat"),
    (7, "Sunday", "Sun"),
];

/// Hour marks shown down the side of the week grid.
pub const TIME_SLOTS: [&str; 10] = [
    "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

pub fn day_name(day: u8) -> Option<&'static str> {
    DAYS_OF_WEEK
        .iter()
        .find(|(id, _, _)| *id == day)
        .map(|(_, name, _)| *name)
}

/// "13:30" -> "1:30 PM", "00:15" -> "12:15 AM". Unparseable input is
/// returned unchanged.
pub fn format_time(time: &str) -> String {
    let Some((h, m)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(hour) = h.parse::<u32>() else {
        return time.to_string();
    };
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{display}:{m} {ampm}")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day: u8,
    pub name: &'static str,
    pub short: &'static str,
    pub entries: Vec<TimetableEntry>,
}

/// One bucket per weekday, each sorted by start time.
pub fn week_layout(entries: &[TimetableEntry]) -> Vec<DaySchedule> {
    DAYS_OF_WEEK
        .iter()
        .map(|&(day, name, short)| {
            let mut day_entries: Vec<TimetableEntry> = entries
                .iter()
                .filter(|e| e.day_of_week == day)
                .cloned()
                .collect();
            day_entries.sort_by(|a, b| a.start_time.cmp(&b.start_time));
            DaySchedule {
                day,
                name,
                short,
                entries: day_entries,
            }
        })
        .collect()
}

/// A single day's schedule; `None` for a day number outside 1..=7.
pub fn day_view(entries: &[TimetableEntry], day: u8) -> Option<DaySchedule> {
    week_layout(entries).into_iter().find(|d| d.day == day)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRow<'a> {
    pub time: &'static str,
    pub label: String,
    /// One cell per weekday, Monday first.
    pub cells: Vec<Option<&'a TimetableEntry>>,
}

/// Hourly grid: each cell holds the earliest entry that covers the slot,
/// i.e. `start_time <= slot < end_time`. Times are zero-padded `HH:MM`,
/// so string order is clock order.
pub fn slot_grid(entries: &[TimetableEntry]) -> Vec<SlotRow<'_>> {
    let mut sorted: Vec<&TimetableEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    TIME_SLOTS
        .iter()
        .map(|&slot| SlotRow {
            time: slot,
            label: format_time(slot),
            cells: DAYS_OF_WEEK
                .iter()
                .map(|&(day, _, _)| {
                    sorted
                        .iter()
                        .copied()
                        .find(|e| {
                            e.day_of_week == day
                                && e.start_time.as_str() <= slot
                                && e.end_time.as_str() > slot
                        })
                })
                .collect(),
        })
        .collect()
}

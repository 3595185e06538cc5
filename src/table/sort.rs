use super::value::{Record, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    /// `None` keeps source order.
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: same key flips direction, a new key starts ascending.
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Asc;
        }
    }
}

fn non_null(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

/// Orders two records by `sort_key`. Absent and null values go last in
/// both directions.
pub fn compare(a: &Record, b: &Record, sort_key: Option<&str>, direction: SortDirection) -> Ordering {
    let Some(key) = sort_key else {
        return Ordering::Equal;
    };
    match (non_null(a.get(key)), non_null(b.get(key))) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = x.natural_cmp(y);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Stable in-place sort of rows, each resolved to its record by `record_of`.
pub fn sort_rows<'r, T, F>(rows: &mut [T], state: &SortState, record_of: F)
where
    F: Fn(&T) -> &'r Record,
{
    if state.key.is_none() {
        return;
    }
    rows.sort_by(|a, b| compare(record_of(a), record_of(b), state.key.as_deref(), state.direction));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, score: Option<i64>) -> Record {
        Record::new().with("id", id).with("score", score)
    }

    fn ids(rows: &[&Record]) -> Vec<i64> {
        rows.iter()
            .map(|r| match r.get("id") {
                Some(Value::Int(i)) => *i,
                _ => -1,
            })
            .collect()
    }

    #[test]
    fn no_key_preserves_order() {
        let data = [rec(3, Some(1)), rec(1, Some(2)), rec(2, Some(3))];
        let mut rows: Vec<&Record> = data.iter().collect();
        sort_rows(&mut rows, &SortState::default(), |r| *r);
        assert_eq!(ids(&rows), vec![3, 1, 2]);
    }

    #[test]
    fn equal_keys_keep_relative_order() {
        let data = [rec(1, Some(5)), rec(2, Some(1)), rec(3, Some(5)), rec(4, Some(1))];
        let mut rows: Vec<&Record> = data.iter().collect();
        let mut state = SortState::default();
        state.toggle("score");
        sort_rows(&mut rows, &state, |r| *r);
        assert_eq!(ids(&rows), vec![2, 4, 1, 3]);

        state.toggle("score");
        let mut rows: Vec<&Record> = data.iter().collect();
        sort_rows(&mut rows, &state, |r| *r);
        assert_eq!(ids(&rows), vec![1, 3, 2, 4]);
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let data = [
            rec(1, None),
            rec(2, Some(10)),
            Record::new().with("id", 3i64),
            rec(4, Some(20)),
        ];
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let state = SortState {
                key: Some("score".into()),
                direction,
            };
            let mut rows: Vec<&Record> = data.iter().collect();
            sort_rows(&mut rows, &state, |r| *r);
            let got = ids(&rows);
            assert_eq!(&got[2..], &[1, 3], "{direction:?}");
        }
    }

    #[test]
    fn toggle_sequence() {
        let mut s = SortState::default();
        s.toggle("name");
        assert_eq!(s.direction, SortDirection::Asc);
        s.toggle("name");
        assert_eq!(s.direction, SortDirection::Desc);
        s.toggle("name");
        assert_eq!(s.direction, SortDirection::Asc);
        s.toggle("name");
        s.toggle("class");
        assert_eq!(s.key.as_deref(), Some("class"));
        assert_eq!(s.direction, SortDirection::Asc);
    }
}

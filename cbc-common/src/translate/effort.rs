//! Effort per transport mode and its totals

use super::numeric::{parse_number, round_for_report};
use crate::db::models::ObservationRecord;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

vocabulary! {
    /// Effort qualifier on `hours` and `miles` observations
    pub enum EffortMode {
        Foot => "foot",
        Vehicle => "vehicle",
        CrossCountrySki => "cross country ski",
        FeederWatching => "feeder watching",
    }
}

impl EffortMode {
    /// Feeder watching has hours but no distance
    pub fn has_distance(self) -> bool {
        !matches!(self, EffortMode::FeederWatching)
    }
}

impl PartialOrd for EffortMode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EffortMode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let position = |m: &EffortMode| EffortMode::ALL.iter().position(|a| a == m);
        position(self).cmp(&position(other))
    }
}

/// Hours and miles for one mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModeEffort {
    pub hours: Option<f64>,
    pub miles: Option<f64>,
}

/// Effort observations keyed by mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effort {
    modes: BTreeMap<EffortMode, ModeEffort>,
}

impl Effort {
    /// Collect `hours` and `miles` records; other names and unknown modes are ignored
    pub fn from_records(records: &[ObservationRecord]) -> Result<Self> {
        let mut effort = Effort::default();
        for record in records {
            let Some(mode) = EffortMode::from_term(&record.qualifier) else {
                continue;
            };
            if record.value.trim().is_empty() {
                continue;
            }

            let field = format!("{} {}", record.name, record.qualifier);
            match record.name.as_str() {
                "hours" => effort.set_hours(mode, parse_number(&field, &record.value)?),
                "miles" => effort.set_miles(mode, parse_number(&field, &record.value)?),
                _ => {}
            }
        }
        Ok(effort)
    }

    pub fn set_hours(&mut self, mode: EffortMode, hours: f64) {
        self.modes.entry(mode).or_default().hours = Some(hours);
    }

    /// Ignored for modes without distance
    pub fn set_miles(&mut self, mode: EffortMode, miles: f64) {
        if mode.has_distance() {
            self.modes.entry(mode).or_default().miles = Some(miles);
        }
    }

    pub fn mode(&self, mode: EffortMode) -> ModeEffort {
        self.modes.get(&mode).copied().unwrap_or_default()
    }

    /// Sum over every mode, absent modes counting as zero; `None` if no mode has hours
    pub fn total_hours(&self) -> Option<f64> {
        sum(self.modes.values().map(|m| m.hours))
    }

    /// Sum over distance modes; `None` if no mode has miles
    pub fn total_miles(&self) -> Option<f64> {
        sum(self
            .modes
            .iter()
            .filter(|(mode, _)| mode.has_distance())
            .map(|(_, m)| m.miles))
    }

    /// Rounded total hours for a destination that requires it
    pub fn required_total_hours(&self) -> Result<i64> {
        self.total_hours()
            .map(round_for_report)
            .ok_or_else(|| Error::MissingRequiredField("total effort hours".to_string()))
    }

    /// Rounded total miles for a destination that requires it
    pub fn required_total_miles(&self) -> Result<i64> {
        self.total_miles()
            .map(round_for_report)
            .ok_or_else(|| Error::MissingRequiredField("total effort miles".to_string()))
    }
}

fn sum(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |total, v| Some(total.unwrap_or(0.0) + v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, qualifier: &str, value: &str) -> ObservationRecord {
        ObservationRecord {
            kind: "effort".to_string(),
            name: name.to_string(),
            qualifier: qualifier.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_absent_modes_count_as_zero() {
        let effort = Effort::from_records(&[
            record("hours", "foot", "2"),
            record("hours", "vehicle", "3"),
            record("hours", "feeder watching", "1"),
        ])
        .unwrap();
        assert_eq!(effort.total_hours(), Some(6.0));
        assert_eq!(effort.required_total_hours().unwrap(), 6);
    }

    #[test]
    fn test_feeder_watching_has_no_miles() {
        let mut effort = Effort::default();
        effort.set_miles(EffortMode::FeederWatching, 4.0);
        effort.set_miles(EffortMode::CrossCountrySki, 2.5);
        effort.set_miles(EffortMode::Foot, 1.0);
        assert_eq!(effort.total_miles(), Some(3.5));
        assert_eq!(effort.mode(EffortMode::FeederWatching).miles, None);
    }

    #[test]
    fn test_all_absent_required_total_is_missing() {
        let effort = Effort::from_records(&[record("field counters", "", "12")]).unwrap();
        assert_eq!(effort.total_hours(), None);
        assert!(matches!(
            effort.required_total_miles(),
            Err(Error::MissingRequiredField(_))
        ));
    }

    #[test]
    fn test_malformed_hours_is_value_format() {
        let err = Effort::from_records(&[record("hours", "foot", "two")]).unwrap_err();
        match err {
            Error::ValueFormat { field, value } => {
                assert_eq!(field, "hours foot");
                assert_eq!(value, "two");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

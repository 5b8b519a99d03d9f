//! Species counts and total-species eligibility
//!
//! A species contributes to the total species count only when it is on the
//! expected list, its count is not a count-week entry, and it is on the real
//! list. Each gate is checked independently; failing one never hides the
//! individual count.

use crate::db::models::{normalize, ObservationRecord};
use serde::Serialize;

/// Membership tests against the two species reference lists
pub trait Checklist {
    fn is_expected(&self, common_name: &str) -> bool;
    fn is_real(&self, common_name: &str) -> bool;
}

/// Reason a species is left out of the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    NotExpected,
    CountWeek,
    NotReal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reasons", rename_all = "snake_case")]
pub enum Eligibility {
    Counted,
    Excluded(Vec<Exclusion>),
}

impl Eligibility {
    pub fn is_counted(&self) -> bool {
        matches!(self, Eligibility::Counted)
    }

    pub fn excluded_for(&self, exclusion: Exclusion) -> bool {
        matches!(self, Eligibility::Excluded(reasons) if reasons.contains(&exclusion))
    }
}

/// Count-week values end in the configured marker, e.g. `3 cwp`
pub fn is_count_week(value: &str, suffix: &str) -> bool {
    let suffix = normalize(suffix);
    !suffix.is_empty() && normalize(value).ends_with(&suffix)
}

pub fn eligibility(
    common_name: &str,
    count: &str,
    checklist: &dyn Checklist,
    count_week_suffix: &str,
) -> Eligibility {
    let mut reasons = Vec::new();
    if !checklist.is_expected(common_name) {
        reasons.push(Exclusion::NotExpected);
    }
    if is_count_week(count, count_week_suffix) {
        reasons.push(Exclusion::CountWeek);
    }
    if !checklist.is_real(common_name) {
        reasons.push(Exclusion::NotReal);
    }

    if reasons.is_empty() {
        Eligibility::Counted
    } else {
        Eligibility::Excluded(reasons)
    }
}

/// One reported species count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesCount {
    pub common_name: String,
    /// Raw count as recorded, count-week marker included
    pub count: String,
    pub eligibility: Eligibility,
}

/// Every species count plus the total species figure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpeciesTally {
    pub species: Vec<SpeciesCount>,
    pub total_species: usize,
}

impl SpeciesTally {
    /// Tally `species`/`count` records, qualifier being the common name
    pub fn from_records(
        records: &[ObservationRecord],
        checklist: &dyn Checklist,
        count_week_suffix: &str,
    ) -> Self {
        let species: Vec<SpeciesCount> = records
            .iter()
            .map(|r| SpeciesCount {
                common_name: r.qualifier.clone(),
                count: r.value.clone(),
                eligibility: eligibility(&r.qualifier, &r.value, checklist, count_week_suffix),
            })
            .collect();
        let total_species = species.iter().filter(|s| s.eligibility.is_counted()).count();

        Self {
            species,
            total_species,
        }
    }

    pub fn get(&self, common_name: &str) -> Option<&SpeciesCount> {
        let name = normalize(common_name);
        self.species.iter().find(|s| s.common_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lists {
        expected: Vec<&'static str>,
        real: Vec<&'static str>,
    }

    impl Checklist for Lists {
        fn is_expected(&self, common_name: &str) -> bool {
            self.expected.iter().any(|n| *n == common_name)
        }

        fn is_real(&self, common_name: &str) -> bool {
            self.real.iter().any(|n| *n == common_name)
        }
    }

    fn count(name: &str, value: &str) -> ObservationRecord {
        ObservationRecord {
            kind: "species".to_string(),
            name: "count".to_string(),
            qualifier: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_count_week_suffix_case_insensitive() {
        assert!(is_count_week("3 cwp", "cwp"));
        assert!(is_count_week("3 CWP", "cwp"));
        assert!(is_count_week("cw", "CW"));
        assert!(!is_count_week("3", "cwp"));
        assert!(!is_count_week("3", ""));
    }

    #[test]
    fn test_total_counts_only_fully_eligible_species() {
        let lists = Lists {
            expected: vec!["a", "b", "c"],
            real: vec!["a", "b"],
        };
        let tally = SpeciesTally::from_records(
            &[count("a", "5"), count("b", "3 cwp"), count("c", "1")],
            &lists,
            "cwp",
        );

        assert_eq!(tally.total_species, 1);
        assert!(tally.get("a").unwrap().eligibility.is_counted());
        assert!(tally
            .get("b")
            .unwrap()
            .eligibility
            .excluded_for(Exclusion::CountWeek));
        // Still reported individually
        let c = tally.get("c").unwrap();
        assert_eq!(c.count, "1");
        assert!(c.eligibility.excluded_for(Exclusion::NotReal));
    }

    #[test]
    fn test_gates_are_independent() {
        let lists = Lists {
            expected: vec![],
            real: vec![],
        };
        assert_eq!(
            eligibility("gull sp.", "2 cwp", &lists, "cwp"),
            Eligibility::Excluded(vec![
                Exclusion::NotExpected,
                Exclusion::CountWeek,
                Exclusion::NotReal
            ])
        );
    }
}

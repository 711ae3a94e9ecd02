//! Employee-skill records and the normalization that produces them.
//!
//! Raw rows arrive with free-text proficiency labels, inconsistent casing and
//! the odd missing field. [`normalize`] turns them into clean
//! [`EmployeeSkillRecord`]s:
//!
//! - skill names are trimmed and upper-cased
//! - proficiency labels map to a 1-4 score, unknown labels to 2
//! - rows without a skill, employee id or experience value are dropped, so
//!   they count toward no skill's headcount
//! - duplicate (employee, skill) pairs keep their first occurrence

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Score used when a proficiency label is missing or unrecognized.
pub const DEFAULT_PROFICIENCY_SCORE: u8 = 2;

/// One employee's holding of one skill, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSkillRecord {
    /// Employee identifier.
    pub employee_id: String,
    /// Canonical (upper-case) skill name.
    pub skill: String,
    /// Proficiency in [1, 4].
    pub proficiency_score: u8,
    /// Years of experience with the skill.
    pub years_experience: u32,
}

impl EmployeeSkillRecord {
    /// Build a record from already-clean values.
    pub fn new(
        employee_id: impl Into<String>,
        skill: impl Into<String>,
        proficiency_score: u8,
        years_experience: u32,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            skill: skill.into(),
            proficiency_score,
            years_experience,
        }
    }
}

/// A row as it comes out of the raw inventory export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSkillRecord {
    /// Employee identifier.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Skill name, any casing.
    #[serde(default)]
    pub skill: Option<String>,
    /// Proficiency label such as `"Advanced"`.
    #[serde(default)]
    pub proficiency: Option<String>,
    /// Department; accepted in input but not used by cleaning or clustering.
    #[serde(default)]
    pub department: Option<String>,
    /// Years of experience.
    #[serde(default)]
    pub years_experience: Option<i64>,
}

/// Map a proficiency label to its numeric score.
///
/// ```rust
/// use skill_clusters::record::proficiency_score;
///
/// assert_eq!(proficiency_score(Some(" expert ")), 4);
/// assert_eq!(proficiency_score(Some("guru")), 2);
/// assert_eq!(proficiency_score(None), 2);
/// ```
pub fn proficiency_score(label: Option<&str>) -> u8 {
    let Some(label) = label else {
        return DEFAULT_PROFICIENCY_SCORE;
    };
    match label.trim().to_uppercase().as_str() {
        "BEGINNER" => 1,
        "INTERMEDIATE" => 2,
        "ADVANCED" => 3,
        "EXPERT" => 4,
        _ => DEFAULT_PROFICIENCY_SCORE,
    }
}

/// Counts from one [`normalize`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    /// Rows read.
    pub read: usize,
    /// Rows dropped for missing or invalid fields.
    pub dropped: usize,
    /// Rows dropped as duplicate (employee, skill) pairs.
    pub duplicates: usize,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Clean raw rows into records the feature builder accepts.
pub fn normalize<I>(rows: I) -> (Vec<EmployeeSkillRecord>, NormalizationStats)
where
    I: IntoIterator<Item = RawSkillRecord>,
{
    let mut stats = NormalizationStats::default();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out = Vec::new();

    for row in rows {
        stats.read += 1;

        let (Some(employee_id), Some(skill)) = (
            non_blank(row.employee_id.as_deref()),
            non_blank(row.skill.as_deref()),
        ) else {
            stats.dropped += 1;
            continue;
        };

        let years = match row.years_experience.map(u32::try_from) {
            Some(Ok(years)) => years,
            _ => {
                debug!(employee_id, skill, "dropping row without usable years_experience");
                stats.dropped += 1;
                continue;
            }
        };

        let skill = skill.to_uppercase();
        if !seen.insert((employee_id.to_string(), skill.clone())) {
            stats.duplicates += 1;
            continue;
        }

        out.push(EmployeeSkillRecord {
            employee_id: employee_id.to_string(),
            skill,
            proficiency_score: proficiency_score(row.proficiency.as_deref()),
            years_experience: years,
        });
    }

    if stats.dropped > 0 {
        warn!(
            dropped = stats.dropped,
            read = stats.read,
            "dropped rows with missing fields"
        );
    }

    (out, stats)
}

//! Aggregation of employee-skill records into per-skill feature vectors.

use crate::config::FeatureDimension;
use crate::error::{Error, Result};
use crate::record::EmployeeSkillRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Numeric summary of one skill across every employee who holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillFeatureVector {
    /// Skill name (unique key).
    pub skill: String,
    /// Distinct employees holding the skill.
    pub employee_count: usize,
    /// Mean proficiency score.
    pub avg_proficiency: f64,
    /// Mean years of experience.
    pub avg_experience: f64,
}

impl SkillFeatureVector {
    /// Value along one dimension.
    pub fn get(&self, dim: FeatureDimension) -> f64 {
        match dim {
            FeatureDimension::EmployeeCount => self.employee_count as f64,
            FeatureDimension::AvgProficiency => self.avg_proficiency,
            FeatureDimension::AvgExperience => self.avg_experience,
        }
    }
}

#[derive(Default)]
struct Accumulator<'a> {
    employees: HashSet<&'a str>,
    rows: usize,
    proficiency_sum: u64,
    experience_sum: u64,
}

/// Groups records by skill and computes one [`SkillFeatureVector`] per group.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self
    }

    /// Aggregate records into a skill-keyed map.
    ///
    /// The map is ordered by skill name, so the result does not depend on the
    /// order of `records`. Skills with no records are absent.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRecord`] if a record has a blank skill or employee id,
    /// or a proficiency score outside [1, 4].
    pub fn build(
        &self,
        records: &[EmployeeSkillRecord],
    ) -> Result<BTreeMap<String, SkillFeatureVector>> {
        let mut groups: BTreeMap<&str, Accumulator<'_>> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            check_record(index, record)?;
            let acc = groups.entry(record.skill.as_str()).or_default();
            acc.employees.insert(record.employee_id.as_str());
            acc.rows += 1;
            acc.proficiency_sum += u64::from(record.proficiency_score);
            acc.experience_sum += u64::from(record.years_experience);
        }

        Ok(groups
            .into_iter()
            .map(|(skill, acc)| {
                let rows = acc.rows as f64;
                let vector = SkillFeatureVector {
                    skill: skill.to_string(),
                    employee_count: acc.employees.len(),
                    avg_proficiency: acc.proficiency_sum as f64 / rows,
                    avg_experience: acc.experience_sum as f64 / rows,
                };
                (vector.skill.clone(), vector)
            })
            .collect())
    }
}

fn check_record(index: usize, record: &EmployeeSkillRecord) -> Result<()> {
    let reason = if record.skill.trim().is_empty() {
        "missing skill".to_string()
    } else if record.employee_id.trim().is_empty() {
        "missing employee_id".to_string()
    } else if !(1..=4).contains(&record.proficiency_score) {
        format!(
            "proficiency_score {} outside [1, 4]",
            record.proficiency_score
        )
    } else {
        return Ok(());
    };
    Err(Error::MalformedRecord { index, reason })
}

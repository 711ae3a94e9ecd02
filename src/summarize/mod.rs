//! Per-cluster statistics and the skill-to-cluster table.
//!
//! Turns a label vector back into something a person reads: which skills
//! landed together, how many employees those skills cover, and the typical
//! proficiency and experience inside each group.

use crate::error::{Error, Result};
use crate::features::SkillFeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One skill's cluster label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// Skill name.
    pub skill: String,
    /// Cluster label; arbitrary, carries no ordering meaning.
    pub cluster_id: usize,
}

/// Aggregate statistics of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster label.
    pub cluster_id: usize,
    /// Skills in the cluster.
    pub num_skills: usize,
    /// Sum of `employee_count` over those skills.
    pub total_employees: usize,
    /// Unweighted mean of the skills' `avg_proficiency`.
    pub avg_cluster_proficiency: f64,
    /// Unweighted mean of the skills' `avg_experience`.
    pub avg_cluster_experience: f64,
}

/// An assignment joined with the skill's features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillClusterRow {
    /// Skill name.
    pub skill: String,
    /// Distinct employees holding the skill.
    pub employee_count: usize,
    /// Mean proficiency score.
    pub avg_proficiency: f64,
    /// Mean years of experience.
    pub avg_experience: f64,
    /// Cluster label.
    pub cluster_id: usize,
}

/// Zip skill names with labels.
pub fn assignments(skills: &[String], labels: &[usize]) -> Result<Vec<ClusterAssignment>> {
    if skills.len() != labels.len() {
        return Err(Error::ShapeMismatch {
            expected: format!("{} labels", skills.len()),
            actual: format!("{} labels", labels.len()),
        });
    }
    Ok(skills
        .iter()
        .zip(labels)
        .map(|(skill, &cluster_id)| ClusterAssignment {
            skill: skill.clone(),
            cluster_id,
        })
        .collect())
}

/// Aggregates assignments into [`ClusterSummary`] rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterSummarizer;

impl ClusterSummarizer {
    /// Create a new summarizer.
    pub fn new() -> Self {
        Self
    }

    /// Join every assignment with its skill's feature vector.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] if an assigned skill has no feature vector, a
    /// skill is assigned twice, or a feature vector is left unassigned.
    pub fn join(
        &self,
        assignments: &[ClusterAssignment],
        features: &[SkillFeatureVector],
    ) -> Result<Vec<SkillClusterRow>> {
        let by_skill: HashMap<&str, &SkillFeatureVector> =
            features.iter().map(|f| (f.skill.as_str(), f)).collect();
        if by_skill.len() != assignments.len() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} assignments (one per skill)", by_skill.len()),
                actual: format!("{} assignments", assignments.len()),
            });
        }

        let mut seen = std::collections::HashSet::with_capacity(assignments.len());
        assignments
            .iter()
            .map(|a| {
                let f = by_skill.get(a.skill.as_str()).ok_or_else(|| Error::ShapeMismatch {
                    expected: "feature vector for every assigned skill".to_string(),
                    actual: format!("none for '{}'", a.skill),
                })?;
                if !seen.insert(a.skill.as_str()) {
                    return Err(Error::ShapeMismatch {
                        expected: "one assignment per skill".to_string(),
                        actual: format!("'{}' assigned twice", a.skill),
                    });
                }
                Ok(SkillClusterRow {
                    skill: a.skill.clone(),
                    employee_count: f.employee_count,
                    avg_proficiency: f.avg_proficiency,
                    avg_experience: f.avg_experience,
                    cluster_id: a.cluster_id,
                })
            })
            .collect()
    }

    /// One summary per distinct cluster id, ordered by id.
    pub fn summarize(
        &self,
        assignments: &[ClusterAssignment],
        features: &[SkillFeatureVector],
    ) -> Result<Vec<ClusterSummary>> {
        let rows = self.join(assignments, features)?;
        Ok(Self::summarize_rows(&rows))
    }

    /// Summaries from an already-joined table.
    pub fn summarize_rows(rows: &[SkillClusterRow]) -> Vec<ClusterSummary> {
        let mut groups: BTreeMap<usize, Vec<&SkillClusterRow>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.cluster_id).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(cluster_id, members)| {
                let n = members.len() as f64;
                ClusterSummary {
                    cluster_id,
                    num_skills: members.len(),
                    total_employees: members.iter().map(|r| r.employee_count).sum(),
                    avg_cluster_proficiency: members.iter().map(|r| r.avg_proficiency).sum::<f64>()
                        / n,
                    avg_cluster_experience: members.iter().map(|r| r.avg_experience).sum::<f64>()
                        / n,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(skill: &str, count: usize, prof: f64, exp: f64) -> SkillFeatureVector {
        SkillFeatureVector {
            skill: skill.to_string(),
            employee_count: count,
            avg_proficiency: prof,
            avg_experience: exp,
        }
    }

    fn assign(skill: &str, cluster_id: usize) -> ClusterAssignment {
        ClusterAssignment {
            skill: skill.to_string(),
            cluster_id,
        }
    }

    #[test]
    fn test_summary_is_unweighted() {
        let features = vec![fv("A", 10, 4.0, 10.0), fv("B", 1, 2.0, 0.0), fv("C", 3, 1.0, 1.0)];
        let assignments = vec![assign("A", 1), assign("B", 1), assign("C", 0)];
        let summaries = ClusterSummarizer::new()
            .summarize(&assignments, &features)
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].cluster_id, 0);
        let s = &summaries[1];
        assert_eq!(s.num_skills, 2);
        assert_eq!(s.total_employees, 11);
        assert!((s.avg_cluster_proficiency - 3.0).abs() < 1e-12);
        assert!((s.avg_cluster_experience - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_num_skills_sum_to_total() {
        let features: Vec<_> = (0..9).map(|i| fv(&format!("S{i}"), i + 1, 2.0, i as f64)).collect();
        let assignments: Vec<_> = (0..9).map(|i| assign(&format!("S{i}"), i % 4)).collect();
        let summaries = ClusterSummarizer::new()
            .summarize(&assignments, &features)
            .unwrap();
        assert_eq!(summaries.iter().map(|s| s.num_skills).sum::<usize>(), 9);
        assert_eq!(summaries.len(), 4);
    }

    #[test]
    fn test_join_rejects_unknown_skill() {
        let features = vec![fv("A", 1, 1.0, 1.0)];
        let err = ClusterSummarizer::new()
            .join(&[assign("Z", 0)], &features)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_join_rejects_double_assignment() {
        let features = vec![fv("A", 1, 1.0, 1.0), fv("B", 1, 1.0, 1.0)];
        let err = ClusterSummarizer::new()
            .join(&[assign("A", 0), assign("A", 1)], &features)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_assignments_zip() {
        let skills = vec!["A".to_string(), "B".to_string()];
        let a = assignments(&skills, &[1, 0]).unwrap();
        assert_eq!(a[1], assign("B", 0));
        assert!(assignments(&skills, &[0]).is_err());
    }
}

//! Job-posting input validation.
//!
//! Request bodies arrive as loosely-typed [`JobInput`] and are checked once,
//! at the boundary, before anything reaches the store.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{EmploymentType, JobPosting, JobStatus};

/// Body of `POST /api/jobs` and `PUT /api/jobs/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        bail!("{} must not be empty", field);
    }
    Ok(v.to_string())
}

impl JobInput {
    /// Validate and build a new posting with a fresh id.
    pub fn into_new_posting(self, now: DateTime<Utc>) -> Result<JobPosting> {
        self.into_posting(Uuid::new_v4().to_string(), now, now)
    }

    /// Validate and build a replacement for an existing posting.
    pub fn into_replacement(self, existing: &JobPosting, now: DateTime<Utc>) -> Result<JobPosting> {
        self.into_posting(existing.id.clone(), existing.created_at, now)
    }

    fn into_posting(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<JobPosting> {
        let title = required("title", &self.title)?;
        let department = required("department", &self.department)?;
        let location = required("location", &self.location)?;
        let description = required("description", &self.description)?;
        let employment_type: EmploymentType = self.employment_type.parse()?;
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => JobStatus::default(),
            Some(s) => s.parse()?,
        };
        let requirements = self
            .requirements
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        let salary_range = self
            .salary_range
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(JobPosting {
            id,
            title,
            department,
            location,
            employment_type,
            description,
            requirements,
            salary_range,
            status,
            created_at,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid() -> JobInput {
        JobInput {
            title: " Applied Scientist ".to_string(),
            department: "Research".to_string(),
            location: "Remote (EU)".to_string(),
            employment_type: "full-time".to_string(),
            description: "Own evaluation pipelines.".to_string(),
            requirements: vec!["Python".to_string(), "  ".to_string()],
            salary_range: Some("".to_string()),
            status: None,
        }
    }

    #[test]
    fn test_valid_input_normalizes() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let job = valid().into_new_posting(now).unwrap();
        assert_eq!(job.title, "Applied Scientist");
        assert_eq!(job.status, JobStatus::Draft);
        assert_eq!(job.requirements, vec!["Python"]);
        assert!(job.salary_range.is_none());
        assert_eq!(job.created_at, now);
        assert!(!job.id.is_empty());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut input = valid();
        input.title = "   ".to_string();
        let err = input.into_new_posting(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("title must not be empty"));
    }

    #[test]
    fn test_unknown_employment_type_rejected() {
        let mut input = valid();
        input.employment_type = "gig".to_string();
        let err = input.into_new_posting(Utc::now()).unwrap_err();
        assert!(err.to_string().contains("invalid employment type"));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut input = valid();
        input.status = Some("paused".to_string());
        assert!(input.into_new_posting(Utc::now()).is_err());
    }

    #[test]
    fn test_replacement_keeps_identity() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let existing = valid().into_new_posting(created).unwrap();

        let mut input = valid();
        input.status = Some("open".to_string());
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let replaced = input.into_replacement(&existing, later).unwrap();
        assert_eq!(replaced.id, existing.id);
        assert_eq!(replaced.created_at, created);
        assert_eq!(replaced.updated_at, later);
        assert_eq!(replaced.status, JobStatus::Open);
    }
}

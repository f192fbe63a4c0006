// src/types/jobs.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Job posting reduced to what a job card and its detail modal display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub job_id: String,
    pub job_title: String,
    pub employer_name: String,
    pub job_description: String,
    pub job_location: String,
    pub job_salary: Option<String>,
    pub job_employment_type: String,
    pub job_apply_link: String,
    pub job_posted_at: String,
    pub job_is_remote: Option<bool>,
    pub employer_logo: Option<String>,
    /// Section name (e.g. "Qualifications") to bullet points
    pub job_highlights: Option<BTreeMap<String, Vec<String>>>,
}

impl JobCard {
    pub fn to_saved_job(&self) -> SavedJob {
        SavedJob {
            job_id: self.job_id.clone(),
            job_title: self.job_title.clone(),
            company_name: self.employer_name.clone(),
            job_link: self.job_apply_link.clone(),
        }
    }
}

/// Entry of a user's saved or applied job list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedJob {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub job_link: String,
}

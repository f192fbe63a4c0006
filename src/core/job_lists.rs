// src/core/job_lists.rs
use anyhow::Result;
use sqlx::SqlitePool;

use super::database::now_timestamp;
use crate::types::SavedJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobList {
    Saved,
    Applied,
}

impl JobList {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobList::Saved => "saved",
            JobList::Applied => "applied",
        }
    }
}

pub struct JobListRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobListRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a job to a list. Returns `false` when it was already there.
    pub async fn add(&self, user_id: i64, list: JobList, job: &SavedJob) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO job_bookmarks
                (user_id, list, job_id, job_title, company_name, job_link, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(list.as_str())
        .bind(&job.job_id)
        .bind(&job.job_title)
        .bind(&job.company_name)
        .bind(&job.job_link)
        .bind(now_timestamp())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a job from a list. Returns `false` when it was not there.
    pub async fn remove(&self, user_id: i64, list: JobList, job_id: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM job_bookmarks WHERE user_id = ? AND list = ? AND job_id = ?")
                .bind(user_id)
                .bind(list.as_str())
                .bind(job_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Jobs in insertion order
    pub async fn list(&self, user_id: i64, list: JobList) -> Result<Vec<SavedJob>> {
        let jobs = sqlx::query_as::<_, SavedJob>(
            r#"
            SELECT job_id, job_title, company_name, job_link
            FROM job_bookmarks
            WHERE user_id = ? AND list = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(list.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(jobs)
    }
}

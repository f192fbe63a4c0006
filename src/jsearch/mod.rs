// src/jsearch/mod.rs
//! Client for the JSearch job-search API (RapidAPI) and the projection of its
//! postings into job cards

pub mod cards;
pub mod client;
pub mod params;
pub mod types;

pub use client::JSearchClient;
pub use params::{DatePosted, EmploymentType, JobRequirement, SearchParams};
pub use types::{RawJob, SearchResponse};

use anyhow::Result;

/// Job search backend used by the chat service
#[rocket::async_trait]
pub trait JobSearch: Send + Sync {
    async fn search_jobs(&self, params: &SearchParams) -> Result<SearchResponse>;

    /// Details of a single posting, `None` when the provider knows no such job
    async fn job_details(&self, job_id: &str, country: &str) -> Result<Option<RawJob>>;
}

// src/session/job_modal.rs
use crate::types::JobCard;

/// Full details of one job, shown over the chat
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDetailModal {
    job: Option<JobCard>,
}

impl JobDetailModal {
    /// Show `job`, replacing whatever was open
    pub fn open(&mut self, job: JobCard) {
        self.job = Some(job);
    }

    pub fn close(&mut self) {
        self.job = None;
    }

    pub fn is_open(&self) -> bool {
        self.job.is_some()
    }

    pub fn job(&self) -> Option<&JobCard> {
        self.job.as_ref()
    }

    /// Close the modal and hand back the job id to ask the assistant about
    pub fn ask_about(&mut self) -> Option<String> {
        self.job.take().map(|job| job.job_id)
    }
}

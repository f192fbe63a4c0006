// src/session/job_board.rs
//! Paginated job cards with saved/applied state and the apply flow

use std::collections::HashSet;

use super::{ChatBackend, SessionError, SessionResult};
use crate::app_log;
use crate::types::{JobCard, SavedJob};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct JobBoard {
    cards: Vec<JobCard>,
    page: usize,
    page_size: usize,
    saved: HashSet<String>,
    applied: HashSet<String>,
    pending_apply: Option<SavedJob>,
}

impl Default for JobBoard {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl JobBoard {
    pub fn new(page_size: usize) -> Self {
        Self {
            cards: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            saved: HashSet::new(),
            applied: HashSet::new(),
            pending_apply: None,
        }
    }

    /// Replace the cards and go back to the first page
    pub fn set_cards(&mut self, cards: Vec<JobCard>) {
        self.cards = cards;
        self.page = 0;
    }

    pub fn clear(&mut self) {
        self.set_cards(Vec::new());
    }

    pub fn cards(&self) -> &[JobCard] {
        &self.cards
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.cards.len().div_ceil(self.page_size)
    }

    pub fn visible(&self) -> &[JobCard] {
        let start = (self.page * self.page_size).min(self.cards.len());
        let end = (start + self.page_size).min(self.cards.len());
        &self.cards[start..end]
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.has_next();
        if moved {
            self.page += 1;
        }
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.has_prev();
        if moved {
            self.page -= 1;
        }
        moved
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.min(self.page_count().saturating_sub(1));
    }

    /// One-based first and last visible position and the total, `None` when
    /// there are no cards
    pub fn range(&self) -> Option<(usize, usize, usize)> {
        if self.cards.is_empty() {
            return None;
        }
        let start = self.page * self.page_size + 1;
        let end = start + self.visible().len() - 1;
        Some((start, end, self.cards.len()))
    }

    pub fn range_label(&self) -> String {
        match self.range() {
            Some((start, end, total)) => format!("Showing {}-{} of {}", start, end, total),
            None => "No jobs".to_string(),
        }
    }

    /// Card on the current page, one-based
    pub fn visible_card(&self, position: usize) -> Option<&JobCard> {
        position
            .checked_sub(1)
            .and_then(|index| self.visible().get(index))
    }

    pub fn find(&self, job_id: &str) -> Option<&JobCard> {
        self.cards.iter().find(|c| c.job_id == job_id)
    }

    pub fn is_saved(&self, job_id: &str) -> bool {
        self.saved.contains(job_id)
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.applied.contains(job_id)
    }

    pub async fn load_lists(&mut self, backend: &dyn ChatBackend, email: &str) -> SessionResult<()> {
        let saved = backend.saved_jobs(email).await?;
        let applied = backend.applied_jobs(email).await?;
        self.saved = saved.into_iter().map(|j| j.job_id).collect();
        self.applied = applied.into_iter().map(|j| j.job_id).collect();
        Ok(())
    }

    /// Flip the saved state of `job`. Returns the new state; the flip is
    /// undone when the backend call fails.
    pub async fn toggle_save(
        &mut self,
        backend: &dyn ChatBackend,
        email: &str,
        job: &JobCard,
    ) -> SessionResult<bool> {
        let saved_job = job.to_saved_job();
        let was_saved = self.saved.contains(&job.job_id);

        let result = if was_saved {
            self.saved.remove(&job.job_id);
            backend.unsave_job(email, &saved_job).await
        } else {
            self.saved.insert(job.job_id.clone());
            backend.save_job(email, &saved_job).await
        };

        match result {
            Ok(()) => Ok(!was_saved),
            Err(e) => {
                app_log!(warn, "Toggling saved state of {} failed: {}", job.job_id, e);
                if was_saved {
                    self.saved.insert(job.job_id.clone());
                } else {
                    self.saved.remove(&job.job_id);
                }
                Err(SessionError::Backend(e))
            }
        }
    }

    /// Start applying: returns the link to open and waits for confirmation
    pub fn begin_apply(&mut self, job: &JobCard) -> SessionResult<String> {
        if self.is_applied(&job.job_id) {
            return Err(SessionError::AlreadyApplied);
        }
        self.pending_apply = Some(job.to_saved_job());
        Ok(job.job_apply_link.clone())
    }

    pub fn pending_apply(&self) -> Option<&SavedJob> {
        self.pending_apply.as_ref()
    }

    pub fn cancel_apply(&mut self) {
        self.pending_apply = None;
    }

    /// Record the pending application. On failure the job is marked as not
    /// applied again and stays pending.
    pub async fn confirm_apply(&mut self, backend: &dyn ChatBackend, email: &str) -> SessionResult<()> {
        let job = self.pending_apply.take().ok_or(SessionError::NoPendingApply)?;
        self.applied.insert(job.job_id.clone());

        if let Err(e) = backend.apply_job(email, &job).await {
            app_log!(warn, "Recording application to {} failed: {}", job.job_id, e);
            self.applied.remove(&job.job_id);
            self.pending_apply = Some(job);
            return Err(SessionError::Backend(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{card, FakeBackend};

    fn board_with(n: usize) -> JobBoard {
        let mut board = JobBoard::default();
        board.set_cards((0..n).map(|i| card(&format!("j{}", i))).collect());
        board
    }

    #[test]
    fn test_pagination() {
        let mut board = board_with(12);
        assert_eq!(board.page_count(), 3);
        assert_eq!(board.visible().len(), 5);
        assert_eq!(board.range_label(), "Showing 1-5 of 12");
        assert!(!board.has_prev());

        assert!(board.next_page());
        assert!(board.next_page());
        assert!(!board.next_page());
        assert_eq!(board.visible().len(), 2);
        assert_eq!(board.range(), Some((11, 12, 12)));

        board.go_to(99);
        assert_eq!(board.page(), 2);
        board.go_to(0);
        assert!(!board.prev_page());

        board.next_page();
        board.set_cards(vec![card("x")]);
        assert_eq!(board.page(), 0);
    }

    #[test]
    fn test_empty_board() {
        let mut board = JobBoard::default();
        assert_eq!(board.page_count(), 0);
        assert!(board.visible().is_empty());
        assert_eq!(board.range(), None);
        board.go_to(3);
        assert_eq!(board.page(), 0);
        assert!(!board.has_next());
    }

    #[test]
    fn test_visible_card_is_one_based() {
        let mut board = board_with(7);
        board.next_page();
        assert_eq!(board.visible_card(1).unwrap().job_id, "j5");
        assert!(board.visible_card(0).is_none());
        assert!(board.visible_card(3).is_none());
    }

    #[tokio::test]
    async fn test_toggle_save_rolls_back() {
        let backend = FakeBackend::default();
        let mut board = board_with(1);
        let job = card("j0");

        assert!(board.toggle_save(&backend, "a@b.c", &job).await.unwrap());
        assert!(board.is_saved("j0"));

        backend.set_fail(true);
        assert!(board.toggle_save(&backend, "a@b.c", &job).await.is_err());
        assert!(board.is_saved("j0"));

        backend.set_fail(false);
        assert!(!board.toggle_save(&backend, "a@b.c", &job).await.unwrap());
        assert!(backend.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_flow() {
        let backend = FakeBackend::default();
        let mut board = board_with(2);
        let job = card("j1");

        let link = board.begin_apply(&job).unwrap();
        assert_eq!(link, "https://apply.example.com/j1");
        board.cancel_apply();
        assert!(matches!(
            board.confirm_apply(&backend, "a@b.c").await,
            Err(SessionError::NoPendingApply)
        ));

        board.begin_apply(&job).unwrap();
        backend.set_fail(true);
        assert!(board.confirm_apply(&backend, "a@b.c").await.is_err());
        assert!(!board.is_applied("j1"));
        assert!(board.pending_apply().is_some());

        backend.set_fail(false);
        board.confirm_apply(&backend, "a@b.c").await.unwrap();
        assert!(board.is_applied("j1"));
        assert!(matches!(
            board.begin_apply(&job),
            Err(SessionError::AlreadyApplied)
        ));
    }

    #[tokio::test]
    async fn test_load_lists() {
        let backend = FakeBackend::default();
        backend.saved.lock().unwrap().push(card("s1").to_saved_job());
        backend.applied.lock().unwrap().push(card("a1").to_saved_job());

        let mut board = JobBoard::default();
        board.load_lists(&backend, "a@b.c").await.unwrap();
        assert!(board.is_saved("s1"));
        assert!(board.is_applied("a1"));
        assert!(!board.is_saved("a1"));
    }
}

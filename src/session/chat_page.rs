// src/session/chat_page.rs
//! The chat screen: chat list, the open conversation and optimistic sends

use super::{ChatBackend, JobBoard, JobDetailModal, SessionError, SessionResult};
use crate::app_log;
use crate::types::{ChatMessageRequest, ChatMessageResponse, ChatSummary, JobCard, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Shown before the backend confirmed it
    Pending,
    Sent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub sender: Sender,
    pub message: String,
    pub jobs: Option<Vec<JobCard>>,
    pub status: EntryStatus,
}

impl ChatEntry {
    fn bot(message: String, jobs: Option<Vec<JobCard>>) -> Self {
        Self {
            sender: Sender::Bot,
            message,
            jobs,
            status: EntryStatus::Sent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveChat {
    pub chat_id: String,
    pub chat_name: String,
    pub entries: Vec<ChatEntry>,
    /// Job details returned for the last selected job
    pub pinned_job: Option<JobCard>,
}

/// Message accepted by [`ChatPage::begin_send`] and waiting for its reply
#[derive(Debug, Clone)]
pub struct PendingSend {
    text: String,
    request: ChatMessageRequest,
}

impl PendingSend {
    pub fn request(&self) -> &ChatMessageRequest {
        &self.request
    }
}

#[derive(Debug, Clone)]
pub struct ChatPage {
    email: String,
    chats: Vec<ChatSummary>,
    active: Option<ActiveChat>,
    draft: String,
    sending: bool,
    pending_job_id: Option<String>,
    last_error: Option<String>,
    pub board: JobBoard,
    pub modal: JobDetailModal,
}

impl ChatPage {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            chats: Vec::new(),
            active: None,
            draft: String::new(),
            sending: false,
            pending_job_id: None,
            last_error: None,
            board: JobBoard::default(),
            modal: JobDetailModal::default(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn chats(&self) -> &[ChatSummary] {
        &self.chats
    }

    pub fn active(&self) -> Option<&ActiveChat> {
        self.active.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn pending_job_id(&self) -> Option<&str> {
        self.pending_job_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(&mut self, result: SessionResult<T>) -> SessionResult<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }

    /// Chat list plus the saved and applied job ids
    pub async fn load(&mut self, backend: &dyn ChatBackend) -> SessionResult<()> {
        let result = self.load_inner(backend).await;
        self.record(result)
    }

    async fn load_inner(&mut self, backend: &dyn ChatBackend) -> SessionResult<()> {
        let history = backend.chat_history(&self.email).await?;
        self.chats = history.chats;
        let email = self.email.clone();
        self.board.load_lists(backend, &email).await
    }

    pub async fn new_chat(&mut self, backend: &dyn ChatBackend) -> SessionResult<()> {
        let result = match backend.create_chat(&self.email).await {
            Ok(created) => {
                self.chats.insert(
                    0,
                    ChatSummary {
                        id: created.chat_id.clone(),
                        chat_name: created.chat_name.clone(),
                        chat_id: created.chat_id.clone(),
                    },
                );
                self.active = Some(ActiveChat {
                    chat_id: created.chat_id,
                    chat_name: created.chat_name,
                    entries: vec![ChatEntry::bot(created.initial_message, None)],
                    pinned_job: None,
                });
                self.reset_conversation_state();
                Ok(())
            }
            Err(e) => Err(SessionError::Backend(e)),
        };
        self.record(result)
    }

    pub async fn open_chat(&mut self, backend: &dyn ChatBackend, chat_id: &str) -> SessionResult<()> {
        let result = match backend.chat_messages(&self.email, chat_id).await {
            Ok(transcript) => {
                let entries: Vec<ChatEntry> = transcript
                    .messages
                    .into_iter()
                    .map(|m| ChatEntry {
                        sender: m.sender,
                        message: m.message,
                        jobs: m.jobs,
                        status: EntryStatus::Sent,
                    })
                    .collect();

                let latest_jobs = entries
                    .iter()
                    .rev()
                    .find_map(|e| e.jobs.clone().filter(|j| !j.is_empty()))
                    .unwrap_or_default();

                self.active = Some(ActiveChat {
                    chat_id: transcript.chat_id,
                    chat_name: transcript.chat_name,
                    entries,
                    pinned_job: None,
                });
                self.reset_conversation_state();
                self.board.set_cards(latest_jobs);
                Ok(())
            }
            Err(e) => Err(SessionError::Backend(e)),
        };
        self.record(result)
    }

    fn reset_conversation_state(&mut self) {
        self.draft.clear();
        self.pending_job_id = None;
        self.board.clear();
        self.modal.close();
    }

    /// Attach a job to the next message so the assistant gets its details
    pub fn select_job_for_next_message(&mut self, job_id: impl Into<String>) {
        self.pending_job_id = Some(job_id.into());
    }

    pub fn clear_job_selection(&mut self) {
        self.pending_job_id = None;
    }

    /// Validate and optimistically show a user message. The returned request
    /// goes to the backend; its outcome is handed to [`ChatPage::finish_send`].
    pub fn begin_send(&mut self, text: &str) -> SessionResult<PendingSend> {
        let result = self.begin_send_inner(text);
        self.record(result)
    }

    fn begin_send_inner(&mut self, text: &str) -> SessionResult<PendingSend> {
        let message = text.trim();
        if message.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.sending {
            return Err(SessionError::Busy);
        }
        let active = self.active.as_mut().ok_or(SessionError::NoActiveChat)?;

        active.entries.push(ChatEntry {
            sender: Sender::User,
            message: message.to_string(),
            jobs: None,
            status: EntryStatus::Pending,
        });
        let request = ChatMessageRequest {
            email: self.email.clone(),
            chat_id: active.chat_id.clone(),
            message: message.to_string(),
            selected_job_id: self.pending_job_id.clone(),
        };

        self.sending = true;
        self.draft.clear();
        Ok(PendingSend {
            text: text.to_string(),
            request,
        })
    }

    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        outcome: anyhow::Result<ChatMessageResponse>,
    ) -> SessionResult<()> {
        self.sending = false;
        let result = match outcome {
            Ok(reply) => {
                self.apply_reply(&pending, reply);
                Ok(())
            }
            Err(e) => {
                app_log!(warn, "Sending message failed: {}", e);
                self.rollback_send(&pending);
                Err(SessionError::Backend(e))
            }
        };
        self.record(result)
    }

    fn apply_reply(&mut self, pending: &PendingSend, reply: ChatMessageResponse) {
        let chat_id = &pending.request.chat_id;

        // the user may have opened another chat while waiting
        if let Some(active) = self.active.as_mut().filter(|a| &a.chat_id == chat_id) {
            if let Some(entry) = active
                .entries
                .iter_mut()
                .rev()
                .find(|e| e.status == EntryStatus::Pending)
            {
                entry.status = EntryStatus::Sent;
            }
            active
                .entries
                .push(ChatEntry::bot(reply.message, reply.jobs.clone()));

            if let Some(details) = reply.selected_job_details {
                active.pinned_job = Some(details);
            }
            if let Some(name) = &reply.chat_name {
                active.chat_name = name.clone();
            }
            if let Some(jobs) = reply.jobs.filter(|j| !j.is_empty()) {
                self.board.set_cards(jobs);
            }
        }
        if self.pending_job_id == pending.request.selected_job_id {
            self.pending_job_id = None;
        }

        if let Some(position) = self.chats.iter().position(|c| &c.chat_id == chat_id) {
            let mut summary = self.chats.remove(position);
            if let Some(name) = reply.chat_name {
                summary.chat_name = name;
            }
            self.chats.insert(0, summary);
        }
    }

    fn rollback_send(&mut self, pending: &PendingSend) {
        let Some(active) = self
            .active
            .as_mut()
            .filter(|a| a.chat_id == pending.request.chat_id)
        else {
            return;
        };

        if let Some(position) = active
            .entries
            .iter()
            .rposition(|e| e.status == EntryStatus::Pending)
        {
            active.entries.remove(position);
        }
        self.draft = pending.text.clone();
    }

    /// Send one message and wait for the reply
    pub async fn send(&mut self, backend: &dyn ChatBackend, text: &str) -> SessionResult<()> {
        let pending = self.begin_send(text)?;
        let outcome = backend.send_message(pending.request()).await;
        self.finish_send(pending, outcome)
    }

    /// Remove a chat right away; it comes back if the backend refuses
    pub async fn delete_chat(&mut self, backend: &dyn ChatBackend, chat_id: &str) -> SessionResult<()> {
        let Some(position) = self.chats.iter().position(|c| c.chat_id == chat_id) else {
            let result = Err(SessionError::UnknownChat(chat_id.to_string()));
            return self.record(result);
        };

        let removed = self.chats.remove(position);
        let was_active = self.active.as_ref().is_some_and(|a| a.chat_id == chat_id);
        let previous = if was_active {
            let snapshot = (self.active.take(), self.board.clone(), self.modal.clone());
            self.board.clear();
            self.modal.close();
            Some(snapshot)
        } else {
            None
        };

        let result = match backend.delete_chat(&self.email, chat_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                app_log!(warn, "Deleting chat {} failed: {}", chat_id, e);
                self.chats.insert(position.min(self.chats.len()), removed);
                if let Some((active, board, modal)) = previous {
                    self.active = active;
                    self.board = board;
                    self.modal = modal;
                }
                Err(SessionError::Backend(e))
            }
        };
        self.record(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{card, transcript, FakeBackend};

    fn summary(id: &str) -> ChatSummary {
        ChatSummary {
            id: id.to_string(),
            chat_name: format!("Chat {}", id),
            chat_id: id.to_string(),
        }
    }

    async fn page_with_chats(backend: &FakeBackend, ids: &[&str]) -> ChatPage {
        *backend.chats.lock().unwrap() = ids.iter().map(|id| summary(id)).collect();
        let mut page = ChatPage::new("sam@example.com");
        page.load(backend).await.unwrap();
        page
    }

    #[tokio::test]
    async fn test_new_chat_goes_to_top_with_greeting() {
        let backend = FakeBackend::default();
        let mut page = page_with_chats(&backend, &["a"]).await;

        page.new_chat(&backend).await.unwrap();
        assert_eq!(page.chats()[0].chat_id, "new-1");
        let active = page.active().unwrap();
        assert_eq!(active.entries.len(), 1);
        assert_eq!(active.entries[0].message, "Hi there!");
    }

    #[tokio::test]
    async fn test_open_chat_shows_latest_jobs() {
        let backend = FakeBackend::default();
        backend.transcripts.lock().unwrap().push(transcript(
            "a",
            vec![
                (Sender::Bot, "Hi", None),
                (Sender::User, "jobs?", None),
                (Sender::Bot, "Here", Some(vec![card("1"), card("2")])),
                (Sender::User, "thanks", None),
                (Sender::Bot, "Welcome", None),
            ],
        ));
        let mut page = page_with_chats(&backend, &["a"]).await;

        page.open_chat(&backend, "a").await.unwrap();
        assert_eq!(page.active().unwrap().entries.len(), 5);
        assert_eq!(page.board.cards().len(), 2);
    }

    #[tokio::test]
    async fn test_send_success_updates_everything() {
        let backend = FakeBackend::default();
        *backend.reply.lock().unwrap() = Some(ChatMessageResponse {
            message: "Found some".to_string(),
            jobs: Some(vec![card("9")]),
            selected_job_details: Some(card("1")),
            chat_name: Some("Rust jobs".to_string()),
        });
        backend
            .transcripts
            .lock()
            .unwrap()
            .push(transcript("b", vec![(Sender::Bot, "Hi", None)]));
        let mut page = page_with_chats(&backend, &["a", "b"]).await;
        page.open_chat(&backend, "b").await.unwrap();
        page.select_job_for_next_message("1");

        page.send(&backend, "  Rust jobs please ").await.unwrap();

        let sent = backend.sent.lock().unwrap()[0].clone();
        assert_eq!(sent.message, "Rust jobs please");
        assert_eq!(sent.selected_job_id.as_deref(), Some("1"));

        let active = page.active().unwrap();
        assert_eq!(active.entries.len(), 3);
        assert!(active.entries.iter().all(|e| e.status == EntryStatus::Sent));
        assert_eq!(active.chat_name, "Rust jobs");
        assert_eq!(active.pinned_job.as_ref().unwrap().job_id, "1");
        assert_eq!(page.board.cards()[0].job_id, "9");
        assert_eq!(page.chats()[0].chat_id, "b");
        assert_eq!(page.chats()[0].chat_name, "Rust jobs");
        assert!(page.pending_job_id().is_none());
        assert!(!page.is_sending());
    }

    #[tokio::test]
    async fn test_send_failure_rolls_back() {
        let backend = FakeBackend::default();
        let mut page = page_with_chats(&backend, &[]).await;
        page.new_chat(&backend).await.unwrap();
        page.select_job_for_next_message("7");

        backend.set_fail(true);
        page.set_draft("hello");
        assert!(page.send(&backend, "hello").await.is_err());

        assert_eq!(page.active().unwrap().entries.len(), 1);
        assert_eq!(page.draft(), "hello");
        assert_eq!(page.pending_job_id(), Some("7"));
        assert!(page.last_error().is_some());
        assert!(!page.is_sending());
    }

    #[tokio::test]
    async fn test_one_turn_at_a_time() {
        let backend = FakeBackend::default();
        let mut page = page_with_chats(&backend, &[]).await;
        page.new_chat(&backend).await.unwrap();

        assert!(matches!(page.begin_send("   "), Err(SessionError::EmptyMessage)));

        let pending = page.begin_send("first").unwrap();
        assert_eq!(page.active().unwrap().entries[1].status, EntryStatus::Pending);
        assert!(matches!(page.begin_send("second"), Err(SessionError::Busy)));

        let outcome = backend.send_message(pending.request()).await;
        page.finish_send(pending, outcome).unwrap();
        assert!(page.begin_send("second").is_ok());
    }

    #[tokio::test]
    async fn test_send_without_chat() {
        let mut page = ChatPage::new("sam@example.com");
        assert!(matches!(
            page.begin_send("hi"),
            Err(SessionError::NoActiveChat)
        ));
    }

    #[tokio::test]
    async fn test_delete_chat_restores_on_failure() {
        let backend = FakeBackend::default();
        backend
            .transcripts
            .lock()
            .unwrap()
            .push(transcript("b", vec![(Sender::Bot, "Hi", None)]));
        let mut page = page_with_chats(&backend, &["a", "b", "c"]).await;
        page.open_chat(&backend, "b").await.unwrap();

        backend.set_fail(true);
        assert!(page.delete_chat(&backend, "b").await.is_err());
        let ids: Vec<&str> = page.chats().iter().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(page.active().unwrap().chat_id, "b");

        backend.set_fail(false);
        page.delete_chat(&backend, "b").await.unwrap();
        assert_eq!(page.chats().len(), 2);
        assert!(page.active().is_none());

        assert!(matches!(
            page.delete_chat(&backend, "zzz").await,
            Err(SessionError::UnknownChat(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_chat_keeps_job_cards_on_failure() {
        let backend = FakeBackend::default();
        backend.transcripts.lock().unwrap().push(transcript(
            "b",
            vec![(Sender::Bot, "Hi", Some(vec![card("1"), card("2")]))],
        ));
        let mut page = page_with_chats(&backend, &["a", "b"]).await;
        page.open_chat(&backend, "b").await.unwrap();
        page.modal.open(card("1"));

        backend.set_fail(true);
        assert!(page.delete_chat(&backend, "b").await.is_err());
        assert_eq!(page.board.cards().len(), 2);
        assert!(page.modal.is_open());
        assert_eq!(page.modal.job().unwrap().job_id, "1");
    }

    #[tokio::test]
    async fn test_reply_for_background_chat_updates_list_only() {
        let backend = FakeBackend::default();
        *backend.reply.lock().unwrap() = Some(ChatMessageResponse {
            message: "Found some".to_string(),
            jobs: Some(vec![card("9")]),
            selected_job_details: None,
            chat_name: Some("Rust jobs".to_string()),
        });
        {
            let mut transcripts = backend.transcripts.lock().unwrap();
            transcripts.push(transcript("a", vec![(Sender::Bot, "Hi", None)]));
            transcripts.push(transcript("b", vec![(Sender::Bot, "Hello", None)]));
        }
        let mut page = page_with_chats(&backend, &["b", "a"]).await;
        page.open_chat(&backend, "a").await.unwrap();

        let pending = page.begin_send("Rust jobs please").unwrap();
        let outcome = backend.send_message(&pending.request).await;
        page.open_chat(&backend, "b").await.unwrap();
        page.select_job_for_next_message("5");
        page.finish_send(pending, outcome).unwrap();

        assert_eq!(page.chats()[0].chat_id, "a");
        assert_eq!(page.chats()[0].chat_name, "Rust jobs");
        let active = page.active().unwrap();
        assert_eq!(active.chat_id, "b");
        assert_eq!(active.entries.len(), 1);
        assert!(page.board.cards().is_empty());
        assert_eq!(page.pending_job_id(), Some("5"));
        assert!(!page.is_sending());
    }

    #[tokio::test]
    async fn test_failed_background_send_leaves_draft_alone() {
        let backend = FakeBackend::default();
        {
            let mut transcripts = backend.transcripts.lock().unwrap();
            transcripts.push(transcript("a", vec![(Sender::Bot, "Hi", None)]));
            transcripts.push(transcript("b", vec![(Sender::Bot, "Hello", None)]));
        }
        let mut page = page_with_chats(&backend, &["a", "b"]).await;
        page.open_chat(&backend, "a").await.unwrap();

        let pending = page.begin_send("hello").unwrap();
        page.open_chat(&backend, "b").await.unwrap();
        page.set_draft("for b");
        assert!(page
            .finish_send(pending, Err(anyhow::anyhow!("timeout")))
            .is_err());

        assert_eq!(page.draft(), "for b");
        assert_eq!(page.active().unwrap().entries.len(), 1);
        assert!(!page.is_sending());
    }
}

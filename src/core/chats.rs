// src/core/chats.rs
//! Chat sessions and their messages

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::database::{now_timestamp, Database};
use crate::types::{ChatMessageView, JobCard, Sender};

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    pub id: String,
    pub user_id: i64,
    pub chat_name: String,
    /// Condensed user profile the assistant always sees
    pub permanent_context: String,
    /// Rolling summary of the messages up to `summarized_upto`
    pub summary: Option<String>,
    pub summarized_upto: i64,
    pub selected_job: Option<JobCard>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub sender: Sender,
    pub message: String,
    pub jobs: Option<Vec<JobCard>>,
    pub created_at: String,
}

impl StoredMessage {
    pub fn to_view(&self) -> ChatMessageView {
        ChatMessageView {
            sender: self.sender,
            message: self.message.clone(),
            timestamp: Some(self.created_at.clone()),
            jobs: self.jobs.clone(),
        }
    }
}

/// One completed turn, written atomically
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user_message: String,
    pub bot_message: String,
    pub jobs: Option<Vec<JobCard>>,
    pub rename_to: Option<String>,
    pub selected_job: Option<JobCard>,
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: String,
    user_id: i64,
    chat_name: String,
    permanent_context: String,
    summary: Option<String>,
    summarized_upto: i64,
    selected_job: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChatRow> for ChatRecord {
    type Error = anyhow::Error;

    fn try_from(row: ChatRow) -> Result<Self> {
        let selected_job = row
            .selected_job
            .as_deref()
            .map(serde_json::from_str::<JobCard>)
            .transpose()
            .context("Corrupt selected_job column")?;

        Ok(ChatRecord {
            id: row.id,
            user_id: row.user_id,
            chat_name: row.chat_name,
            permanent_context: row.permanent_context,
            summary: row.summary,
            summarized_upto: row.summarized_upto,
            selected_job,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender: String,
    message: String,
    jobs: Option<String>,
    created_at: String,
}

impl TryFrom<MessageRow> for StoredMessage {
    type Error = anyhow::Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        let sender = Sender::parse(&row.sender)
            .ok_or_else(|| anyhow::anyhow!("Unknown sender '{}' in chat_messages", row.sender))?;
        let jobs = row
            .jobs
            .as_deref()
            .map(serde_json::from_str::<Vec<JobCard>>)
            .transpose()
            .context("Corrupt jobs column")?;

        Ok(StoredMessage {
            id: row.id,
            sender,
            message: row.message,
            jobs,
            created_at: row.created_at,
        })
    }
}

const CHAT_COLUMNS: &str = "id, user_id, chat_name, permanent_context, summary, summarized_upto, \
                            selected_job, created_at, updated_at";

pub struct ChatRepository<'a> {
    db: &'a Database,
}

impl<'a> ChatRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    /// Create a chat together with its greeting message
    pub async fn create(
        &self,
        chat_id: &str,
        user_id: i64,
        chat_name: &str,
        permanent_context: &str,
        greeting: &str,
    ) -> Result<()> {
        let chat_id = chat_id.to_string();
        let chat_name = chat_name.to_string();
        let permanent_context = permanent_context.to_string();
        let greeting = greeting.to_string();

        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let now = now_timestamp();
                    sqlx::query(
                        r#"
                        INSERT INTO chats (id, user_id, chat_name, permanent_context, created_at, updated_at)
                        VALUES (?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&chat_id)
                    .bind(user_id)
                    .bind(&chat_name)
                    .bind(&permanent_context)
                    .bind(&now)
                    .bind(&now)
                    .execute(&mut **tx)
                    .await?;

                    sqlx::query(
                        "INSERT INTO chat_messages (chat_id, sender, message, created_at) VALUES (?, ?, ?, ?)",
                    )
                    .bind(&chat_id)
                    .bind(Sender::Bot.as_str())
                    .bind(&greeting)
                    .bind(&now)
                    .execute(&mut **tx)
                    .await?;

                    Ok::<_, anyhow::Error>(())
                })
            })
            .await
    }

    /// Chat by id, only when it belongs to `user_id`
    pub async fn find(&self, user_id: i64, chat_id: &str) -> Result<Option<ChatRecord>> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {} FROM chats WHERE id = ? AND user_id = ?",
            CHAT_COLUMNS
        ))
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(ChatRecord::try_from).transpose()
    }

    /// Chats of a user, most recently active first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<ChatRecord>> {
        let rows = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {} FROM chats WHERE user_id = ? ORDER BY updated_at DESC, rowid DESC",
            CHAT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(ChatRecord::try_from).collect()
    }

    /// Delete a chat and its messages. Returns `false` when nothing matched.
    pub async fn delete(&self, user_id: i64, chat_id: &str) -> Result<bool> {
        let chat_id = chat_id.to_string();

        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    sqlx::query(
                        r#"
                        DELETE FROM chat_messages
                        WHERE chat_id IN (SELECT id FROM chats WHERE id = ? AND user_id = ?)
                        "#,
                    )
                    .bind(&chat_id)
                    .bind(user_id)
                    .execute(&mut **tx)
                    .await?;

                    let result = sqlx::query("DELETE FROM chats WHERE id = ? AND user_id = ?")
                        .bind(&chat_id)
                        .bind(user_id)
                        .execute(&mut **tx)
                        .await?;

                    Ok::<_, anyhow::Error>(result.rows_affected() > 0)
                })
            })
            .await
    }

    pub async fn messages(&self, chat_id: &str) -> Result<Vec<StoredMessage>> {
        self.messages_after(chat_id, 0).await
    }

    /// Messages with an id greater than `after_id`, oldest first
    pub async fn messages_after(&self, chat_id: &str, after_id: i64) -> Result<Vec<StoredMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender, message, jobs, created_at
            FROM chat_messages
            WHERE chat_id = ? AND id > ?
            ORDER BY id ASC
            "#,
        )
        .bind(chat_id)
        .bind(after_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(StoredMessage::try_from).collect()
    }

    /// Store the user message and bot reply of one turn, plus any rename or
    /// pinned job, in a single transaction
    pub async fn record_exchange(&self, chat_id: &str, exchange: Exchange) -> Result<()> {
        let chat_id = chat_id.to_string();
        let jobs_json = exchange
            .jobs
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let selected_json = exchange
            .selected_job
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let now = now_timestamp();
                    let insert =
                        "INSERT INTO chat_messages (chat_id, sender, message, jobs, created_at) VALUES (?, ?, ?, ?, ?)";

                    sqlx::query(insert)
                        .bind(&chat_id)
                        .bind(Sender::User.as_str())
                        .bind(&exchange.user_message)
                        .bind(None::<String>)
                        .bind(&now)
                        .execute(&mut **tx)
                        .await?;

                    sqlx::query(insert)
                        .bind(&chat_id)
                        .bind(Sender::Bot.as_str())
                        .bind(&exchange.bot_message)
                        .bind(&jobs_json)
                        .bind(&now)
                        .execute(&mut **tx)
                        .await?;

                    if let Some(name) = &exchange.rename_to {
                        sqlx::query("UPDATE chats SET chat_name = ? WHERE id = ?")
                            .bind(name)
                            .bind(&chat_id)
                            .execute(&mut **tx)
                            .await?;
                    }

                    if let Some(selected) = &selected_json {
                        sqlx::query("UPDATE chats SET selected_job = ? WHERE id = ?")
                            .bind(selected)
                            .bind(&chat_id)
                            .execute(&mut **tx)
                            .await?;
                    }

                    sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
                        .bind(&now)
                        .bind(&chat_id)
                        .execute(&mut **tx)
                        .await?;

                    Ok::<_, anyhow::Error>(())
                })
            })
            .await
    }

    pub async fn update_summary(&self, chat_id: &str, summary: &str, upto: i64) -> Result<()> {
        sqlx::query("UPDATE chats SET summary = ?, summarized_upto = ? WHERE id = ?")
            .bind(summary)
            .bind(upto)
            .bind(chat_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

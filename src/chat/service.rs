// src/chat/service.rs
use std::sync::Arc;

use tracing::Instrument;

use super::context::{self, DEFAULT_CHAT_NAME};
use super::tools::{self, SEARCH_JOBS};
use super::{ChatError, ChatResult};
use crate::core::config_manager::ServiceConfig;
use crate::core::{ChatRecord, ChatRepository, Database, Exchange, User, UserRepository};
use crate::jsearch::cards::cards_from_response;
use crate::jsearch::{JobSearch, SearchParams};
use crate::llm::types::{ROLE_MODEL, ROLE_USER};
use crate::llm::{Content, FunctionCall, GenerateContentRequest, LanguageModel, Part};
use crate::types::{
    ChatHistoryResponse, ChatMessageRequest, ChatMessageResponse, ChatSummary, ChatTranscript,
    CreateChatResponse, JobCard, Sender,
};
use crate::utils::{normalize_email, validate_chat_id, validate_email};
use crate::{app_log, app_span};

const EMPTY_REPLY: &str = "Sorry, I couldn't come up with an answer to that. Could you rephrase it?";
const JOBS_ONLY_REPLY: &str = "Here are some jobs I found for you.";

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub default_country: String,
    /// Function-call rounds allowed per user message
    pub max_tool_rounds: usize,
    /// Unsummarised messages tolerated before folding into the summary
    pub summarize_after: usize,
    /// Messages kept verbatim when folding
    pub keep_recent: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_country: "us".to_string(),
            max_tool_rounds: 3,
            summarize_after: 10,
            keep_recent: 6,
        }
    }
}

impl ChatSettings {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            default_country: config.default_country.clone(),
            ..Self::default()
        }
    }
}

pub struct ChatService {
    db: Database,
    model: Arc<dyn LanguageModel>,
    jobs: Arc<dyn JobSearch>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(
        db: Database,
        model: Arc<dyn LanguageModel>,
        jobs: Arc<dyn JobSearch>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            db,
            model,
            jobs,
            settings,
        }
    }

    async fn user(&self, email: &str) -> ChatResult<User> {
        validate_email(email).map_err(|e| ChatError::InvalidRequest(e.to_string()))?;
        UserRepository::new(self.db.pool())
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ChatError::UserNotFound)
    }

    async fn owned_chat(&self, user: &User, chat_id: &str) -> ChatResult<ChatRecord> {
        let chat_id =
            validate_chat_id(chat_id).map_err(|e| ChatError::InvalidRequest(e.to_string()))?;
        ChatRepository::new(&self.db)
            .find(user.id, &chat_id)
            .await?
            .ok_or(ChatError::ChatNotFound)
    }

    pub async fn create_new_chat(&self, email: &str) -> ChatResult<CreateChatResponse> {
        let user = self.user(email).await?;
        let permanent_context = self.permanent_context(&user).await;

        let chat_id = uuid::Uuid::new_v4().to_string();
        let greeting = context::greeting(&user.profile);
        ChatRepository::new(&self.db)
            .create(
                &chat_id,
                user.id,
                DEFAULT_CHAT_NAME,
                &permanent_context,
                &greeting,
            )
            .await?;

        app_log!(info, "Created chat {} for {}", chat_id, user.profile.email);
        Ok(CreateChatResponse {
            chat_id,
            chat_name: DEFAULT_CHAT_NAME.to_string(),
            initial_message: greeting,
        })
    }

    /// Model-condensed profile brief, or the plain digest when the model fails
    async fn permanent_context(&self, user: &User) -> String {
        let request = context::profile_brief_request(&user.profile);
        match self.model.generate(&request).await {
            Ok(content) if !content.text().trim().is_empty() => content.text().trim().to_string(),
            Ok(_) => {
                app_log!(warn, "Empty profile brief for {}, using digest", user.profile.email);
                context::profile_digest(&user.profile)
            }
            Err(e) => {
                app_log!(
                    warn,
                    "Profile brief failed for {}: {}, using digest",
                    user.profile.email,
                    e
                );
                context::profile_digest(&user.profile)
            }
        }
    }

    pub async fn process_chat_message(
        &self,
        request: &ChatMessageRequest,
    ) -> ChatResult<ChatMessageResponse> {
        let span = app_span!("chat_turn", chat_id = %request.chat_id);
        self.process_turn(request).instrument(span).await
    }

    async fn process_turn(&self, request: &ChatMessageRequest) -> ChatResult<ChatMessageResponse> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidRequest(
                "Message cannot be empty".to_string(),
            ));
        }

        let user = self.user(&request.email).await?;
        let chat = self.owned_chat(&user, &request.chat_id).await?;
        let chats = ChatRepository::new(&self.db);

        let selected = match request.selected_job_id.as_deref().map(str::trim) {
            Some(job_id) if !job_id.is_empty() => self.selected_job(job_id).await,
            _ => None,
        };

        let unsummarized = chats.messages_after(&chat.id, chat.summarized_upto).await?;
        let mut contents = context::history_contents(&unsummarized);
        push_user_text(&mut contents, message);

        let mut generate = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(context::system_instruction(
                &chat,
                selected.as_ref(),
            ))),
            tools: vec![tools::search_jobs_tool()],
            generation_config: None,
        };

        let (reply, jobs) = self.run_tool_loop(&mut generate).await?;

        let is_first_message = chat.summarized_upto == 0
            && !unsummarized.iter().any(|m| m.sender == Sender::User);
        let rename_to = (chat.chat_name == DEFAULT_CHAT_NAME && is_first_message)
            .then(|| context::chat_title(message))
            .filter(|title| !title.is_empty());
        let chat_name = rename_to.clone().unwrap_or_else(|| chat.chat_name.clone());

        chats
            .record_exchange(
                &chat.id,
                Exchange {
                    user_message: message.to_string(),
                    bot_message: reply.clone(),
                    jobs: jobs.clone(),
                    rename_to,
                    selected_job: selected.clone(),
                },
            )
            .await?;

        app_log!(
            info,
            "Chat {} reply stored ({} jobs)",
            chat.id,
            jobs.as_ref().map_or(0, Vec::len)
        );

        self.maybe_summarize(&chat).await;

        Ok(ChatMessageResponse {
            message: reply,
            jobs,
            selected_job_details: selected,
            chat_name: Some(chat_name),
        })
    }

    async fn selected_job(&self, job_id: &str) -> Option<JobCard> {
        match self
            .jobs
            .job_details(job_id, &self.settings.default_country)
            .await
        {
            Ok(Some(raw)) => Some(JobCard::from(&raw)),
            Ok(None) => {
                app_log!(warn, "No details found for selected job {}", job_id);
                None
            }
            Err(e) => {
                app_log!(warn, "Failed to fetch selected job {}: {}", job_id, e);
                None
            }
        }
    }

    /// Call the model until it answers without function calls or the round
    /// limit is reached. Returns the reply and the cards of the last search.
    async fn run_tool_loop(
        &self,
        request: &mut GenerateContentRequest,
    ) -> ChatResult<(String, Option<Vec<JobCard>>)> {
        let mut jobs: Option<Vec<JobCard>> = None;
        let mut round = 0;

        let reply = loop {
            let content = self
                .model
                .generate(request)
                .await
                .map_err(ChatError::Upstream)?;

            let calls: Vec<FunctionCall> = content.function_calls().into_iter().cloned().collect();
            if calls.is_empty() || round >= self.settings.max_tool_rounds {
                if !calls.is_empty() {
                    app_log!(warn, "Tool round limit reached, answering with text only");
                }
                break content.text();
            }
            round += 1;

            let mut responses = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = self.execute_call(call, &mut jobs).await;
                responses.push(Part::function_response(&call.name, result));
            }

            request.contents.push(Content {
                role: Some(ROLE_MODEL.to_string()),
                parts: content.parts,
            });
            request.contents.push(Content {
                role: Some(ROLE_USER.to_string()),
                parts: responses,
            });
        };

        let reply = reply.trim();
        let reply = if !reply.is_empty() {
            reply.to_string()
        } else if jobs.as_ref().is_some_and(|j| !j.is_empty()) {
            JOBS_ONLY_REPLY.to_string()
        } else {
            EMPTY_REPLY.to_string()
        };

        Ok((reply, jobs))
    }

    async fn execute_call(
        &self,
        call: &FunctionCall,
        jobs: &mut Option<Vec<JobCard>>,
    ) -> serde_json::Value {
        if call.name != SEARCH_JOBS {
            app_log!(warn, "Model called unknown function {}", call.name);
            return tools::error_result(&format!("Unknown function: {}", call.name));
        }

        let params = match SearchParams::from_tool_args(&call.args, &self.settings.default_country) {
            Ok(params) => params,
            Err(e) => return tools::error_result(&e.to_string()),
        };

        match self.jobs.search_jobs(&params).await {
            Ok(response) => {
                let cards = cards_from_response(&response);
                let result = tools::search_result(&cards);
                *jobs = Some(cards);
                result
            }
            Err(e) => {
                app_log!(error, "Job search for '{}' failed: {}", params.query, e);
                tools::error_result(&format!("Job search failed: {}", e))
            }
        }
    }

    /// Fold older messages into the chat summary. Failures leave the summary
    /// as it was so the next turn retries.
    async fn maybe_summarize(&self, chat: &ChatRecord) {
        let chats = ChatRepository::new(&self.db);
        let unsummarized = match chats.messages_after(&chat.id, chat.summarized_upto).await {
            Ok(messages) => messages,
            Err(e) => {
                app_log!(warn, "Could not load messages to summarise chat {}: {}", chat.id, e);
                return;
            }
        };

        let Some((folded, upto)) = context::summary_split(
            &unsummarized,
            self.settings.summarize_after,
            self.settings.keep_recent,
        ) else {
            return;
        };

        let request = context::summary_request(chat.summary.as_deref(), folded);
        let summary = match self.model.generate(&request).await {
            Ok(content) if !content.text().trim().is_empty() => content.text().trim().to_string(),
            Ok(_) => {
                app_log!(warn, "Empty summary for chat {}", chat.id);
                return;
            }
            Err(e) => {
                app_log!(warn, "Summarising chat {} failed: {}", chat.id, e);
                return;
            }
        };

        match chats.update_summary(&chat.id, &summary, upto).await {
            Ok(()) => app_log!(info, "Chat {} summarised up to message {}", chat.id, upto),
            Err(e) => app_log!(warn, "Storing summary of chat {} failed: {}", chat.id, e),
        }
    }

    pub async fn get_chat_messages(&self, email: &str, chat_id: &str) -> ChatResult<ChatTranscript> {
        let user = self.user(email).await?;
        let chat = self.owned_chat(&user, chat_id).await?;
        let messages = ChatRepository::new(&self.db).messages(&chat.id).await?;

        Ok(ChatTranscript {
            chat_id: chat.id,
            chat_name: chat.chat_name,
            messages: messages.iter().map(|m| m.to_view()).collect(),
        })
    }

    pub async fn chat_history(&self, email: &str) -> ChatResult<ChatHistoryResponse> {
        let user = self.user(email).await?;
        let chats = ChatRepository::new(&self.db).list_for_user(user.id).await?;

        Ok(ChatHistoryResponse {
            chats: chats
                .into_iter()
                .map(|chat| ChatSummary {
                    id: chat.id.clone(),
                    chat_name: chat.chat_name,
                    chat_id: chat.id,
                })
                .collect(),
        })
    }

    /// Deleting a chat that does not exist is not an error
    pub async fn delete_chat(&self, email: &str, chat_id: &str) -> ChatResult<()> {
        let user = self.user(email).await?;
        let chat_id =
            validate_chat_id(chat_id).map_err(|e| ChatError::InvalidRequest(e.to_string()))?;

        let deleted = ChatRepository::new(&self.db).delete(user.id, &chat_id).await?;
        if deleted {
            app_log!(info, "Deleted chat {} of {}", chat_id, user.profile.email);
        } else {
            app_log!(info, "Chat {} of {} already absent", chat_id, user.profile.email);
        }
        Ok(())
    }
}

fn push_user_text(contents: &mut Vec<Content>, text: &str) {
    match contents.last_mut() {
        Some(last) if last.is_role(ROLE_USER) => last.parts.push(Part::text(text)),
        _ => contents.push(Content::user(text)),
    }
}

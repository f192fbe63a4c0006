// src/core/mod.rs
//! Configuration and persistence shared by the web server and the CLI

pub mod chats;
pub mod config_manager;
pub mod database;
pub mod job_lists;
pub mod users;

pub use chats::{ChatRecord, ChatRepository, Exchange, StoredMessage};
pub use config_manager::ConfigManager;
pub use database::Database;
pub use job_lists::{JobList, JobListRepository};
pub use users::{UpsertOutcome, User, UserRepository};

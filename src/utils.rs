// src/utils.rs
use anyhow::{Context, Result};
use std::path::Path;

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check, non-blank with an `@` that is neither first nor last
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }
    match email.find('@') {
        Some(at) if at > 0 && at < email.len() - 1 => Ok(()),
        _ => anyhow::bail!("Invalid email address: {}", email),
    }
}

/// Chat ids are UUIDs; anything else is rejected before reaching storage
pub fn validate_chat_id(chat_id: &str) -> Result<String> {
    let id = uuid::Uuid::parse_str(chat_id.trim())
        .with_context(|| format!("Invalid chat id: {}", chat_id))?;
    Ok(id.to_string())
}

/// Replace runs of whitespace by a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read file content as string with proper error context
pub async fn read_file_content(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

// src/core/users.rs
//! User profiles keyed by email

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::database::now_timestamp;
use crate::app_log;
use crate::types::{ProfileUpdate, UserProfile};

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub profile: UserProfile,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    phone: String,
    location: String,
    skills: String,
    experience: String,
    profile_summary: String,
    education: Option<String>,
    certifications: Option<String>,
    projects: Option<String>,
    about: Option<String>,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            profile: UserProfile {
                name: row.name,
                email: row.email,
                phone: row.phone,
                location: row.location,
                skills: decode_list(&row.skills)?,
                experience: decode_list(&row.experience)?,
                profile_summary: row.profile_summary,
                education: row.education.as_deref().map(decode_list).transpose()?,
                certifications: row.certifications.as_deref().map(decode_list).transpose()?,
                projects: row.projects.as_deref().map(decode_list).transpose()?,
                about: row.about,
            },
            created_at: row.created_at,
        })
    }
}

fn decode_list(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).context("Corrupt list column in users table")
}

fn encode_list(list: &[String]) -> Result<String> {
    Ok(serde_json::to_string(list)?)
}

fn encode_optional_list(list: &Option<Vec<String>>) -> Result<Option<String>> {
    list.as_deref().map(encode_list).transpose()
}

/// Result of confirming onboarding details
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(i64),
    Updated,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, phone, location, skills, experience, profile_summary,
                   education, certifications, projects, about, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Insert a new user, or overwrite the profile of an existing email
    pub async fn upsert(&self, profile: &UserProfile) -> Result<UpsertOutcome> {
        if let Some(existing) = self.find_by_email(&profile.email).await? {
            self.write_profile(existing.id, profile).await?;
            app_log!(info, "Updated user profile for {}", profile.email);
            return Ok(UpsertOutcome::Updated);
        }

        let now = now_timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, phone, location, skills, experience, profile_summary,
                               education, certifications, projects, about, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(encode_list(&profile.skills)?)
        .bind(encode_list(&profile.experience)?)
        .bind(&profile.profile_summary)
        .bind(encode_optional_list(&profile.education)?)
        .bind(encode_optional_list(&profile.certifications)?)
        .bind(encode_optional_list(&profile.projects)?)
        .bind(&profile.about)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        app_log!(info, "Created user {} for {}", id, profile.email);
        Ok(UpsertOutcome::Created(id))
    }

    /// Apply a partial update. Returns `false` when no user has that email.
    pub async fn update(&self, update: &ProfileUpdate) -> Result<bool> {
        let Some(mut user) = self.find_by_email(&update.email).await? else {
            return Ok(false);
        };

        user.profile.apply(update);
        self.write_profile(user.id, &user.profile).await?;
        Ok(true)
    }

    async fn write_profile(&self, id: i64, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, phone = ?, location = ?, skills = ?, experience = ?, profile_summary = ?,
                education = ?, certifications = ?, projects = ?, about = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(&profile.location)
        .bind(encode_list(&profile.skills)?)
        .bind(encode_list(&profile.experience)?)
        .bind(&profile.profile_summary)
        .bind(encode_optional_list(&profile.education)?)
        .bind(encode_optional_list(&profile.certifications)?)
        .bind(encode_optional_list(&profile.projects)?)
        .bind(&profile.about)
        .bind(now_timestamp())
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

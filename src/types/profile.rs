// src/types/profile.rs
//! User profile as confirmed after onboarding

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub profile_summary: String,
    #[serde(default)]
    pub education: Option<Vec<String>>,
    #[serde(rename = "certificationsAndAchievementsAndAwards", default)]
    pub certifications: Option<Vec<String>>,
    #[serde(default)]
    pub projects: Option<Vec<String>>,
    #[serde(default)]
    pub about: Option<String>,
}

impl UserProfile {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }

    /// Apply the fields present in `update`, leaving the others untouched
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = phone.clone();
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        if let Some(skills) = &update.skills {
            self.skills = skills.clone();
        }
        if let Some(experience) = &update.experience {
            self.experience = experience.clone();
        }
        if let Some(summary) = &update.profile_summary {
            self.profile_summary = summary.clone();
        }
        if update.education.is_some() {
            self.education = update.education.clone();
        }
        if update.certifications.is_some() {
            self.certifications = update.certifications.clone();
        }
        if update.projects.is_some() {
            self.projects = update.projects.clone();
        }
        if update.about.is_some() {
            self.about = update.about.clone();
        }
    }
}

/// Partial profile update keyed by email. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(
        rename = "certificationsAndAchievementsAndAwards",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub certifications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.skills.is_none()
            && self.experience.is_none()
            && self.profile_summary.is_none()
            && self.education.is_none()
            && self.certifications.is_none()
            && self.projects.is_none()
            && self.about.is_none()
    }
}

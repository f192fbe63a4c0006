// src/chat/context.rs
//! Prompt building blocks: profile context, system instruction, history and
//! the rolling conversation summary

use crate::core::{ChatRecord, StoredMessage};
use crate::llm::types::{ROLE_MODEL, ROLE_USER};
use crate::llm::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::types::{JobCard, Sender, UserProfile};
use crate::utils::collapse_whitespace;

pub const DEFAULT_CHAT_NAME: &str = "New Chat";
pub const CHAT_TITLE_MAX_CHARS: usize = 40;

const PERSONA: &str = "You are a friendly, practical job search assistant. \
Help the user find and evaluate job openings that fit their background. \
When the user asks for jobs, call the search_jobs function instead of inventing postings. \
After a search, briefly highlight the most relevant results and why they fit. \
Keep answers short and concrete.";

/// Deterministic profile context, also used when the model cannot condense it
pub fn profile_digest(profile: &UserProfile) -> String {
    let mut lines = vec![
        format!("Name: {}", profile.name),
        format!("Location: {}", profile.location),
    ];
    if !profile.profile_summary.trim().is_empty() {
        lines.push(format!("Summary: {}", profile.profile_summary.trim()));
    }
    if !profile.skills.is_empty() {
        lines.push(format!("Skills: {}", profile.skills.join(", ")));
    }
    if !profile.experience.is_empty() {
        lines.push(format!("Experience: {}", profile.experience.join("; ")));
    }
    let optional = [
        ("Education", &profile.education),
        ("Certifications", &profile.certifications),
        ("Projects", &profile.projects),
    ];
    for (label, list) in optional {
        if let Some(items) = list.as_ref().filter(|l| !l.is_empty()) {
            lines.push(format!("{}: {}", label, items.join("; ")));
        }
    }
    if let Some(about) = profile.about.as_deref().filter(|a| !a.trim().is_empty()) {
        lines.push(format!("About: {}", about.trim()));
    }
    lines.join("\n")
}

/// Ask the model for a compact brief of the profile
pub fn profile_brief_request(profile: &UserProfile) -> GenerateContentRequest {
    let mut request = GenerateContentRequest::prompt(
        "You condense candidate profiles for a job search assistant. \
         Write at most 120 words of plain text covering target roles, seniority, \
         core skills, location and any stated preferences. No markdown.",
        profile_digest(profile),
    );
    request.generation_config = Some(GenerationConfig {
        temperature: Some(0.2),
        max_output_tokens: Some(400),
    });
    request
}

pub fn greeting(profile: &UserProfile) -> String {
    let skills: Vec<&str> = profile.skills.iter().take(3).map(String::as_str).collect();
    let background = if skills.is_empty() {
        String::new()
    } else {
        format!(" that match your experience with {}", skills.join(", "))
    };
    format!(
        "Hi {}! I'm your job search assistant. I can find openings{} and help you compare them. \
         What kind of role are you looking for?",
        profile.first_name(),
        background
    )
}

/// Persona, profile context, summary so far and the pinned job
pub fn system_instruction(chat: &ChatRecord, pinned: Option<&JobCard>) -> String {
    let mut sections = vec![
        PERSONA.to_string(),
        format!("USER PROFILE:\n{}", chat.permanent_context),
    ];
    if let Some(summary) = chat.summary.as_deref().filter(|s| !s.is_empty()) {
        sections.push(format!("CONVERSATION SO FAR:\n{}", summary));
    }
    if let Some(job) = pinned.or(chat.selected_job.as_ref()) {
        sections.push(format!("JOB THE USER IS ASKING ABOUT:\n{}", describe_job(job)));
    }
    sections.join("\n\n")
}

fn describe_job(job: &JobCard) -> String {
    let mut lines = vec![
        format!("{} at {} ({})", job.job_title, job.employer_name, job.job_location),
        format!("Job id: {}", job.job_id),
    ];
    if let Some(salary) = &job.job_salary {
        lines.push(format!("Salary: {}", salary));
    }
    if !job.job_employment_type.is_empty() {
        lines.push(format!("Employment type: {}", job.job_employment_type));
    }
    if let Some(highlights) = &job.job_highlights {
        for (section, items) in highlights {
            lines.push(format!("{}: {}", section, items.join("; ")));
        }
    }
    if !job.job_description.is_empty() {
        lines.push(format!("Description: {}", job.job_description));
    }
    lines.join("\n")
}

/// Stored messages as model contents.
///
/// The API expects the conversation to open with a user turn and roles to
/// alternate, so leading bot messages (the greeting) are dropped and
/// consecutive messages of one sender are merged.
pub fn history_contents(messages: &[StoredMessage]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::new();

    for message in messages
        .iter()
        .skip_while(|m| m.sender == Sender::Bot)
    {
        let role = match message.sender {
            Sender::User => ROLE_USER,
            Sender::Bot => ROLE_MODEL,
        };
        match contents.last_mut() {
            Some(last) if last.is_role(role) => last.parts.push(Part::text(&message.message)),
            _ => contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![Part::text(&message.message)],
            }),
        }
    }

    contents
}

/// Messages to fold into the summary and the id they run up to, once more
/// than `threshold` messages are unsummarised. The latest `keep` stay verbatim.
pub fn summary_split(
    unsummarized: &[StoredMessage],
    threshold: usize,
    keep: usize,
) -> Option<(&[StoredMessage], i64)> {
    if unsummarized.len() <= threshold {
        return None;
    }
    let folded = &unsummarized[..unsummarized.len().saturating_sub(keep)];
    folded.last().map(|last| (folded, last.id))
}

pub fn summary_request(previous: Option<&str>, folded: &[StoredMessage]) -> GenerateContentRequest {
    let transcript: Vec<String> = folded
        .iter()
        .map(|m| {
            let speaker = match m.sender {
                Sender::User => "User",
                Sender::Bot => "Assistant",
            };
            format!("{}: {}", speaker, m.message)
        })
        .collect();

    let prompt = match previous.filter(|p| !p.is_empty()) {
        Some(previous) => format!(
            "EXISTING SUMMARY:\n{}\n\nNEW MESSAGES:\n{}",
            previous,
            transcript.join("\n")
        ),
        None => format!("MESSAGES:\n{}", transcript.join("\n")),
    };

    GenerateContentRequest::prompt(
        "Summarise this job search conversation for the assistant's memory. \
         Keep the user's goals, preferences, constraints, jobs discussed (with ids) \
         and decisions. At most 150 words, plain text.",
        prompt,
    )
}

/// Title for a chat derived from its first user message
pub fn chat_title(message: &str) -> String {
    let collapsed = collapse_whitespace(message);
    if collapsed.chars().count() > CHAT_TITLE_MAX_CHARS {
        let title: String = collapsed.chars().take(CHAT_TITLE_MAX_CHARS).collect();
        format!("{}...", title.trim_end())
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: i64, sender: Sender, text: &str) -> StoredMessage {
        StoredMessage {
            id,
            sender,
            message: text.to_string(),
            jobs: None,
            created_at: String::new(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Jordan Lee".to_string(),
            email: "jordan@example.com".to_string(),
            phone: String::new(),
            location: "Toronto".to_string(),
            skills: vec![
                "Kotlin".to_string(),
                "Android".to_string(),
                "SQL".to_string(),
                "Figma".to_string(),
            ],
            experience: vec!["Mobile dev at Shopify".to_string()],
            profile_summary: "Mobile engineer".to_string(),
            education: Some(vec![]),
            certifications: None,
            projects: Some(vec!["Budget app".to_string()]),
            about: None,
        }
    }

    #[test]
    fn test_profile_digest_skips_empty_sections() {
        let digest = profile_digest(&profile());
        assert!(digest.contains("Skills: Kotlin, Android, SQL, Figma"));
        assert!(digest.contains("Projects: Budget app"));
        assert!(!digest.contains("Education"));
        assert!(!digest.contains("About"));
    }

    #[test]
    fn test_greeting_mentions_top_skills() {
        let text = greeting(&profile());
        assert!(text.starts_with("Hi Jordan!"));
        assert!(text.contains("Kotlin, Android, SQL"));
        assert!(!text.contains("Figma"));
    }

    #[test]
    fn test_history_drops_leading_bot_and_merges() {
        let messages = vec![
            message(1, Sender::Bot, "Hi!"),
            message(2, Sender::User, "find jobs"),
            message(3, Sender::User, "in Toronto"),
            message(4, Sender::Bot, "Here are some"),
        ];
        let contents = history_contents(&messages);
        assert_eq!(contents.len(), 2);
        assert!(contents[0].is_role(ROLE_USER));
        assert_eq!(contents[0].parts.len(), 2);
        assert!(contents[1].is_role(ROLE_MODEL));
    }

    #[test]
    fn test_summary_split_threshold() {
        let messages: Vec<StoredMessage> = (1..=10)
            .map(|i| message(i, Sender::User, "m"))
            .collect();
        assert!(summary_split(&messages, 10, 6).is_none());

        let mut more = messages.clone();
        more.push(message(11, Sender::Bot, "m"));
        let (folded, upto) = summary_split(&more, 10, 6).unwrap();
        assert_eq!(folded.len(), 5);
        assert_eq!(upto, 5);
    }

    #[test]
    fn test_chat_title() {
        assert_eq!(chat_title("  find   rust\njobs "), "find rust jobs");
        let long = "I am looking for a senior backend engineering role in Berlin";
        let title = chat_title(long);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= CHAT_TITLE_MAX_CHARS + 3);
    }

    #[test]
    fn test_system_instruction_includes_summary_and_job() {
        let chat = ChatRecord {
            id: "c".to_string(),
            user_id: 1,
            chat_name: DEFAULT_CHAT_NAME.to_string(),
            permanent_context: "Mobile engineer in Toronto".to_string(),
            summary: Some("Wants remote roles".to_string()),
            summarized_upto: 4,
            selected_job: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let text = system_instruction(&chat, None);
        assert!(text.contains("Mobile engineer in Toronto"));
        assert!(text.contains("Wants remote roles"));
        assert!(!text.contains("JOB THE USER"));
    }
}

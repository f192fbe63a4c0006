// src/jsearch/cards.rs
//! Projection of raw JSearch postings into the cards shown in the chat

use super::types::{RawJob, SearchResponse};
use crate::types::JobCard;

pub const DESCRIPTION_PREVIEW_CHARS: usize = 500;
const DEFAULT_SALARY_PERIOD: &str = "yearly";

impl From<&RawJob> for JobCard {
    fn from(job: &RawJob) -> Self {
        JobCard {
            job_id: job.job_id.clone().unwrap_or_default(),
            job_title: job
                .job_title
                .clone()
                .unwrap_or_else(|| "Unknown Title".to_string()),
            employer_name: job
                .employer_name
                .clone()
                .unwrap_or_else(|| "Unknown Company".to_string()),
            job_description: preview_description(job.job_description.as_deref().unwrap_or("")),
            job_location: job
                .job_location
                .clone()
                .filter(|l| !l.is_empty())
                .or_else(|| job.job_city.clone())
                .unwrap_or_default(),
            job_salary: format_salary(job),
            job_employment_type: job.job_employment_type.clone().unwrap_or_default(),
            job_apply_link: job.job_apply_link.clone().unwrap_or_default(),
            job_posted_at: job.job_posted_at.clone().unwrap_or_default(),
            job_is_remote: job.job_is_remote,
            employer_logo: job.employer_logo.clone(),
            job_highlights: job.job_highlights.clone(),
        }
    }
}

pub fn cards_from_response(response: &SearchResponse) -> Vec<JobCard> {
    response.data.iter().map(JobCard::from).collect()
}

/// `"$120,000 - $150,000 yearly"` when both bounds are known, else the
/// provider's free-form salary text
pub fn format_salary(job: &RawJob) -> Option<String> {
    match (job.job_min_salary, job.job_max_salary) {
        (Some(min), Some(max)) if min != 0.0 && max != 0.0 => {
            let period = job
                .job_salary_period
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_SALARY_PERIOD);
            Some(format!(
                "${} - ${} {}",
                thousands(min),
                thousands(max),
                period
            ))
        }
        _ => job.job_salary.clone().filter(|s| !s.is_empty()),
    }
}

fn preview_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{}...", preview)
    } else {
        description.to_string()
    }
}

/// Round to a whole number and group digits by three
fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> RawJob {
        RawJob {
            job_id: Some("abc123".to_string()),
            job_title: Some("Backend Engineer".to_string()),
            employer_name: Some("Ferris Inc".to_string()),
            job_apply_link: Some("https://example.com/apply".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_salary_range_is_grouped() {
        let mut raw = job();
        raw.job_min_salary = Some(120000.0);
        raw.job_max_salary = Some(1_500_000.4);
        raw.job_salary_period = Some("YEAR".to_string());
        assert_eq!(
            format_salary(&raw).as_deref(),
            Some("$120,000 - $1,500,000 YEAR")
        );
    }

    #[test]
    fn test_salary_defaults_period_and_falls_back() {
        let mut raw = job();
        raw.job_min_salary = Some(50.0);
        raw.job_max_salary = Some(70.0);
        assert_eq!(format_salary(&raw).as_deref(), Some("$50 - $70 yearly"));

        raw.job_max_salary = None;
        raw.job_salary = Some("Competitive".to_string());
        assert_eq!(format_salary(&raw).as_deref(), Some("Competitive"));

        raw.job_salary = None;
        assert_eq!(format_salary(&raw), None);
    }

    #[test]
    fn test_zero_bound_is_not_a_range() {
        let mut raw = job();
        raw.job_min_salary = Some(0.0);
        raw.job_max_salary = Some(90000.0);
        assert_eq!(format_salary(&raw), None);
    }

    #[test]
    fn test_long_description_is_truncated() {
        let mut raw = job();
        raw.job_description = Some("é".repeat(600));
        let card = JobCard::from(&raw);
        assert_eq!(card.job_description.chars().count(), 503);
        assert!(card.job_description.ends_with("..."));

        raw.job_description = Some("short".to_string());
        assert_eq!(JobCard::from(&raw).job_description, "short");
    }

    #[test]
    fn test_defaults_and_location_fallback() {
        let raw = RawJob {
            job_city: Some("Chicago".to_string()),
            ..Default::default()
        };
        let card = JobCard::from(&raw);
        assert_eq!(card.job_title, "Unknown Title");
        assert_eq!(card.employer_name, "Unknown Company");
        assert_eq!(card.job_location, "Chicago");
        assert_eq!(card.job_id, "");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(123456789.0), "123,456,789");
    }
}

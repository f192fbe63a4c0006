// src/chat/tools.rs
//! Function declarations offered to the model and the results fed back

use serde_json::{json, Value};

use crate::llm::{FunctionDeclaration, Tool};
use crate::types::JobCard;

pub const SEARCH_JOBS: &str = "search_jobs";

pub fn search_jobs_tool() -> Tool {
    Tool {
        function_declarations: vec![FunctionDeclaration {
            name: SEARCH_JOBS.to_string(),
            description: "Search current job postings. Use it whenever the user asks for jobs, \
                          openings or roles. Build the query from the role and location, e.g. \
                          'backend developer in Berlin'."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Free-form search, job title plus optional location"
                    },
                    "page": {"type": "integer", "description": "Page to return, starting at 1"},
                    "num_pages": {"type": "integer", "description": "Number of pages to fetch"},
                    "country": {
                        "type": "string",
                        "description": "ISO 3166-1 alpha-2 country code, e.g. us, de"
                    },
                    "date_posted": {
                        "type": "string",
                        "enum": ["all", "today", "3days", "week", "month"]
                    },
                    "employment_types": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": ["FULLTIME", "CONTRACTOR", "PARTTIME", "INTERN"]
                        }
                    },
                    "job_requirements": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": [
                                "under_3_years_experience",
                                "more_than_3_years_experience",
                                "no_experience",
                                "no_degree"
                            ]
                        }
                    },
                    "work_from_home": {"type": "boolean", "description": "Remote jobs only"},
                    "radius": {"type": "integer", "description": "Distance from the location in km"}
                },
                "required": ["query"]
            }),
        }],
    }
}

/// What the model sees of a search: enough to describe and compare jobs,
/// without the full descriptions
pub fn search_result(cards: &[JobCard]) -> Value {
    let jobs: Vec<Value> = cards
        .iter()
        .map(|card| {
            json!({
                "job_id": card.job_id,
                "title": card.job_title,
                "company": card.employer_name,
                "location": card.job_location,
                "salary": card.job_salary,
                "employment_type": card.job_employment_type,
                "is_remote": card.job_is_remote,
            })
        })
        .collect();

    json!({ "count": jobs.len(), "jobs": jobs })
}

pub fn error_result(message: &str) -> Value {
    json!({ "error": message })
}

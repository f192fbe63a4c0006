// src/jsearch/params.rs
//! Query parameters of the JSearch `/search` endpoint

use anyhow::Result;
use serde_json::Value;

pub const MIN_PAGE: u8 = 1;
pub const MAX_PAGE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePosted {
    #[default]
    All,
    Today,
    ThreeDays,
    Week,
    Month,
}

impl DatePosted {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatePosted::All => "all",
            DatePosted::Today => "today",
            DatePosted::ThreeDays => "3days",
            DatePosted::Week => "week",
            DatePosted::Month => "month",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Some(DatePosted::All),
            "today" => Some(DatePosted::Today),
            "3days" => Some(DatePosted::ThreeDays),
            "week" => Some(DatePosted::Week),
            "month" => Some(DatePosted::Month),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentType {
    FullTime,
    Contractor,
    PartTime,
    Intern,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "FULLTIME",
            EmploymentType::Contractor => "CONTRACTOR",
            EmploymentType::PartTime => "PARTTIME",
            EmploymentType::Intern => "INTERN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().replace(['-', '_', ' '], "").as_str() {
            "FULLTIME" => Some(EmploymentType::FullTime),
            "CONTRACTOR" => Some(EmploymentType::Contractor),
            "PARTTIME" => Some(EmploymentType::PartTime),
            "INTERN" => Some(EmploymentType::Intern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobRequirement {
    UnderThreeYearsExperience,
    MoreThanThreeYearsExperience,
    NoExperience,
    NoDegree,
}

impl JobRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobRequirement::UnderThreeYearsExperience => "under_3_years_experience",
            JobRequirement::MoreThanThreeYearsExperience => "more_than_3_years_experience",
            JobRequirement::NoExperience => "no_experience",
            JobRequirement::NoDegree => "no_degree",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "under_3_years_experience" => Some(JobRequirement::UnderThreeYearsExperience),
            "more_than_3_years_experience" => Some(JobRequirement::MoreThanThreeYearsExperience),
            "no_experience" => Some(JobRequirement::NoExperience),
            "no_degree" => Some(JobRequirement::NoDegree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub page: u8,
    pub num_pages: u8,
    pub country: String,
    pub date_posted: DatePosted,
    pub employment_types: Vec<EmploymentType>,
    pub job_requirements: Vec<JobRequirement>,
    pub work_from_home: bool,
    pub radius: Option<u32>,
    pub exclude_job_publishers: Vec<String>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            num_pages: 1,
            country: "us".to_string(),
            date_posted: DatePosted::All,
            employment_types: Vec::new(),
            job_requirements: Vec::new(),
            work_from_home: false,
            radius: None,
            exclude_job_publishers: Vec::new(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_page(mut self, page: u8) -> Self {
        self.page = page;
        self
    }

    pub fn remote_only(mut self) -> Self {
        self.work_from_home = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            anyhow::bail!("Search query cannot be empty");
        }
        if !(MIN_PAGE..=MAX_PAGE).contains(&self.page) {
            anyhow::bail!("page must be between {} and {}", MIN_PAGE, MAX_PAGE);
        }
        if !(MIN_PAGE..=MAX_PAGE).contains(&self.num_pages) {
            anyhow::bail!("num_pages must be between {} and {}", MIN_PAGE, MAX_PAGE);
        }
        if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_alphabetic()) {
            anyhow::bail!("country must be an ISO-3166-1 alpha-2 code: {}", self.country);
        }
        Ok(())
    }

    /// Query string pairs, optional filters only when they are set
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("query", self.query.clone()),
            ("page", self.page.to_string()),
            ("num_pages", self.num_pages.to_string()),
            ("country", self.country.to_lowercase()),
            ("date_posted", self.date_posted.as_str().to_string()),
        ];

        if !self.employment_types.is_empty() {
            let joined: Vec<&str> = self.employment_types.iter().map(|t| t.as_str()).collect();
            query.push(("employment_types", joined.join(",")));
        }
        if !self.job_requirements.is_empty() {
            let joined: Vec<&str> = self.job_requirements.iter().map(|r| r.as_str()).collect();
            query.push(("job_requirements", joined.join(",")));
        }
        if self.work_from_home {
            query.push(("work_from_home", "true".to_string()));
        }
        if let Some(radius) = self.radius.filter(|r| *r > 0) {
            query.push(("radius", radius.to_string()));
        }
        if !self.exclude_job_publishers.is_empty() {
            query.push(("exclude_job_publishers", self.exclude_job_publishers.join(",")));
        }

        query
    }

    /// Build parameters from the arguments of a `search_jobs` function call.
    ///
    /// Models are loose with types: numbers may arrive as strings, lists as
    /// comma separated strings or arrays. Unknown enum members are dropped and
    /// pages are clamped instead of rejected.
    pub fn from_tool_args(args: &Value, default_country: &str) -> Result<Self> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| anyhow::anyhow!("search_jobs requires a non-empty 'query'"))?;

        let mut params = SearchParams::new(query).with_country(default_country);

        if let Some(page) = number_arg(args, "page") {
            params.page = clamp_page(page);
        }
        if let Some(num_pages) = number_arg(args, "num_pages") {
            params.num_pages = clamp_page(num_pages);
        }
        if let Some(country) = args.get("country").and_then(Value::as_str) {
            let country = country.trim().to_lowercase();
            if country.len() == 2 {
                params.country = country;
            }
        }
        if let Some(date_posted) = args
            .get("date_posted")
            .and_then(Value::as_str)
            .and_then(DatePosted::parse)
        {
            params.date_posted = date_posted;
        }
        params.employment_types = list_arg(args, "employment_types")
            .iter()
            .filter_map(|v| EmploymentType::parse(v))
            .collect();
        params.job_requirements = list_arg(args, "job_requirements")
            .iter()
            .filter_map(|v| JobRequirement::parse(v))
            .collect();
        params.work_from_home = bool_arg(args, "work_from_home").unwrap_or(false);
        params.radius = number_arg(args, "radius")
            .filter(|r| *r > 0)
            .map(|r| r.min(u32::MAX as u64) as u32);
        params.exclude_job_publishers = list_arg(args, "exclude_job_publishers");

        Ok(params)
    }
}

fn clamp_page(value: u64) -> u8 {
    value.clamp(MIN_PAGE as u64, MAX_PAGE as u64) as u8
}

fn number_arg(args: &Value, key: &str) -> Option<u64> {
    match args.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_arg(args: &Value, key: &str) -> Option<bool> {
    match args.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn list_arg(args: &Value, key: &str) -> Vec<String> {
    match args.get(key) {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_query_only_has_required_pairs() {
        let query = SearchParams::new("developer jobs in chicago").to_query();
        let keys: Vec<&str> = query.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["query", "page", "num_pages", "country", "date_posted"]);
        assert!(query.contains(&("date_posted", "all".to_string())));
    }

    #[test]
    fn test_optional_filters_are_encoded() {
        let mut params = SearchParams::new("rust").remote_only();
        params.employment_types = vec![EmploymentType::FullTime, EmploymentType::Contractor];
        params.job_requirements = vec![JobRequirement::NoDegree];
        params.radius = Some(25);
        let query = params.to_query();
        assert!(query.contains(&("employment_types", "FULLTIME,CONTRACTOR".to_string())));
        assert!(query.contains(&("job_requirements", "no_degree".to_string())));
        assert!(query.contains(&("work_from_home", "true".to_string())));
        assert!(query.contains(&("radius", "25".to_string())));
    }

    #[test]
    fn test_zero_radius_is_omitted() {
        let mut params = SearchParams::new("rust");
        params.radius = Some(0);
        assert!(!params.to_query().iter().any(|(k, _)| *k == "radius"));
    }

    #[test]
    fn test_validate() {
        assert!(SearchParams::new("rust").validate().is_ok());
        assert!(SearchParams::new("  ").validate().is_err());
        assert!(SearchParams::new("rust").with_page(51).validate().is_err());
        assert!(SearchParams::new("rust").with_country("usa").validate().is_err());
    }

    #[test]
    fn test_from_tool_args_is_lenient() {
        let args = json!({
            "query": "python developer",
            "page": "3",
            "num_pages": 120,
            "date_posted": "week",
            "employment_types": "FULLTIME, part-time, WHATEVER",
            "job_requirements": ["no_degree", "bogus"],
            "work_from_home": "true",
            "country": "DE"
        });
        let params = SearchParams::from_tool_args(&args, "us").unwrap();
        assert_eq!(params.query, "python developer");
        assert_eq!(params.page, 3);
        assert_eq!(params.num_pages, 50);
        assert_eq!(params.date_posted, DatePosted::Week);
        assert_eq!(
            params.employment_types,
            vec![EmploymentType::FullTime, EmploymentType::PartTime]
        );
        assert_eq!(params.job_requirements, vec![JobRequirement::NoDegree]);
        assert!(params.work_from_home);
        assert_eq!(params.country, "de");
    }

    #[test]
    fn test_from_tool_args_requires_query() {
        assert!(SearchParams::from_tool_args(&json!({"page": 1}), "us").is_err());
        assert!(SearchParams::from_tool_args(&json!({"query": " "}), "us").is_err());
    }
}

use serde::{Deserialize, Serialize};

/// One scraped posting before eligibility is determined. Lives only for the
/// duration of a single run.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    pub title: String,
    pub company: String,
    pub tags: Vec<String>,
    pub description: String,
    pub apply_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Internship")]
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalaryType {
    #[serde(rename = "Fixed")]
    Fixed,
    #[serde(rename = "Hourly")]
    Hourly,
    #[serde(rename = "Negotiable")]
    Negotiable,
    #[serde(rename = "Commission")]
    Commission,
}

/// A fully normalized job row, shaped exactly like the destination `jobs`
/// table. Serde renames match the column names.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String, // always "Worldwide"
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: String,
    pub salary: f64, // 0 means "not listed", not an error
    #[serde(rename = "salaryType")]
    pub salary_type: SalaryType,
    pub logo: String,
    pub description: String,
    #[serde(rename = "datePosted")]
    pub date_posted: String,
    #[serde(rename = "applyUrl")]
    pub apply_url: String,
    pub published: bool,
    pub slug: String,
    #[serde(rename = "new")]
    pub is_new: bool,
    pub featured: bool,
}

use anyhow::Result;
use chrono::Utc;
use regex::Regex;

use crate::models::{JobRecord, JobType, RawCandidate, SalaryType};

const DEFAULT_LOGO: &str = "https://logo.clearbit.com/default.com";
const MAX_DESCRIPTION_CHARS: usize = 5000;
const MAX_SLUG_BASE_CHARS: usize = 100;
const MAX_LOGO_NAME_CHARS: usize = 30;

// Tag -> category lookup. The first candidate tag found here decides the
// category; unknown tag sets fall through to "General".
const TAG_CATEGORIES: &[(&str, &str)] = &[
    ("frontend", "Frontend"),
    ("backend", "Backend"),
    ("full stack", "Fullstack"),
    ("devops", "DevOps"),
    ("mobile", "Mobile Development"),
    ("design", "Design"),
    ("data", "Data Science"),
    ("ai", "AI & Machine Learning"),
    ("machine learning", "AI & Machine Learning"),
    ("react", "Frontend"),
    ("vue", "Frontend"),
    ("angular", "Frontend"),
    ("node", "Backend"),
    ("python", "Backend"),
    ("java", "Backend"),
    ("javascript", "Frontend"),
    ("typescript", "Frontend"),
    ("ui/ux", "Design"),
    ("product", "Product"),
    ("marketing", "Marketing"),
    ("sales", "Sales"),
    ("support", "Customer Support"),
    ("qa", "QA Engineer"),
    ("testing", "QA Engineer"),
];

/// Derives the structured columns of a job row from unstructured posting
/// text. Every method is deterministic for a given input except
/// `make_slug` (timestamp suffix) and the `featured` roll in `normalize`.
pub struct Normalizer {
    salary_patterns: Vec<Regex>,
    slug_scrub: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        // Ordered: currency-prefixed amounts, "usd"/"dollars" suffixes, an
        // explicit salary label, then bare hyphenated ranges. First match
        // wins. Text is lowercased before matching.
        let salary_patterns = vec![
            Regex::new(r"\$(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)k?\b")?,
            Regex::new(r"(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)k?\s*(?:usd|dollars?)\b")?,
            Regex::new(r"salary:\s*\$?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)")?,
            Regex::new(r"\$?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)\s*-\s*\$?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)")?,
        ];
        let slug_scrub = Regex::new(r"[^a-z0-9]+")?;

        Ok(Self {
            salary_patterns,
            slug_scrub,
        })
    }

    pub fn job_type(&self, title: &str, description: &str) -> JobType {
        let text = format!("{} {}", title, description).to_lowercase();

        if text.contains("part-time") || text.contains("part time") {
            JobType::PartTime
        } else if text.contains("contract") || text.contains("freelance") {
            JobType::Contract
        } else if text.contains("intern") || text.contains("internship") {
            JobType::Internship
        } else {
            JobType::FullTime
        }
    }

    /// First numeric capture across the ordered patterns, thousands
    /// separators stripped. "80k"-style shorthand is expanded. `0.0` is the
    /// defined "not listed" sentinel, never an error.
    pub fn salary(&self, description: &str) -> f64 {
        let text = description.to_lowercase();

        for pattern in &self.salary_patterns {
            if let Some(cap) = pattern.captures(&text) {
                let Some(group) = cap.get(1) else { continue };
                let Ok(value) = group.as_str().replace(',', "").parse::<f64>() else {
                    continue;
                };

                let whole = cap.get(0).map(|m| m.as_str()).unwrap_or_default();
                if whole.contains('k') && value < 1000.0 {
                    return value * 1000.0;
                }
                return value;
            }
        }

        0.0
    }

    pub fn salary_type(&self, description: &str, salary: f64) -> SalaryType {
        if salary > 0.0 {
            return SalaryType::Fixed;
        }

        let text = description.to_lowercase();
        if text.contains("negotiable") || text.contains("competitive") {
            SalaryType::Negotiable
        } else if text.contains("hourly") || text.contains("per hour") {
            SalaryType::Hourly
        } else if text.contains("commission") || text.contains("bonus") {
            SalaryType::Commission
        } else {
            SalaryType::Negotiable
        }
    }

    pub fn category(&self, tags: &[String]) -> String {
        for tag in tags {
            let tag = tag.to_lowercase();
            if let Some((_, category)) = TAG_CATEGORIES.iter().find(|(key, _)| *key == tag) {
                return (*category).to_string();
            }
        }
        "General".to_string()
    }

    /// Deterministic logo guess off the company name. Nothing verifies the
    /// URL resolves; consumers are expected to fall back on broken images.
    pub fn logo_url(&self, company: &str) -> String {
        let clean: String = company
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(MAX_LOGO_NAME_CHARS)
            .collect();

        if clean.is_empty() {
            DEFAULT_LOGO.to_string()
        } else {
            format!("https://logo.clearbit.com/{}.com", clean)
        }
    }

    /// `"{title}-at-{company}"` slugified, capped at 100 characters, with the
    /// last six digits of the epoch-millisecond clock appended. Practically
    /// unique; true collisions are the persister's problem.
    pub fn make_slug(&self, title: &str, company: &str) -> String {
        self.slug_with_millis(title, company, Utc::now().timestamp_millis())
    }

    fn slug_with_millis(&self, title: &str, company: &str, millis: i64) -> String {
        let base = format!("{}-at-{}", title, company).to_lowercase();
        let base = self.slug_scrub.replace_all(&base, "-");
        let base = truncate_chars(base.trim_matches('-'), MAX_SLUG_BASE_CHARS);
        format!("{}-{:06}", base, millis.rem_euclid(1_000_000))
    }

    /// The single raw-to-row boundary: everything past here is one explicit
    /// shape.
    pub fn normalize(&self, candidate: &RawCandidate) -> JobRecord {
        let salary = self.salary(&candidate.description);

        JobRecord {
            title: candidate.title.clone(),
            company: candidate.company.clone(),
            location: "Worldwide".to_string(),
            job_type: self.job_type(&candidate.title, &candidate.description),
            category: self.category(&candidate.tags),
            salary,
            salary_type: self.salary_type(&candidate.description, salary),
            logo: self.logo_url(&candidate.company),
            description: truncate_chars(&candidate.description, MAX_DESCRIPTION_CHARS).to_string(),
            date_posted: Utc::now().to_rfc3339(),
            apply_url: candidate.apply_url.clone(),
            published: true,
            slug: self.make_slug(&candidate.title, &candidate.company),
            is_new: true,
            featured: rand::random::<f64>() > 0.8,
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

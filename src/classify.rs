use crate::models::RawCandidate;

// Phrases that signal a posting is open to applicants anywhere.
const WORLDWIDE_TERMS: &[&str] = &[
    "worldwide",
    "global",
    "anywhere",
    "remote worldwide",
    "worldwide remote",
    "international",
    "fully remote",
    "remote (global)",
    "remote - worldwide",
    "100% remote",
    "world wide",
    "any location",
    "any country",
    "anywhere in the world",
    "location independent",
    "work from anywhere",
    "globally remote",
];

// Phrases that tie a posting to a region, timezone, or residency. Any hit
// disqualifies, even alongside a worldwide term.
const RESTRICTION_TERMS: &[&str] = &[
    "usa only",
    "us only",
    "united states",
    "america only",
    "north america",
    "europe",
    "european",
    "uk only",
    "germany",
    "emea",
    "apac",
    "latin america",
    "canada only",
    "australia",
    "asia",
    "africa",
    "specific country",
    "timezone",
    "gmt",
    "est",
    "pst",
    "cst",
    "within",
    "based in",
    "resident of",
    "citizen of",
    "authorized to work in",
    "must be located in",
    "restricted to",
    "only for",
    "exclusively for",
];

/// Keyword lists for the worldwide-eligibility decision. The lists are data,
/// not code: swap them without touching the matching logic.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            positive: WORLDWIDE_TERMS.iter().map(|s| s.to_string()).collect(),
            negative: RESTRICTION_TERMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClassifierRules {
    /// Two-pass substring scan over the candidate's combined text. Eligible
    /// only when a positive term is present and no restriction term is.
    /// Deliberately conservative: ambiguous postings are rejected.
    pub fn is_worldwide(&self, candidate: &RawCandidate) -> bool {
        let blob = format!(
            "{} {} {}",
            candidate.title,
            candidate.description,
            candidate.tags.join(" ")
        )
        .to_lowercase();

        let has_worldwide_term = self.positive.iter().any(|term| blob.contains(term.as_str()));
        let has_restriction = self.negative.iter().any(|term| blob.contains(term.as_str()));

        has_worldwide_term && !has_restriction
    }
}

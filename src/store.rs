use anyhow::{anyhow, Context, Result};
use reqwest::header;
use std::time::Duration;

use crate::config::Config;
use crate::models::JobRecord;

/// What the persister needs from a destination store: a point lookup by slug
/// and a single-row insert.
pub trait JobSink {
    fn slug_exists(&self, slug: &str) -> Result<bool>;
    fn insert(&self, job: &JobRecord) -> Result<()>;
}

/// REST client for the shared `jobs` table. The backend speaks the
/// PostgREST row API: filters in the query string, JSON rows in the body,
/// service key in both `apikey` and `Authorization` headers.
pub struct JobStore {
    base_url: String,
    service_key: String,
    client: reqwest::blocking::Client,
}

impl JobStore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build store HTTP client")?;

        Ok(Self {
            base_url: config.supabase_url.clone(),
            service_key: config.service_key.clone(),
            client,
        })
    }

    fn jobs_endpoint(&self) -> String {
        format!("{}/rest/v1/jobs", self.base_url)
    }
}

impl JobSink for JobStore {
    fn slug_exists(&self, slug: &str) -> Result<bool> {
        let filter = format!("eq.{}", slug);
        let response = self
            .client
            .get(self.jobs_endpoint())
            .query(&[("select", "slug"), ("slug", filter.as_str()), ("limit", "1")])
            .header("apikey", &self.service_key)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.service_key),
            )
            .send()
            .context("Failed to query jobs table for slug")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Slug lookup failed with status {}: {}",
                status,
                body
            ));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .context("Failed to parse slug lookup response")?;
        Ok(!rows.is_empty())
    }

    fn insert(&self, job: &JobRecord) -> Result<()> {
        let response = self
            .client
            .post(self.jobs_endpoint())
            .header("apikey", &self.service_key)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.service_key),
            )
            .header("Prefer", "return=minimal")
            .json(job)
            .send()
            .context("Failed to send insert request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("Insert rejected with status {}: {}", status, body));
        }

        Ok(())
    }
}

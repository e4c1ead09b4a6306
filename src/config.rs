use anyhow::{Context, Result};
use std::env;

/// Destination-store credentials, read once at startup and passed by
/// reference into the components that need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub service_key: String,
}

impl Config {
    /// Reads credentials from the environment. The site's deploy tooling
    /// exports the URL under either name, so both are accepted.
    pub fn from_env() -> Result<Self> {
        let url = env::var("SUPABASE_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_URL"))
            .context(
                "SUPABASE_URL environment variable not set (NEXT_PUBLIC_SUPABASE_URL is also accepted). Check .env.local",
            )?;
        let key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|_| env::var("SUPABASE_KEY"))
            .context(
                "SUPABASE_SERVICE_ROLE_KEY environment variable not set (SUPABASE_KEY is also accepted). Check .env.local",
            )?;

        Ok(Self {
            supabase_url: url.trim_end_matches('/').to_string(),
            service_key: key,
        })
    }
}

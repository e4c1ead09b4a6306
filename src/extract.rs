use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

use crate::models::RawCandidate;

/// Origin used to resolve the relative apply links the listing site emits.
pub const SOURCE_ORIGIN: &str = "https://remoteok.io";

/// Pulls raw candidates out of the listing page. The site renders one
/// posting per `tr.job` row; title and company are adjacent headings inside
/// the row's company block.
pub struct ListingExtractor {
    rows: Selector,
    title: Selector,
    company: Selector,
    tags: Selector,
    apply: Selector,
    description: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {}", css, e))
}

impl ListingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rows: selector("tr.job")?,
            title: selector(".company h2")?,
            company: selector(".company h3")?,
            tags: selector(".tags .tag")?,
            apply: selector(".source a")?,
            description: selector(".description")?,
        })
    }

    /// Re-parses the document on every call and walks the job rows. Rows
    /// missing a title, company, or apply link are scraping noise and are
    /// skipped without comment.
    pub fn extract(&self, html: &str) -> Vec<RawCandidate> {
        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        for row in document.select(&self.rows) {
            let title = first_text(row, &self.title);
            let company = first_text(row, &self.company);

            let Some(apply_url) = row
                .select(&self.apply)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(absolutize)
            else {
                continue;
            };

            if title.is_empty() || company.is_empty() {
                continue;
            }

            let tags: Vec<String> = row
                .select(&self.tags)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();

            let description = row
                .select(&self.description)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| {
                    format!("{} at {}. Apply via {}", title, company, apply_url)
                });

            candidates.push(RawCandidate {
                title,
                company,
                tags,
                description,
                apply_url,
            });
        }

        candidates
    }
}

fn first_text(row: ElementRef, sel: &Selector) -> String {
    row.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", SOURCE_ORIGIN, href)
    }
}

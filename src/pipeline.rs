use chrono::Utc;
use std::thread;
use std::time::{Duration, Instant};

use crate::classify::ClassifierRules;
use crate::models::{JobRecord, RawCandidate};
use crate::normalize::Normalizer;
use crate::store::JobSink;

/// Aggregate counts for one scrape run. This is the only result the
/// operator sees beyond the per-item progress lines.
#[derive(Debug, Default)]
pub struct ScrapeStats {
    pub seen: usize,
    pub eligible: usize,
    pub inserted: usize,
    pub failed: usize,
}

/// Fixed-interval gate between writes to the destination store.
pub struct RateGate {
    interval: Duration,
    last: Option<Instant>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Blocks until at least `interval` has passed since the previous call.
    /// The first call never waits.
    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Classifier + normalizer pass: keeps worldwide-eligible candidates and
/// shapes them into destination rows. Rejections are expected filtering, not
/// errors, so they are only visible as a count difference.
pub fn screen(
    candidates: &[RawCandidate],
    rules: &ClassifierRules,
    normalizer: &Normalizer,
) -> Vec<JobRecord> {
    candidates
        .iter()
        .filter(|c| rules.is_worldwide(c))
        .map(|c| normalizer.normalize(c))
        .collect()
}

/// Inserts each record independently. A slug collision gets exactly one
/// regeneration (company name widened by the current timestamp) with no
/// re-check; any per-record error is counted and the batch moves on.
/// Returns (inserted, failed); outside dry runs the two always sum to the
/// number of records given.
pub fn persist(
    jobs: Vec<JobRecord>,
    sink: &dyn JobSink,
    normalizer: &Normalizer,
    gate: &mut RateGate,
    dry_run: bool,
) -> (usize, usize) {
    let mut inserted = 0;
    let mut failed = 0;

    for mut job in jobs {
        if dry_run {
            println!(
                "[DRY RUN] Would insert: {} at {} ({})",
                job.title, job.company, job.slug
            );
            continue;
        }

        gate.wait();

        match sink.slug_exists(&job.slug) {
            Ok(true) => {
                let widened = format!("{}-{}", job.company, Utc::now().timestamp_millis());
                job.slug = normalizer.make_slug(&job.title, &widened);
            }
            Ok(false) => {}
            Err(e) => {
                eprintln!("  Error checking slug for {}: {}", job.title, e);
                failed += 1;
                continue;
            }
        }

        match sink.insert(&job) {
            Ok(()) => {
                println!("  {} at {}", job.title, job.company);
                inserted += 1;
            }
            Err(e) => {
                eprintln!("  Failed to insert {}: {}", job.title, e);
                failed += 1;
            }
        }
    }

    (inserted, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    fn candidate(title: &str, description: &str) -> RawCandidate {
        RawCandidate {
            title: title.to_string(),
            company: "Acme".to_string(),
            tags: vec!["node".to_string()],
            description: description.to_string(),
            apply_url: "https://remoteok.io/remote-jobs/1".to_string(),
        }
    }

    fn job(title: &str, slug: &str) -> JobRecord {
        let normalizer = Normalizer::new().unwrap();
        let mut record = normalizer.normalize(&candidate(title, "work from anywhere"));
        record.slug = slug.to_string();
        record
    }

    #[derive(Default)]
    struct MockSink {
        existing: RefCell<HashSet<String>>,
        inserted: RefCell<Vec<JobRecord>>,
        fail_titles: HashSet<String>,
        lookups: Cell<usize>,
    }

    impl JobSink for MockSink {
        fn slug_exists(&self, slug: &str) -> Result<bool, anyhow::Error> {
            self.lookups.set(self.lookups.get() + 1);
            Ok(self.existing.borrow().contains(slug))
        }

        fn insert(&self, job: &JobRecord) -> Result<(), anyhow::Error> {
            if self.fail_titles.contains(&job.title) {
                return Err(anyhow!(
                    "duplicate key value violates unique constraint \"jobs_slug_key\""
                ));
            }
            self.existing.borrow_mut().insert(job.slug.clone());
            self.inserted.borrow_mut().push(job.clone());
            Ok(())
        }
    }

    #[test]
    fn test_screen_keeps_eligible_and_drops_restricted() {
        let rules = ClassifierRules::default();
        let normalizer = Normalizer::new().unwrap();
        let candidates = vec![
            candidate(
                "Backend Engineer",
                "Fully remote position, worldwide applicants welcome, $80,000/year",
            ),
            candidate(
                "Frontend Engineer",
                "Remote position, but must be based in the United States",
            ),
        ];

        let jobs = screen(&candidates, &rules, &normalizer);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Backend Engineer");
        assert_eq!(jobs[0].salary, 80000.0);
    }

    #[test]
    fn test_persist_counts_always_sum_to_input() {
        let normalizer = Normalizer::new().unwrap();
        let mut sink = MockSink::default();
        sink.fail_titles.insert("Bad Job".to_string());

        let jobs = vec![
            job("Good Job", "good-job-at-acme-000001"),
            job("Bad Job", "bad-job-at-acme-000002"),
            job("Another Good Job", "another-good-job-at-acme-000003"),
        ];
        let total = jobs.len();

        let mut gate = RateGate::new(Duration::from_millis(0));
        let (inserted, failed) = persist(jobs, &sink, &normalizer, &mut gate, false);

        assert_eq!(inserted, 2);
        assert_eq!(failed, 1);
        assert_eq!(inserted + failed, total);
    }

    #[test]
    fn test_persist_regenerates_slug_once_on_collision() {
        let normalizer = Normalizer::new().unwrap();
        let sink = MockSink::default();
        sink.existing
            .borrow_mut()
            .insert("backend-engineer-at-acme-000001".to_string());

        let jobs = vec![job("Backend Engineer", "backend-engineer-at-acme-000001")];
        let mut gate = RateGate::new(Duration::from_millis(0));
        let (inserted, failed) = persist(jobs, &sink, &normalizer, &mut gate, false);

        assert_eq!((inserted, failed), (1, 0));
        let stored = sink.inserted.borrow();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].slug, "backend-engineer-at-acme-000001");
        assert!(stored[0].slug.starts_with("backend-engineer-at-acme-"));
        // One lookup per record: the regenerated slug is not re-checked.
        assert_eq!(sink.lookups.get(), 1);
    }

    #[test]
    fn test_persist_same_title_and_company_end_with_distinct_slugs() {
        let normalizer = Normalizer::new().unwrap();
        let sink = MockSink::default();

        // Same millisecond can hand two identical candidates the same slug;
        // the collision check catches the second one.
        let jobs = vec![
            job("Backend Engineer", "backend-engineer-at-acme-555555"),
            job("Backend Engineer", "backend-engineer-at-acme-555555"),
        ];
        let mut gate = RateGate::new(Duration::from_millis(0));
        let (inserted, failed) = persist(jobs, &sink, &normalizer, &mut gate, false);

        assert_eq!((inserted, failed), (2, 0));
        let stored = sink.inserted.borrow();
        assert_ne!(stored[0].slug, stored[1].slug);
    }

    #[test]
    fn test_persist_insert_failure_does_not_halt_batch() {
        let normalizer = Normalizer::new().unwrap();
        let mut sink = MockSink::default();
        sink.fail_titles.insert("First".to_string());

        let jobs = vec![
            job("First", "first-at-acme-000001"),
            job("Second", "second-at-acme-000002"),
        ];
        let mut gate = RateGate::new(Duration::from_millis(0));
        let (inserted, failed) = persist(jobs, &sink, &normalizer, &mut gate, false);

        assert_eq!((inserted, failed), (1, 1));
        assert_eq!(sink.inserted.borrow()[0].title, "Second");
    }

    #[test]
    fn test_persist_dry_run_touches_nothing() {
        let normalizer = Normalizer::new().unwrap();
        let sink = MockSink::default();

        let jobs = vec![job("Engineer", "engineer-at-acme-000001")];
        let mut gate = RateGate::new(Duration::from_millis(0));
        let (inserted, failed) = persist(jobs, &sink, &normalizer, &mut gate, true);

        assert_eq!((inserted, failed), (0, 0));
        assert_eq!(sink.lookups.get(), 0);
        assert!(sink.inserted.borrow().is_empty());
    }

    #[test]
    fn test_rate_gate_enforces_interval() {
        let mut gate = RateGate::new(Duration::from_millis(30));
        let start = Instant::now();
        gate.wait(); // first pass is free
        gate.wait();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_rate_gate_first_wait_is_free() {
        let mut gate = RateGate::new(Duration::from_secs(60));
        let start = Instant::now();
        gate.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

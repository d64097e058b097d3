//! Ensure schema, populate once, verify.

use super::error::ProvisioningError;
use crate::entity_store::{
    EntityKind, EntityRow, EntityStore, InsertOutcome, PlayHistoryEntry, Track,
};
use crate::orchestrator::{StepKind, StepLog};
use crate::seed::SeedSource;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_VERIFY_SAMPLE_SIZE: usize = 5;

/// What provisioning one kind did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub kind: EntityKind,
    /// The kind's own table had to be created.
    pub schema_created: bool,
    /// The table already held rows, so no seed rows were inserted.
    pub already_populated: bool,
    /// Rows of this kind written.
    pub inserted: usize,
    /// Rows of dependency kinds written alongside (tracks for play history).
    pub dependency_inserted: usize,
    /// Dependency rows that were already stored.
    pub dependency_existing: usize,
    /// Rows of this kind dropped because their id was already stored.
    pub skipped_conflicts: usize,
    /// Row count observed during verification.
    pub observed: usize,
    /// Verification read back what was expected.
    pub verified: bool,
}

impl ProvisionReport {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            schema_created: false,
            already_populated: false,
            inserted: 0,
            dependency_inserted: 0,
            dependency_existing: 0,
            skipped_conflicts: 0,
            observed: 0,
            verified: false,
        }
    }
}

/// Runs the provisioning protocol for one entity kind at a time.
pub struct ProvisioningEngine {
    store: Arc<dyn EntityStore>,
    seeds: Arc<dyn SeedSource>,
    verify_sample_size: usize,
}

impl ProvisioningEngine {
    pub fn new(store: Arc<dyn EntityStore>, seeds: Arc<dyn SeedSource>) -> Self {
        Self {
            store,
            seeds,
            verify_sample_size: DEFAULT_VERIFY_SAMPLE_SIZE,
        }
    }

    /// Number of rows read back during verification.
    pub fn with_verify_sample_size(mut self, size: usize) -> Self {
        self.verify_sample_size = size.max(1);
        self
    }

    /// Provision a kind, timestamping any play history relative to now.
    pub fn provision(
        &self,
        kind: EntityKind,
        log: &mut StepLog,
    ) -> Result<ProvisionReport, ProvisioningError> {
        self.provision_at(kind, Utc::now(), log)
    }

    /// Provision a kind. Play history row `i` is stamped `now - i hours`.
    ///
    /// Re-running against a populated table inserts nothing.
    pub fn provision_at(
        &self,
        kind: EntityKind,
        now: DateTime<Utc>,
        log: &mut StepLog,
    ) -> Result<ProvisionReport, ProvisioningError> {
        let mut report = ProvisionReport::new(kind);

        for dependency in kind.dependencies() {
            self.ensure_schema(*dependency, log)?;
        }
        report.schema_created = self.ensure_schema(kind, log)?;

        let existing = self
            .store
            .count(kind)
            .map_err(|source| ProvisioningError::Read { kind, source })?;

        if existing > 0 {
            info!(%kind, rows = existing, "Table already populated, skipping seed");
            log.log_for(
                kind,
                StepKind::Population,
                format!(
                    "{} already populated ({} row(s)), skipping seed data",
                    kind.table_name(),
                    existing
                ),
            );
            report.already_populated = true;
        } else {
            log.start_timer();
            self.populate(kind, now, &mut report)?;
            info!(
                %kind,
                inserted = report.inserted,
                dependency_inserted = report.dependency_inserted,
                dependency_existing = report.dependency_existing,
                skipped = report.skipped_conflicts,
                "Seeded table"
            );
            let mut message = format!(
                "Inserted {} row(s) into {}",
                report.inserted,
                kind.table_name()
            );
            if let Some(note) = dependency_note(&report) {
                message.push_str(&format!(" ({})", note));
            }
            if report.skipped_conflicts > 0 {
                message.push_str(&format!(
                    ", {} already present",
                    report.skipped_conflicts
                ));
            }
            log.log_for_with_elapsed(kind, StepKind::Population, message);
        }

        self.verify(&mut report, log);

        Ok(report)
    }

    /// Make sure the kind's table exists. Returns whether it was created.
    fn ensure_schema(
        &self,
        kind: EntityKind,
        log: &mut StepLog,
    ) -> Result<bool, ProvisioningError> {
        match self.store.probe(kind) {
            Ok(()) => {
                debug!(%kind, "Table exists");
                log.log_for(
                    kind,
                    StepKind::Schema,
                    format!("Table {} exists", kind.table_name()),
                );
                Ok(false)
            }
            Err(probe_err) => {
                if !probe_err.is_missing_relation() {
                    warn!(%kind, error = %probe_err, "Probe failed, creating table anyway");
                }
                self.store
                    .ensure_schema(kind)
                    .map_err(|source| ProvisioningError::SchemaCreation { kind, source })?;
                info!(%kind, table = kind.table_name(), "Created table");
                log.log_for(
                    kind,
                    StepKind::Schema,
                    format!("Created table {}", kind.table_name()),
                );
                Ok(true)
            }
        }
    }

    fn populate(
        &self,
        kind: EntityKind,
        now: DateTime<Utc>,
        report: &mut ProvisionReport,
    ) -> Result<(), ProvisioningError> {
        let rows = self.seeds.fixture_rows(kind);

        if kind != EntityKind::PlayHistory {
            for row in &rows {
                self.insert(row, report, false)?;
            }
            return Ok(());
        }

        // History entries need their tracks stored first.
        let tracks: Vec<&Track> = rows
            .iter()
            .filter_map(|row| match row {
                EntityRow::Track(track) => Some(track),
                _ => None,
            })
            .collect();

        for row in &rows {
            self.insert(row, report, true)?;
        }
        for (i, track) in tracks.iter().enumerate() {
            let entry = EntityRow::PlayHistory(history_entry(track, i, now));
            self.insert(&entry, report, false)?;
        }
        Ok(())
    }

    fn insert(
        &self,
        row: &EntityRow,
        report: &mut ProvisionReport,
        dependency: bool,
    ) -> Result<(), ProvisioningError> {
        let outcome =
            self.store
                .insert(row)
                .map_err(|source| ProvisioningError::Population {
                    kind: row.kind(),
                    row_id: row.id().to_string(),
                    source,
                })?;

        match outcome {
            InsertOutcome::Inserted if dependency => report.dependency_inserted += 1,
            InsertOutcome::Inserted => report.inserted += 1,
            InsertOutcome::AlreadyExists if dependency => report.dependency_existing += 1,
            InsertOutcome::AlreadyExists => {
                debug!(kind = %row.kind(), id = row.id(), "Row already exists");
                report.skipped_conflicts += 1;
            }
        }
        Ok(())
    }

    /// Read back a sample. Problems are logged, never returned.
    fn verify(&self, report: &mut ProvisionReport, log: &mut StepLog) {
        let kind = report.kind;

        let observed = match self.store.count(kind) {
            Ok(n) => n,
            Err(e) => {
                warn!(%kind, error = %e, "Verification count failed");
                log.log_for(
                    kind,
                    StepKind::VerificationMismatch,
                    format!("Could not count {}: {}", kind.table_name(), e),
                );
                return;
            }
        };
        report.observed = observed;

        let sample = match self.store.select(kind, Some(self.verify_sample_size)) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(%kind, error = %e, "Verification read failed");
                log.log_for(
                    kind,
                    StepKind::VerificationMismatch,
                    format!("Could not read back {}: {}", kind.table_name(), e),
                );
                return;
            }
        };

        let expected_sample = observed.min(self.verify_sample_size);
        if observed < report.inserted || sample.len() != expected_sample {
            warn!(
                %kind,
                observed,
                inserted = report.inserted,
                sampled = sample.len(),
                "Verification mismatch"
            );
            log.log_for(
                kind,
                StepKind::VerificationMismatch,
                format!(
                    "{} holds {} row(s) after inserting {}, sample returned {} of {}",
                    kind.table_name(),
                    observed,
                    report.inserted,
                    sample.len(),
                    expected_sample
                ),
            );
            return;
        }

        report.verified = true;
        let titles: Vec<&str> = sample.iter().map(|item| item.title.as_str()).collect();
        log.log_for(
            kind,
            StepKind::Verification,
            format!(
                "{} holds {} row(s); sample: {}",
                kind.table_name(),
                observed,
                if titles.is_empty() {
                    "(empty)".to_string()
                } else {
                    titles.join(", ")
                }
            ),
        );
    }
}

/// Describes the dependency rows touched while seeding, if any.
fn dependency_note(report: &ProvisionReport) -> Option<String> {
    let deps = report.kind.dependencies();
    if deps.is_empty() || report.dependency_inserted + report.dependency_existing == 0 {
        return None;
    }
    let tables: Vec<&str> = deps.iter().map(|k| k.table_name()).collect();
    let tables = tables.join(", ");
    Some(match (report.dependency_inserted, report.dependency_existing) {
        (inserted, 0) => format!("{} {} row(s) added", inserted, tables),
        (0, existing) => format!("{} {} row(s) already stored", existing, tables),
        (inserted, existing) => format!(
            "{} {} row(s) added, {} already stored",
            inserted, tables, existing
        ),
    })
}

fn history_entry(track: &Track, index: usize, now: DateTime<Utc>) -> PlayHistoryEntry {
    PlayHistoryEntry {
        id: format!("play-{}", track.id),
        track_id: track.id.clone(),
        played_at: now - Duration::hours(index as i64),
    }
}

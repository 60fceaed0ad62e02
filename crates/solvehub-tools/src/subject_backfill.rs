//! Subject backfill: legacy free-text subject names → canonical subjects.
//!
//! Exercises created before the Subject entity existed carry only a
//! `subject_name` string. This tool looks each name up (creating the
//! subject if absent, with a derived slug) and points the exercise at it.
//! An in-memory name→subject cache avoids redundant lookups for repeated
//! names within one run.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};
use uuid::Uuid;

use solvehub_core::{ExerciseRepository, Result, Subject, SubjectRepository};
use solvehub_db::Database;

/// Per-run counters, printed as the summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackfillStats {
    /// Exercises examined.
    pub scanned: usize,
    /// Exercises successfully pointed at a subject.
    pub migrated: usize,
    /// Exercises left untouched after an error.
    pub failed: usize,
    /// Distinct subject names resolved this run.
    pub distinct_subjects: usize,
}

async fn resolve<'a>(
    db: &Database,
    cache: &'a mut HashMap<String, Subject>,
    name: &str,
) -> Result<&'a Subject> {
    if !cache.contains_key(name) {
        let subject = db.subjects.find_or_create(name).await?;
        cache.insert(name.to_string(), subject);
    }
    Ok(&cache[name])
}

/// Run the backfill to completion.
///
/// Returns `Err` only on connection-level failures while listing a batch;
/// per-record errors are logged, counted, and skipped.
pub async fn run(db: &Database, batch_size: i64) -> Result<BackfillStats> {
    let mut stats = BackfillStats::default();
    let mut cache: HashMap<String, Subject> = HashMap::new();
    // Failed records stay in the unmigrated set; remembering them keeps the
    // loop from spinning on a record that will never resolve.
    let mut failed_ids: HashSet<Uuid> = HashSet::new();

    loop {
        let batch = db.exercises.list_unmigrated_subjects(batch_size).await?;
        let pending: Vec<_> = batch
            .into_iter()
            .filter(|(id, _)| !failed_ids.contains(id))
            .collect();
        if pending.is_empty() {
            break;
        }

        for (exercise_id, raw_name) in pending {
            stats.scanned += 1;
            let name = raw_name.trim();

            let subject_id = match resolve(db, &mut cache, name).await {
                Ok(subject) => subject.id,
                Err(e) => {
                    warn!(
                        subsystem = "tools",
                        component = "subject_backfill",
                        exercise_id = %exercise_id,
                        subject_name = name,
                        error = %e,
                        "Failed to resolve subject"
                    );
                    failed_ids.insert(exercise_id);
                    stats.failed += 1;
                    continue;
                }
            };

            match db.exercises.set_subject(exercise_id, subject_id).await {
                Ok(()) => stats.migrated += 1,
                Err(e) => {
                    warn!(
                        subsystem = "tools",
                        component = "subject_backfill",
                        exercise_id = %exercise_id,
                        error = %e,
                        "Failed to set subject on exercise"
                    );
                    failed_ids.insert(exercise_id);
                    stats.failed += 1;
                }
            }
        }
    }

    stats.distinct_subjects = cache.len();
    info!(
        subsystem = "tools",
        component = "subject_backfill",
        scanned = stats.scanned,
        migrated = stats.migrated,
        failed = stats.failed,
        distinct_subjects = stats.distinct_subjects,
        "Subject backfill finished"
    );
    Ok(stats)
}

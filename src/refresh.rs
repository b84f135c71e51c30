use crate::{
    client::DataSource, core::problem::Platform, error::BotResult, storage::MemoryCache,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Users,
    Problems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New snapshot in place: (version, number of records).
    Updated(u64, usize),
    /// A refresh of the same dataset was still running.
    Skipped,
}

/// Ensures at most one refresh of a dataset runs at a time.
#[derive(Debug, Default)]
pub struct RefreshTask {
    running: AtomicBool,
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshTask {
    pub fn new() -> Self {
        RefreshTask::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_start(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard(&self.running))
    }
}

/// Fetch the dataset and swap it in. On error the cached snapshot is untouched.
pub async fn refresh(
    dataset: Dataset,
    source: &dyn DataSource,
    cache: &MemoryCache,
    task: &RefreshTask,
) -> BotResult<RefreshOutcome> {
    let Some(_guard) = task.try_start() else {
        warn!("Refresh of {dataset:?} still running, skipping this one.");
        return Ok(RefreshOutcome::Skipped);
    };

    let outcome = match dataset {
        Dataset::Users => {
            let users = source.users().await?;
            let size = users.len();
            RefreshOutcome::Updated(cache.users.swap(users), size)
        }
        Dataset::Problems => {
            let problems = source.problems().await?;
            debug!(
                "Fetched {} codeforces and {} kattis problems.",
                problems.count_for(Platform::Codeforces),
                problems.count_for(Platform::Kattis)
            );
            let size = problems.len();
            RefreshOutcome::Updated(cache.problems.swap(problems), size)
        }
    };

    if let RefreshOutcome::Updated(version, size) = outcome {
        info!("{dataset:?} refreshed: {size} records (snapshot #{version}).");
    }
    Ok(outcome)
}

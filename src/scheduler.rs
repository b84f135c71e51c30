use tokio_cron_scheduler::{Job, JobScheduler};

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::client::DataSource;
use crate::error::BotResult;
use crate::refresh::{refresh, Dataset, RefreshTask};
use crate::storage::MemoryCache;

pub struct Scheduler {
    scheduler: JobScheduler,
    cache: MemoryCache,
    source: Arc<dyn DataSource>,
    users_task: Arc<RefreshTask>,
    problems_task: Arc<RefreshTask>,
}

pub enum JobProcess {
    RefreshUsers(Duration),
    RefreshProblems(Duration),
}

impl Scheduler {
    pub async fn new(cache: MemoryCache, source: Arc<dyn DataSource>) -> BotResult<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler {
            scheduler,
            cache,
            source,
            users_task: Arc::new(RefreshTask::new()),
            problems_task: Arc::new(RefreshTask::new()),
        })
    }

    /// Boot-time refresh of both datasets, run before any command is served.
    /// Failures leave the cache empty; the scheduled jobs will retry.
    pub async fn initialize(&self) {
        let (users, problems) = futures::join!(
            refresh(
                Dataset::Users,
                self.source.as_ref(),
                &self.cache,
                &self.users_task
            ),
            refresh(
                Dataset::Problems,
                self.source.as_ref(),
                &self.cache,
                &self.problems_task
            ),
        );
        for (dataset, result) in [(Dataset::Users, users), (Dataset::Problems, problems)] {
            if let Err(e) = result {
                error!("Initial refresh of {dataset:?} failed, serving from an empty cache. {e}");
            }
        }
        if self.cache.is_empty() {
            warn!("Starting in degraded mode until the next successful refresh.");
        }
    }

    pub async fn add_job(&self, job_process: JobProcess) -> BotResult<uuid::Uuid> {
        let job = match job_process {
            JobProcess::RefreshUsers(every) => refresh_job(
                Dataset::Users,
                every,
                self.cache.clone(),
                self.source.clone(),
                self.users_task.clone(),
            )?,
            JobProcess::RefreshProblems(every) => refresh_job(
                Dataset::Problems,
                every,
                self.cache.clone(),
                self.source.clone(),
                self.problems_task.clone(),
            )?,
        };
        Ok(self.scheduler.add(job).await?)
    }

    pub async fn start(&self) -> BotResult<()> {
        Ok(self.scheduler.start().await?)
    }
}

//////////////////
// Jobs definition
//////////////////

fn refresh_job(
    dataset: Dataset,
    every: Duration,
    cache: MemoryCache,
    source: Arc<dyn DataSource>,
    task: Arc<RefreshTask>,
) -> BotResult<Job> {
    let job = Job::new_repeated_async(every, move |uuid, mut l| {
        let cache = cache.clone();
        let source = source.clone();
        let task = task.clone();
        Box::pin(async move {
            if let Err(e) = refresh(dataset, source.as_ref(), &cache, &task).await {
                error!("Could not refresh {dataset:?}, keeping previous snapshot. {e}");
            }

            // Query the next execution time for this job
            let next_tick = l.next_tick_for_job(uuid).await;
            match next_tick {
                Ok(Some(ts)) => debug!("Next refresh of {dataset:?} at {:?}", ts),
                _ => error!("Could not get next tick for {dataset:?} refresh job"),
            }
        })
    })?;
    Ok(job)
}

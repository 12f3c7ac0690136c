use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Context as _, Error, Result};
use log::{error, info, warn};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

pub mod unban;

/// Periodic job. Each tick works on its own clone of the task.
#[async_trait]
pub trait Task: Clone + Send + Sync + 'static {
    const NAME: &'static str;

    /// Schedule in english form ("every 5 minutes") or as a cron line.
    fn cron(&self) -> &str;

    async fn process(&mut self) -> Result<(), Error>;
}

pub struct BgProcess {
    scheduler: JobScheduler,
    running: Vec<(&'static str, Arc<Mutex<()>>)>,
}

impl BgProcess {
    pub async fn new() -> Result<BgProcess> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create scheduler")?;
        Ok(BgProcess {
            scheduler,
            running: vec![],
        })
    }

    pub async fn add<T: Task>(&mut self, task: T) -> Result<()> {
        let cron = task.cron().to_owned();
        let running = Arc::new(Mutex::new(()));

        let job_running = running.clone();
        let job = Job::new_async(cron.as_str(), move |_, _| {
            let task = task.clone();
            let running = job_running.clone();
            Box::pin(async move {
                run(running, task).await;
            })
        })
        .with_context(|| format!("Invalid schedule for {}: {}", T::NAME, cron))?;

        self.scheduler.add(job).await?;
        self.running.push((T::NAME, running));
        info!("Task {} scheduled: {}", T::NAME, cron);
        Ok(())
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        Ok(())
    }

    /// Stops the scheduler and waits for the ticks in flight.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        for (name, running) in &self.running {
            let _done = running.lock().await;
            info!("Task {} stopped", name);
        }
        Ok(())
    }
}

/// Runs one tick unless the previous one is still going. Returns whether the
/// task ran.
pub async fn run<T: Task>(running: Arc<Mutex<()>>, mut task: T) -> bool {
    let Ok(_running) = running.try_lock_owned() else {
        warn!("Task {} is still running. Skipping tick", T::NAME);
        return false;
    };

    log::debug!("Running task {}", T::NAME);
    if let Err(err) = task.process().await {
        error!("Failed to process {}: {:#}", T::NAME, err);
    }
    true
}

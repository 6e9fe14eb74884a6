use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::services::{AuthService, RateLimitService};

/// Top of every hour.
const HOURLY: &str = "0 0 * * * *";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HousekeepingReport {
    pub purged_tokens: u64,
    pub tracked_clients: usize,
}

#[derive(Clone)]
pub struct Housekeeping {
    auth: Arc<dyn AuthService>,
    rate_limits: RateLimitService,
}

impl Housekeeping {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthService>, rate_limits: RateLimitService) -> Self {
        Self { auth, rate_limits }
    }

    /// Purges spent login tokens and shrinks limiter state.
    pub async fn run_once(&self) -> HousekeepingReport {
        let start = std::time::Instant::now();
        info!(event = "job_started", job_name = "housekeeping");

        let purged = match self.auth.purge_expired().await {
            Ok(n) => n,
            Err(e) => {
                error!(event = "job_failed", job_name = "housekeeping", error = %e, "Failed to purge login tokens");
                0
            }
        };
        let tracked_clients = self.rate_limits.shrink();

        info!(
            event = "job_finished",
            job_name = "housekeeping",
            purged_tokens = purged,
            tracked_clients,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Housekeeping finished"
        );

        HousekeepingReport {
            purged_tokens: purged,
            tracked_clients,
        }
    }

    pub async fn start(self) -> Result<JobScheduler> {
        let sched = JobScheduler::new().await?;

        let job = Job::new_async(HOURLY, move |_uuid, _lock| {
            let this = self.clone();
            Box::pin(async move {
                this.run_once().await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;
        info!("Housekeeping scheduled: {HOURLY}");
        Ok(sched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mailer::LogMailer;
    use crate::config::Config;
    use crate::db::Store;
    use crate::services::{Bucket, SeaOrmAuthService};
    use tokio::sync::RwLock;

    fn auth(store: &Store, ttl_minutes: i64) -> Arc<dyn AuthService> {
        let mut config = Config::default();
        config.auth.link_ttl_minutes = ttl_minutes;
        Arc::new(SeaOrmAuthService::new(
            store.clone(),
            Arc::new(LogMailer::new()),
            Arc::new(RwLock::new(config)),
        ))
    }

    #[tokio::test]
    async fn test_run_once_purges_spent_tokens() {
        let store = Store::in_memory().await.unwrap();
        let live = auth(&store, 15);
        let stale = auth(&store, -1);
        live.bootstrap_admins(&["owner@example.com".to_string()])
            .await
            .unwrap();

        let used = live
            .create_login_link("owner@example.com")
            .await
            .unwrap()
            .unwrap();
        let token = used.split("token=").nth(1).unwrap();
        live.consume_link(token).await.unwrap();

        stale
            .create_login_link("owner@example.com")
            .await
            .unwrap()
            .unwrap();
        let pending = live
            .create_login_link("owner@example.com")
            .await
            .unwrap()
            .unwrap();

        let mut config = Config::default();
        config.rate_limit.login.max_requests = 2;
        config.rate_limit.login.window_seconds = 3600;
        let rate_limits = RateLimitService::new(&config.rate_limit);
        assert!(rate_limits.check(Bucket::Login, "10.0.0.1"));

        let housekeeping = Housekeeping::new(live.clone(), rate_limits);
        let report = housekeeping.run_once().await;
        assert_eq!(
            report,
            HousekeepingReport {
                purged_tokens: 2,
                tracked_clients: 1,
            }
        );

        let token = pending.split("token=").nth(1).unwrap();
        assert!(live.consume_link(token).await.is_ok());
        assert_eq!(housekeeping.run_once().await.purged_tokens, 1);
    }
}

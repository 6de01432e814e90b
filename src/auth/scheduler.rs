use super::TokenManager;
use crate::config::MAX_REFRESH_WINDOW_SECS;
use crate::models::ProviderId;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Outcome of one proactive sweep, by credential id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.refreshed.len() + self.failed.len()
    }
}

/// Periodically refreshes one provider's credentials before they expire.
pub struct ProactiveRefreshScheduler {
    provider: ProviderId,
    manager: Arc<TokenManager>,
    threshold: Duration,
    interval: std::time::Duration,
}

impl ProactiveRefreshScheduler {
    pub fn new(
        provider: ProviderId,
        manager: Arc<TokenManager>,
        threshold_secs: u64,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            provider,
            manager,
            threshold: Duration::seconds(threshold_secs.min(MAX_REFRESH_WINDOW_SECS) as i64),
            interval,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Refresh every refreshable credential expiring within the threshold.
    ///
    /// Never fails: a store error ends the sweep early with an empty report and
    /// each credential failure is logged and counted without stopping the rest.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let before = Utc::now() + self.threshold;

        let expiring = match self.manager.store().list_expiring(self.provider, before).await {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(provider = %self.provider, "Could not list expiring credentials: {}", e);
                return report;
            }
        };

        for credential in expiring {
            if !credential.can_refresh() {
                continue;
            }
            match self.manager.refresh(&credential).await {
                Ok(_) => report.refreshed.push(credential.id),
                Err(e) => {
                    tracing::warn!(
                        provider = %self.provider,
                        credential_id = %credential.id,
                        "Proactive refresh failed: {}",
                        e
                    );
                    report.failed.push(credential.id);
                }
            }
        }

        if report.total() > 0 {
            tracing::info!(
                provider = %self.provider,
                refreshed = report.refreshed.len(),
                failed = report.failed.len(),
                "Token sweep finished"
            );
        }
        report
    }

    /// Run [`sweep`](Self::sweep) on a fixed interval until the task is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}

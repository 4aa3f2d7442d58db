//! MetricsPoller: fetch, cache, fall back, and feed the dashboard.
//!
//! One instance owns all polling state (cache, retry count, timer, VM panel), so
//! several dashboards can run side by side and tests can drive one with a
//! scripted [`MetricsSource`].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use futures::future::join_all;

use crate::api::MetricsSource;
use crate::cache::SnapshotCache;
use crate::config::Settings;
use crate::dashboard::Dashboard;
use crate::error::FetchError;
use crate::schedule::{linear_backoff, RefreshTimer};
use crate::types::{MetricsSnapshot, PredictionSet};
use crate::vms::VmPanel;

const SNAPSHOT_KEY: &str = "server_metrics";

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// New snapshot rendered.
    Fresh,
    /// Fetch failed; last valid data (if any) is on screen and a retry is queued.
    Fallback { retry_in: Duration },
    /// Retry ceiling reached; every server shows the connection error.
    Errored,
    /// Request was abandoned; nothing changed.
    Aborted,
}

pub struct MetricsPoller<S> {
    source: S,
    settings: Settings,
    cache: SnapshotCache,
    last_valid: Option<MetricsSnapshot>,
    predictions: BTreeMap<usize, PredictionSet>,
    retry_count: u32,
    timer: RefreshTimer,
    last_vm_poll: Instant,
    last_refresh: Option<DateTime<Local>>,
    last_error: Option<String>,
    pub dashboard: Dashboard,
    pub vms: VmPanel,
}

impl<S: MetricsSource> MetricsPoller<S> {
    pub fn new(source: S, settings: Settings, cache: SnapshotCache, now: Instant) -> Self {
        Self {
            source,
            timer: RefreshTimer::new(settings.refresh_interval(), now),
            dashboard: Dashboard::with_slots(settings.server_slots),
            settings,
            cache,
            last_valid: None,
            predictions: BTreeMap::new(),
            retry_count: 0,
            last_vm_poll: now,
            last_refresh: None,
            last_error: None,
            vms: VmPanel::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn timer(&self) -> &RefreshTimer {
        &self.timer
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn last_valid(&self) -> Option<&MetricsSnapshot> {
        self.last_valid.as_ref()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Runs whatever is due at `now`: the metrics poll and the VM metrics refresh.
    pub async fn tick(&mut self, now: Instant) -> Option<PollOutcome> {
        if self.vms.any_expanded()
            && now.saturating_duration_since(self.last_vm_poll) >= self.settings.vm_refresh()
        {
            self.last_vm_poll = now;
            self.refresh_vm_metrics().await;
        }

        if !self.timer.is_due(now) {
            return None;
        }
        self.timer.mark_fired(now);
        let outcome = self.fetch_snapshot().await;
        if let PollOutcome::Fallback { retry_in } = outcome {
            self.timer.schedule_retry(retry_in, now);
        }
        Some(outcome)
    }

    /// One poll cycle. Never fails: errors degrade to cached data or the error state.
    pub async fn fetch_snapshot(&mut self) -> PollOutcome {
        if self.timer.visible() {
            if let Some(warm) = self
                .cache
                .get::<MetricsSnapshot>(SNAPSHOT_KEY, self.settings.warm_cache())
            {
                self.dashboard.render(&warm, &self.predictions);
            }
        }

        let result = match self.source.metrics().await {
            Ok(snap) if snap.is_usable() => Ok(snap),
            Ok(_) => Err(FetchError::Rejected),
            Err(e) => Err(e),
        };

        match result {
            Ok(snap) => {
                self.cache.set(SNAPSHOT_KEY, &snap);
                self.retry_count = 0;
                self.last_error = None;
                if self.settings.predictions {
                    self.load_predictions(snap.servers().len()).await;
                }
                self.dashboard.record_network(&snap);
                self.dashboard.render(&snap, &self.predictions);
                self.last_valid = Some(snap);
                self.last_refresh = Some(Local::now());
                tracing::debug!("metrics refreshed");
                PollOutcome::Fresh
            }
            Err(e) => self.handle_load_error(e),
        }
    }

    fn handle_load_error(&mut self, e: FetchError) -> PollOutcome {
        if e.is_abort() {
            tracing::debug!("metrics request aborted");
            return PollOutcome::Aborted;
        }
        self.retry_count += 1;
        tracing::warn!(error = %e, retry = self.retry_count, "metrics fetch failed");
        self.last_error = Some(e.to_string());

        let fallback = self.last_valid.clone().or_else(|| {
            self.cache
                .get::<MetricsSnapshot>(SNAPSHOT_KEY, self.settings.cache_expiry())
        });
        if let Some(snap) = fallback {
            self.dashboard.render(&snap, &self.predictions);
        }

        if self.retry_count < self.settings.max_retries {
            PollOutcome::Fallback {
                retry_in: linear_backoff(self.settings.retry_base(), self.retry_count),
            }
        } else {
            tracing::error!(retries = self.retry_count, "retry ceiling reached");
            self.dashboard.mark_all_errored();
            PollOutcome::Errored
        }
    }

    /// Fetch predictions for servers 1..=n concurrently; a failed one clears that slot.
    async fn load_predictions(&mut self, n: usize) {
        let source = &self.source;
        let results = join_all((1..=n).map(|server| async move {
            (server, source.predictions(server).await)
        }))
        .await;
        for (server, res) in results {
            match res {
                Ok(p) => {
                    self.predictions.insert(server, p);
                }
                Err(e) => {
                    tracing::debug!(server, error = %e, "no prediction");
                    self.predictions.remove(&server);
                }
            }
        }
        self.predictions.retain(|&k, _| k <= n);
    }

    /// Expand or collapse a server's VM panel; expanding refetches the list.
    pub async fn toggle_vms(&mut self, server: usize) {
        if self.vms.is_expanded(server) {
            self.vms.collapse(server);
            return;
        }
        self.vms.expand(server);
        self.load_vms(server).await;
    }

    pub async fn load_vms(&mut self, server: usize) {
        match self.source.server_vms(server).await {
            Ok(resp) => {
                let running = self.vms.apply_list(server, resp);
                self.dashboard.set_vms_active(server, running);
            }
            Err(e) => tracing::warn!(server, error = %e, "VM list fetch failed"),
        }
    }

    pub async fn refresh_vm_metrics(&mut self) {
        match self.source.vm_metrics().await {
            Ok(resp) => {
                let touched = self.vms.apply_metrics(&resp.vms);
                tracing::trace!(touched, "VM metrics applied");
            }
            Err(e) => tracing::warn!(error = %e, "VM metrics refresh failed"),
        }
    }

    /// Terminal focus changed. Regaining it refreshes immediately.
    pub async fn set_visible(&mut self, visible: bool, now: Instant) -> Option<PollOutcome> {
        if self.timer.set_visible(visible, now) {
            tracing::debug!("visible again, refreshing");
            return self.tick(now).await;
        }
        None
    }

    pub fn toggle_auto_refresh(&mut self, now: Instant) -> bool {
        let on = self.timer.toggle_auto_refresh(now);
        tracing::info!(auto_refresh = on, "auto-refresh toggled");
        on
    }

    pub fn refresh_now(&mut self, now: Instant) {
        self.timer.trigger(now);
    }
}

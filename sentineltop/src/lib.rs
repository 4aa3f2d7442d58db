//! sentineltop: terminal dashboard for a server/VM monitoring API.
//!
//! The [`poller::MetricsPoller`] polls `/api/metrics/` and per-server
//! predictions, keeps the last good snapshot, and renders it into a
//! [`dashboard::Dashboard`] that the `ui` module draws with ratatui.

pub mod api;
pub mod app;
pub mod cache;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gauge;
pub mod history;
pub mod logging;
pub mod poller;
pub mod profiles;
pub mod schedule;
pub mod types;
pub mod ui;
pub mod vms;

pub use api::{ApiClient, MetricsSource};
pub use error::{FetchError, FetchResult};
pub use poller::{MetricsPoller, PollOutcome};

//! Top header: API base, last refresh time and auto-refresh state.

use std::time::Instant;

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
};

use crate::schedule::RefreshTimer;

pub struct HeaderInfo<'a> {
    pub base: &'a str,
    pub last_refresh: Option<DateTime<Local>>,
    pub timer: &'a RefreshTimer,
    pub retry_count: u32,
    pub last_error: Option<&'a str>,
}

pub fn header_title(h: &HeaderInfo<'_>, now: Instant) -> String {
    let updated = h
        .last_refresh
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());
    let auto = if h.timer.retry_pending() {
        let secs = h.timer.until_next(now).map_or(0, |d| d.as_secs());
        format!("retry in {secs}s")
    } else if !h.timer.auto_refresh() {
        "auto: off".to_string()
    } else if !h.timer.visible() {
        "auto: paused".to_string()
    } else {
        match h.timer.until_next(now) {
            Some(d) => format!("auto: next in {}s", d.as_secs()),
            None => "auto: on".to_string(),
        }
    };
    let mut title = format!("sentineltop — {} | updated: {updated} | {auto}", h.base);
    if let Some(err) = h.last_error {
        title.push_str(&format!(" | retry {}: {err}", h.retry_count));
    }
    title.push_str("  (q quit, r refresh, a auto, v VMs)");
    title
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, h: &HeaderInfo<'_>) {
    let title = header_title(h, Instant::now());
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}

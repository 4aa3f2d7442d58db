//! App state and main loop: input handling, polling, and drawing.

use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    Terminal,
};
use tokio::time::sleep;

use crate::api::{ApiClient, MetricsSource};
use crate::poller::MetricsPoller;
use crate::ui::{
    chart::draw_usage_chart,
    header::{draw_header, HeaderInfo},
    net::draw_net_spark,
    server::{draw_server_card, CARD_HEIGHT},
    theme::{HISTORY_CPU, HISTORY_MEM, PREDICTION_CPU, PREDICTION_MEM},
    vms::{clamp_offset, draw_vms, vms_handle_key},
};

/// What a key press asks for; async work happens outside the input match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    ToggleAutoRefresh,
    ToggleVms,
    Select(usize),
    SelectNext,
    SelectPrev,
    ScrollVms(KeyEvent),
}

pub fn action_for_key(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('a') => Some(Action::ToggleAutoRefresh),
        KeyCode::Char('v') | KeyCode::Enter => Some(Action::ToggleVms),
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| Action::Select(d as usize)),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => Some(Action::SelectNext),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => Some(Action::SelectPrev),
        KeyCode::PageUp | KeyCode::PageDown | KeyCode::Home | KeyCode::End => {
            Some(Action::ScrollVms(k))
        }
        _ => None,
    }
}

pub struct App<S> {
    poller: MetricsPoller<S>,
    base: String,

    // Quit flag
    should_quit: bool,

    /// 1-based server number the detail pane shows.
    pub selected: usize,
    pub vms_scroll_offset: usize,
    last_vms_area: Option<Rect>,

    tick_rate: Duration,
}

impl App<ApiClient> {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(
            backend,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        res
    }
}

impl<S: MetricsSource> App<S> {
    pub fn new(poller: MetricsPoller<S>, base: impl Into<String>) -> Self {
        Self {
            poller,
            base: base.into(),
            should_quit: false,
            selected: 1,
            vms_scroll_offset: 0,
            last_vms_area: None,
            tick_rate: Duration::from_millis(250),
        }
    }

    pub fn poller(&self) -> &MetricsPoller<S> {
        &self.poller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    Event::Key(k) => {
                        if let Some(action) = action_for_key(k) {
                            self.apply(action).await;
                        }
                    }
                    Event::Mouse(m) => match m.kind {
                        MouseEventKind::ScrollDown => {
                            self.vms_scroll_offset = self.vms_scroll_offset.saturating_add(1);
                            self.clamp_vms_scroll();
                        }
                        MouseEventKind::ScrollUp => {
                            self.vms_scroll_offset = self.vms_scroll_offset.saturating_sub(1);
                        }
                        _ => {}
                    },
                    Event::FocusLost => {
                        self.poller.set_visible(false, Instant::now()).await;
                    }
                    Event::FocusGained => {
                        self.poller.set_visible(true, Instant::now()).await;
                    }
                    _ => {}
                }
            }
            if self.should_quit {
                break;
            }

            // Fetch when due
            self.poller.tick(Instant::now()).await;

            // Draw
            terminal.draw(|f| self.draw(f))?;

            // Tick rate
            sleep(self.tick_rate).await;
        }

        Ok(())
    }

    pub async fn apply(&mut self, action: Action) {
        let now = Instant::now();
        match action {
            Action::Quit => self.should_quit = true,
            Action::Refresh => self.poller.refresh_now(now),
            Action::ToggleAutoRefresh => {
                self.poller.toggle_auto_refresh(now);
            }
            Action::ToggleVms => {
                self.vms_scroll_offset = 0;
                self.poller.toggle_vms(self.selected).await;
            }
            Action::Select(n) => {
                if n <= self.server_count() {
                    self.select(n);
                }
            }
            Action::SelectNext => {
                let n = self.server_count();
                if n > 0 {
                    self.select(self.selected % n + 1);
                }
            }
            Action::SelectPrev => {
                let n = self.server_count();
                if n > 0 {
                    self.select((self.selected + n - 2) % n + 1);
                }
            }
            Action::ScrollVms(k) => {
                let page = self
                    .last_vms_area
                    .map(|a| a.height.saturating_sub(3).max(1) as usize) // borders (2) + header (1)
                    .unwrap_or(10);
                vms_handle_key(&mut self.vms_scroll_offset, k, page);
                self.clamp_vms_scroll();
            }
        }
    }

    fn select(&mut self, n: usize) {
        if n != self.selected {
            self.selected = n;
            self.vms_scroll_offset = 0;
        }
    }

    fn server_count(&self) -> usize {
        self.poller.dashboard.cards().len()
    }

    fn clamp_vms_scroll(&mut self) {
        let total = self
            .poller
            .vms
            .shown(self.selected)
            .map(|v| v.len())
            .unwrap_or(0);
        let viewport = self
            .last_vms_area
            .map(|a| a.height.saturating_sub(3) as usize)
            .unwrap_or(0);
        self.vms_scroll_offset = clamp_offset(self.vms_scroll_offset, total, viewport);
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        // Root rows: header, body
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(CARD_HEIGHT)])
            .split(area);

        let header = HeaderInfo {
            base: &self.base,
            last_refresh: self.poller.last_refresh(),
            timer: self.poller.timer(),
            retry_count: self.poller.retry_count(),
            last_error: self.poller.last_error(),
        };
        draw_header(f, rows[0], &header);

        // Body: server cards (left), selected server detail (right)
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        let cards = self.poller.dashboard.cards();
        let fit = (body[0].height / CARD_HEIGHT).max(1) as usize;
        // keep the selected card on screen
        let first = self.selected.saturating_sub(fit).min(cards.len().saturating_sub(fit));
        let shown: Vec<_> = cards.iter().skip(first).take(fit).collect();
        let card_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                shown
                    .iter()
                    .map(|_| Constraint::Length(CARD_HEIGHT))
                    .collect::<Vec<_>>(),
            )
            .split(body[0]);
        for (slot, card) in card_rows.iter().zip(shown) {
            draw_server_card(f, *slot, card, card.number == self.selected);
        }

        let Some(card) = self.poller.dashboard.card(self.selected) else {
            return;
        };
        let expanded = self.poller.vms.is_expanded(self.selected);
        let mut constraints = vec![
            Constraint::Ratio(1, 3), // CPU
            Constraint::Ratio(1, 3), // RAM
            Constraint::Length(5),   // Net
        ];
        if expanded {
            constraints.push(Constraint::Min(5));
        }
        let detail = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(body[1]);

        draw_usage_chart(
            f,
            detail[0],
            &format!("CPU % — {}", card.name),
            &card.cpu_chart,
            (HISTORY_CPU, PREDICTION_CPU),
        );
        draw_usage_chart(
            f,
            detail[1],
            &format!("RAM % — {}", card.name),
            &card.mem_chart,
            (HISTORY_MEM, PREDICTION_MEM),
        );
        let now_mbps = card.net_hist.back().copied().unwrap_or(0);
        let peak = card.net_hist.iter().copied().max().unwrap_or(0);
        draw_net_spark(
            f,
            detail[2],
            &format!("Upload (Mbps) — now: {now_mbps} | peak: {peak}"),
            &card.net_hist,
            Color::Blue,
        );

        if expanded {
            let vms_area = detail[3];
            // Cache for input handlers
            self.last_vms_area = Some(vms_area);
            draw_vms(
                f,
                vms_area,
                self.selected,
                self.poller.vms.shown(self.selected),
                self.vms_scroll_offset,
            );
        } else {
            self.last_vms_area = None;
        }
    }
}

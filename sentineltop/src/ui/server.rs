//! Server cards: status line, CPU/RAM/Disk/Net gauges and an info line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::dashboard::ServerCard;
use crate::gauge::GaugeReading;
use crate::ui::theme::{severity_color, status_color};
use crate::ui::util::{inner, truncate_middle};

/// Rows a card needs: border (2) + four gauges + info line.
pub const CARD_HEIGHT: u16 = 7;

pub fn draw_server_card(f: &mut ratatui::Frame<'_>, area: Rect, card: &ServerCard, selected: bool) {
    let name = truncate_middle(&card.name, (area.width.saturating_sub(24)) as usize);
    let title = Line::from(vec![
        Span::raw(format!(" {}. {name} ", card.number)),
        Span::styled(
            format!("● {} ", card.status.label()),
            Style::default()
                .fg(status_color(card.status))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let border = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
        area,
    );

    let body = inner(area);
    if body.height == 0 || body.width < 8 {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(body);

    draw_gauge_row(f, rows[0], "CPU ", card.cpu.as_ref());
    draw_gauge_row(f, rows[1], "RAM ", card.memory.as_ref());
    draw_gauge_row(f, rows[2], "Disk", card.disk.as_ref());
    draw_gauge_row(f, rows[3], "Net ", card.network.as_ref());

    let info = format!(
        "cores {} | RAM {} | storage {} | VMs {} | up {}",
        card.cores, card.ram_total, card.storage, card.vms_active, card.uptime
    );
    f.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Gray)),
        rows[4],
    );
}

fn draw_gauge_row(f: &mut ratatui::Frame<'_>, area: Rect, name: &str, reading: Option<&GaugeReading>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);
    f.render_widget(Paragraph::new(name.to_string()), cols[0]);

    let g = match reading {
        Some(r) => Gauge::default()
            .gauge_style(Style::default().fg(severity_color(r.severity)))
            .ratio(r.ratio())
            .label(r.label.clone()),
        None => Gauge::default()
            .gauge_style(Style::default().fg(Color::DarkGray))
            .ratio(0.0)
            .label("--"),
    };
    f.render_widget(g, cols[1]);
}

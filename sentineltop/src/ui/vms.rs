//! VM table for an expanded server, with per-cell coloring and a scrollbar.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::dashboard::PLACEHOLDER;
use crate::gauge::{clamp_percent, Severity};
use crate::types::VmSnapshot;
use crate::ui::theme::{severity_color, SB_ARROW, SB_THUMB, SB_TRACK};
use crate::ui::util::inner;

// Shared by drawing and paging so both agree on widths.
const COLS: [Constraint; 7] = [
    Constraint::Length(7),      // VMID
    Constraint::Percentage(30), // Name
    Constraint::Length(9),      // Status
    Constraint::Length(7),      // CPU %
    Constraint::Length(7),      // Mem %
    Constraint::Length(9),      // Disk GB
    Constraint::Length(15),     // Net in/out
];

pub fn draw_vms(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    server: usize,
    vms: Option<&[VmSnapshot]>,
    scroll_offset: usize,
) {
    let running = vms.map(|v| v.iter().filter(|vm| vm.is_running()).count());
    let title = match (vms, running) {
        (Some(v), Some(r)) => format!("VMs on server {server} ({r}/{} running)", v.len()),
        _ => format!("VMs on server {server} (loading...)"),
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), area);

    let body = inner(area);
    if body.height < 1 || body.width < 3 {
        return;
    }
    let Some(vms) = vms else { return };
    if vms.is_empty() {
        f.render_widget(Paragraph::new("No VMs"), body);
        return;
    }

    // reserve 2 columns for the scrollbar
    let content = Rect {
        width: body.width.saturating_sub(2),
        ..body
    };

    let total_rows = vms.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let offset = clamp_offset(scroll_offset, total_rows, viewport_rows);
    let show_n = total_rows.saturating_sub(offset).min(viewport_rows);

    let rows = vms.iter().skip(offset).take(show_n).map(|vm| {
        let status_fg = if vm.is_running() {
            Color::Green
        } else {
            Color::DarkGray
        };
        Row::new(vec![
            Cell::from(vm.vmid.to_string()).style(Style::default().fg(Color::DarkGray)),
            Cell::from(vm.name.clone()),
            Cell::from(vm.status.to_uppercase()).style(Style::default().fg(status_fg)),
            percent_cell(vm.cpu),
            percent_cell(vm.mem),
            Cell::from(fmt_num(vm.disk)),
            Cell::from(format!("{} / {}", fmt_num(vm.net_in), fmt_num(vm.net_out))),
        ])
    });

    let header = Row::new(vec!["VMID", "Name", "Status", "CPU %", "Mem %", "Disk GB", "Net in/out MB"])
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, content);

    let scroll_area = Rect {
        x: body.x + body.width.saturating_sub(1),
        y: body.y,
        width: 1,
        height: body.height,
    };
    draw_scrollbar(f, scroll_area, total_rows, viewport_rows, offset);
}

fn percent_cell(v: Option<f64>) -> Cell<'static> {
    match v {
        Some(raw) => {
            let pct = clamp_percent(raw);
            Cell::from(format!("{pct:>5.1}"))
                .style(Style::default().fg(severity_color(Severity::for_percent(pct))))
        }
        None => Cell::from(format!("{PLACEHOLDER:>5}")),
    }
}

fn fmt_num(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn draw_scrollbar(f: &mut ratatui::Frame<'_>, area: Rect, total_rows: usize, viewport_rows: usize, offset: usize) {
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total_rows.max(1);
    let view = viewport_rows.clamp(1, total);
    let max_off = total.saturating_sub(view);

    let thumb_len = (track * view).div_ceil(total).max(1).min(track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset + max_off / 2) / max_off
    };

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

pub fn clamp_offset(offset: usize, total_rows: usize, viewport_rows: usize) -> usize {
    offset.min(total_rows.saturating_sub(viewport_rows))
}

/// Handle keyboard scrolling (PageUp/PageDown/Home/End)
pub fn vms_handle_key(scroll_offset: &mut usize, key: KeyEvent, page_size: usize) {
    match key.code {
        KeyCode::PageDown => *scroll_offset = scroll_offset.saturating_add(page_size.max(1)),
        KeyCode::PageUp => *scroll_offset = scroll_offset.saturating_sub(page_size.max(1)),
        KeyCode::Home => *scroll_offset = 0,
        KeyCode::End => *scroll_offset = usize::MAX,
        _ => {}
    }
}

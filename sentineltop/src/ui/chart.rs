//! History + prediction line charts (0..100 %).

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::chart::MergedSeries;

pub fn draw_usage_chart(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &MergedSeries,
    colors: (Color, Color),
) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if series.is_empty() {
        f.render_widget(Paragraph::new("no history yet").block(block), area);
        return;
    }

    let history = MergedSeries::points(&series.history);
    let prediction = MergedSeries::points(&series.prediction);
    let has_prediction = series.prediction.iter().flatten().count() > 1;

    let mut datasets = vec![Dataset::default()
        .name("history")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(colors.0))
        .data(&history)];
    if has_prediction {
        datasets.push(
            Dataset::default()
                .name("prediction")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(colors.1))
                .data(&prediction),
        );
    }

    let last = series.len().saturating_sub(1);
    let x_labels: Vec<Span> = x_axis_labels(&series.labels)
        .into_iter()
        .map(Span::raw)
        .collect();
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0%"), Span::raw("50%"), Span::raw("100%")]),
        );
    f.render_widget(chart, area);
}

/// First, middle and last label; fewer when the axis is short.
pub fn x_axis_labels(labels: &[String]) -> Vec<String> {
    match labels.len() {
        0 => Vec::new(),
        1 => vec![labels[0].clone()],
        2 => labels.to_vec(),
        n => vec![
            labels[0].clone(),
            labels[n / 2].clone(),
            labels[n - 1].clone(),
        ],
    }
}

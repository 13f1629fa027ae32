//! Waveform chart widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Most points handed to the chart; longer buffers are decimated
const MAX_POINTS: usize = 2048;

/// Plot `samples` across the full width of `area`.
pub fn render_waveform(frame: &mut Frame, area: Rect, title: &str, samples: &[f32], color: Color) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL);

    let step = samples.len().div_ceil(MAX_POINTS).max(1);
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(i, &sample)| (i as f64 / samples.len() as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

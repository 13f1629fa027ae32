//! Status bar - transport state, selected layer, and output levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_kick::{KickPatch, OscillatorId};

use super::state::{AudioStats, EngineStatus};

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    patch: &KickPatch,
    status: &EngineStatus,
    sample_rate: f32,
    stats: &AudioStats,
) {
    let block = Block::default().title(" kick ").borders(Borders::ALL);

    let (symbol, label, color) = if status.playing {
        ("▶", "Playing", Color::Green)
    } else {
        ("■", "Idle", Color::Yellow)
    };
    let elapsed_ms = status.elapsed_samples as f64 * 1000.0 / sample_rate as f64;

    let selected = patch.selected_layer();
    let layer = patch.layer(selected);
    let tone = layer
        .oscillator(OscillatorId::Tone1)
        .base_frequency()
        .unwrap_or_default();

    let layers: String = patch
        .layers()
        .iter()
        .enumerate()
        .map(|(i, l)| if l.is_enabled() { char::from(b'1' + i as u8) } else { '-' })
        .collect();

    let line = Line::from(vec![
        Span::styled(format!(" {symbol} {label}  "), Style::default().fg(color)),
        Span::styled(format!("{elapsed_ms:>6.1} ms  "), Style::default().fg(Color::White)),
        Span::styled(
            format!("Layer {} [{layers}]  ", selected.index() + 1),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("len {:.0} ms  tone {tone:.1} Hz  ", layer.length() * 1000.0),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "filter {}  dist {}  ",
                if layer.filter().is_enabled() { "on" } else { "off" },
                if layer.distortion().is_enabled() { "on" } else { "off" }
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

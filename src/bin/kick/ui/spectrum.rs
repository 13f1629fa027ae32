//! Spectrum of the kick preview
//!
//! FFT over the start of the rendered kick, shown on log-spaced bins.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// FFT size; shorter kicks are zero-padded
pub const FFT_SIZE: usize = 4096;

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 64;

/// Lowest bin shown
const MIN_FREQ: f64 = 20.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// (frequency in Hz, FFT index) per displayed bin
    bins: Vec<(f64, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude in dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Hann window
        let denom = (FFT_SIZE - 1) as f32;
        let window = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate as f64 / 2.0).min(20_000.0);
        let ratio = max_freq / MIN_FREQ;
        let last_index = FFT_SIZE / 2 - 1;
        let bins = (0..SPECTRUM_BINS)
            .map(|i| {
                let freq = MIN_FREQ * ratio.powf(i as f64 / (SPECTRUM_BINS - 1) as f64);
                let index = (freq * FFT_SIZE as f64 / sample_rate as f64).round() as usize;
                (freq, index.min(last_index))
            })
            .collect::<Vec<_>>();

        let spectrum = bins.iter().map(|&(f, _)| (f.log10(), -120.0)).collect();

        Self {
            window,
            bins,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            spectrum,
        }
    }

    /// Analyze the first `FFT_SIZE` samples of `samples`.
    pub fn analyze(&mut self, samples: &[f32]) {
        for (i, bin) in self.scratch.iter_mut().enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0.0);
            *bin = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        for ((_, db), &(_, index)) in self.spectrum.iter_mut().zip(&self.bins) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *db = 10.0 * (power as f64).log10();
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Spectrum (20 Hz - 20 kHz) ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (min_x, max_x) = spectrum
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let max_db = spectrum.iter().map(|&(_, db)| db).fold(-100.0, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x.min(max_x), max_x])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-100.0, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

//! TUI for the kick designer
//!
//! Shows the rendered kick, the live output, and its spectrum. Keys edit the
//! selected layer through the controller; every accepted edit comes back as
//! a StateChanged event and triggers a fresh preview.

mod spectrum;
mod state;
mod transport;
mod waveform;

use std::{fs, path::PathBuf, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use saavy_kick::{
    synth::KickEvent, KickController, LayerId, OscillatorId, Result as KickResult, StateFormat,
};

pub use state::EngineStatus;

use spectrum::{render_spectrum, SpectrumAnalyzer};
use state::AudioStats;
use transport::render_transport;
use waveform::render_waveform;

/// Live scope length
const SCOPE_SIZE: usize = 2048;

/// One semitone
const SEMITONE: f32 = 1.059_463_1;

const LENGTH_STEP_SECS: f32 = 0.025;

pub struct UiApp {
    controller: KickController,
    events: Consumer<KickEvent>,
    scope_rx: Consumer<f32>,
    status_rx: Consumer<EngineStatus>,
    preset_path: Option<PathBuf>,
    status: EngineStatus,
    scope: Vec<f32>,
    preview: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    /// Last edit result shown in the help bar
    message: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        controller: KickController,
        events: Consumer<KickEvent>,
        scope_rx: Consumer<f32>,
        status_rx: Consumer<EngineStatus>,
        preset_path: Option<PathBuf>,
    ) -> Self {
        let mut analyzer = SpectrumAnalyzer::new(controller.sample_rate());
        let preview = controller.preview();
        analyzer.analyze(&preview);

        Self {
            controller,
            events,
            scope_rx,
            status_rx,
            preset_path,
            status: EngineStatus::default(),
            scope: vec![0.0; SCOPE_SIZE],
            preview,
            analyzer,
            message: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_events();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_audio(&mut self) {
        let mut received = 0;
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
            received += 1;
        }
        if received > 0 && self.scope.len() > SCOPE_SIZE {
            let excess = self.scope.len() - SCOPE_SIZE;
            self.scope.drain(0..excess);
        }

        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn poll_events(&mut self) {
        let mut changed = false;
        while let Ok(KickEvent::StateChanged) = self.events.pop() {
            changed = true;
        }
        if changed {
            self.preview = self.controller.preview();
            self.analyzer.analyze(&self.preview);
        }
        self.controller.collect_garbage();
    }

    fn handle_key(&mut self, key: KeyCode) {
        let layer = self.controller.patch().selected_layer();

        let result = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char(' ') => self.controller.note_on(1.0),
            KeyCode::Char(c @ '1'..='3') => match LayerId::from_index(c as usize - '1' as usize) {
                Some(id) => self.controller.select_layer(id),
                None => Ok(()),
            },
            KeyCode::Char('e') => {
                let enabled = self.controller.patch().layer(layer).is_enabled();
                self.controller.set_layer_enabled(layer, !enabled)
            }
            KeyCode::Char('f') => {
                let enabled = self.controller.patch().layer(layer).filter().is_enabled();
                self.controller.set_filter_enabled(layer, !enabled)
            }
            KeyCode::Char('d') => {
                let enabled = self.controller.patch().layer(layer).distortion().is_enabled();
                self.controller.set_distortion_enabled(layer, !enabled)
            }
            KeyCode::Char('n') => {
                let enabled = self
                    .controller
                    .patch()
                    .layer(layer)
                    .oscillator(OscillatorId::Noise)
                    .is_enabled();
                self.controller
                    .set_oscillator_enabled(layer, OscillatorId::Noise, !enabled)
            }
            KeyCode::Up | KeyCode::Down => self.step_pitch(layer, key == KeyCode::Up),
            KeyCode::Left | KeyCode::Right => {
                let length = self.controller.patch().layer(layer).length();
                let step = if key == KeyCode::Right { LENGTH_STEP_SECS } else { -LENGTH_STEP_SECS };
                self.controller.set_layer_length(layer, length + step)
            }
            KeyCode::Char('w') => self.save_preset(),
            _ => Ok(()),
        };

        match result {
            Err(err) => self.message = Some(err.to_string()),
            // Keep the "saved" notice on screen
            Ok(()) if key == KeyCode::Char('w') => {}
            Ok(()) => self.message = None,
        }
    }

    fn step_pitch(&mut self, layer: LayerId, up: bool) -> KickResult<()> {
        let osc = OscillatorId::Tone1;
        let Some(freq) = self.controller.patch().layer(layer).oscillator(osc).base_frequency() else {
            return Ok(());
        };
        let next = if up { freq * SEMITONE } else { freq / SEMITONE };
        self.controller.set_base_frequency(layer, osc, next)
    }

    fn save_preset(&mut self) -> KickResult<()> {
        let path = self
            .preset_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("kick.json"));
        let bytes = self.controller.serialize_state(StateFormat::Json)?;
        match fs::write(&path, bytes) {
            Ok(()) => self.message = Some(format!("saved {}", path.display())),
            Err(err) => self.message = Some(format!("save failed: {err}")),
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Kick preview
                Constraint::Length(8), // Live output
                Constraint::Length(8), // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.scope);
        render_transport(
            frame,
            chunks[0],
            self.controller.patch(),
            &self.status,
            self.controller.sample_rate(),
            &stats,
        );
        render_waveform(frame, chunks[1], "Kick", &self.preview, Color::Cyan);
        render_waveform(frame, chunks[2], "Output", &self.scope, Color::Blue);
        render_spectrum(frame, chunks[3], self.analyzer.data());

        let help = match &self.message {
            Some(message) => Paragraph::new(format!(" {message}")).style(Style::default().fg(Color::Yellow)),
            None => Paragraph::new(
                " [Space] Kick  [1-3] Layer  [E]nable  [F]ilter  [D]ist  [N]oise  [↑↓] Pitch  [←→] Length  [W]rite  [Q]uit",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[4]);
    }
}

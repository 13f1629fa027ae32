//! Audio device setup and the audio callback

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use saavy_kick::{create_instance_with_patch, EngineConfig, KickInstance, KickPatch};

use super::ui::{EngineStatus, UiApp};

/// Samples buffered for the oscilloscope
const SCOPE_RING_SIZE: usize = 16_384;

pub fn run(patch: KickPatch, preset_path: Option<PathBuf>) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let KickInstance {
        mut engine,
        controller,
        events,
    } = create_instance_with_patch(EngineConfig::default().with_sample_rate(sample_rate), patch)?;

    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_RING_SIZE);
    let (mut status_tx, status_rx) = RingBuffer::<EngineStatus>::new(64);

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            for frame in data.chunks_mut(channels) {
                let sample = engine.render_frame();
                // Mono to all channels
                frame.fill(sample);
                let _ = scope_tx.push(sample);
            }

            let _ = status_tx.push(EngineStatus {
                playing: engine.is_playing(),
                elapsed_samples: engine.elapsed_samples(),
            });
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;
    stream.play()?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(controller, events, scope_rx, status_rx, preset_path).run(&mut terminal);
    ratatui::restore();

    result
}

use std::sync::Arc;

use arc_swap::ArcSwap;
use rtrb::Consumer;

use crate::{
    dsp::distortion::hard_clip,
    patch::{layer::LayerState, KickPatch},
    synth::message::{KickMessage, MessageReceiver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Idle,
    Playing,
}

/// Audio-thread side of a kick instance.
///
/// Reads the current `KickPatch` snapshot once per frame and owns all the
/// state that changes while a kick plays: the transport, the elapsed sample
/// counter, oscillator phases, noise generators, and filter memories.
///
/// `render_frame` never allocates, never blocks, and never fails.
pub struct KickEngine<R: MessageReceiver = Consumer<KickMessage>> {
    patch: Arc<ArcSwap<KickPatch>>,
    rx: R,
    layers: [LayerState; 3],
    sample_rate: f32,
    transport: Transport,
    elapsed: u64,
    velocity: f32,
}

impl<R: MessageReceiver> KickEngine<R> {
    pub fn new(patch: Arc<ArcSwap<KickPatch>>, rx: R, sample_rate: f32) -> Self {
        Self {
            patch,
            rx,
            layers: std::array::from_fn(|_| LayerState::new(sample_rate)),
            sample_rate,
            transport: Transport::Idle,
            elapsed: 0,
            velocity: 1.0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }

    /// Samples rendered since the last note-on.
    pub fn elapsed_samples(&self) -> u64 {
        self.elapsed
    }

    /// Seconds rendered since the last note-on.
    pub fn elapsed(&self) -> f64 {
        self.elapsed as f64 / self.sample_rate as f64
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Start the kick from the top, restarting it if it is already playing.
    pub fn note_on(&mut self, velocity: f32) {
        self.velocity = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.elapsed = 0;
        self.transport = Transport::Playing;

        let patch = self.patch.load();
        for (state, layer) in self.layers.iter_mut().zip(patch.layers()) {
            state.reset(layer);
        }
    }

    /// Kicks are one-shot; they always play out their full length.
    pub fn note_off(&mut self) {}

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                KickMessage::NoteOn { velocity } => self.note_on(velocity),
                KickMessage::NoteOff => self.note_off(),
            }
        }
    }

    /// Produce the next mono sample.
    #[inline]
    pub fn render_frame(&mut self) -> f32 {
        self.drain_messages();

        if self.transport == Transport::Idle {
            return 0.0;
        }

        let patch = self.patch.load();

        let mut sum = 0.0;
        for (layer, state) in patch.layers().iter().zip(self.layers.iter_mut()) {
            sum += layer.render_sample(state, self.elapsed, self.sample_rate);
        }
        let out = hard_clip(sum * self.velocity, patch.master_gain(), 1.0);

        self.elapsed += 1;
        if self.elapsed >= patch.longest_length_samples(self.sample_rate) {
            self.transport = Transport::Idle;
        }

        out
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.render_frame();
        }
    }

    /// Render into two channel buffers. The kick is mono; both channels get
    /// the same sample.
    pub fn render_block_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sample = self.render_frame();
            *l = sample;
            *r = sample;
        }
    }
}

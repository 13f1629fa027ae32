mod distortion;
mod envelope;
mod filter;
mod oscillator;

pub use distortion::bench_distortion;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;

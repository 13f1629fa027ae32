mod render;

pub use render::bench_render;

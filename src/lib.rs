//! Geoid Globe - spherical-harmonic geoid synthesis and rotating-globe rendering

pub mod config;
pub mod error;
pub mod harmonics;
pub mod render;

#[cfg(feature = "python")]
mod bindings;

#[cfg(test)]
mod __test__;

pub use config::{GridSpec, RenderConfig, SynthesisConfig};
pub use error::{GeoidError, Result};
pub use harmonics::{
    fully_normalized_legendre, load_coefficients, synthesize_geoid, synthesize_on_grid,
    CoefficientTable, LegendreRow, ScalarGrid,
};
pub use render::{
    color_ramp, orthographic_inverse, render_frames, sample_texture_bilinear, save_map_png,
    texture_from_grid, Frame, FrameSequencer, FrameSink, Texture,
};

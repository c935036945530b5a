//! Texture mapping, orthographic projection and frame sequencing.

pub mod color;
pub mod map;
pub mod project;
pub mod sample;
pub mod sequence;
pub mod sink;

pub use self::color::{color_ramp, texture_from_grid, texture_from_values, Texture};
pub use self::map::save_map_png;
pub use self::project::{orthographic_inverse, orthographic_inverse_point, view_plane, ProjectedPoint, Projection};
pub use self::sample::{sample_bilinear_point, sample_texture_bilinear};
pub use self::sequence::{render_frames, Frame, FrameSequencer};
pub use self::sink::{FfmpegConfig, FfmpegSink, FrameSink, PngSequenceSink};

//! Rotating-globe frame sequencer.
//!
//! Each frame depends only on its index (through the sub-longitude), so
//! batches of frames render in parallel and are handed to the sink in
//! index order afterwards.

use super::color::Texture;
use super::project::{orthographic_inverse_point, view_plane};
use super::sample::sample_bilinear_point;
use super::sink::FrameSink;
use crate::config::RenderConfig;
use crate::error::{GeoidError, Result};
use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Square RGB frame, shape (size, size, 3).
pub type Frame = Array3<u8>;

pub struct FrameSequencer<'a> {
    texture: &'a Texture,
    cfg: RenderConfig,
    x: Array2<f64>,
    y: Array2<f64>,
    rim: Array2<bool>,
}

impl<'a> FrameSequencer<'a> {
    pub fn new(texture: &'a Texture, cfg: RenderConfig) -> Result<Self> {
        cfg.validate()?;
        let (rows, cols, channels) = texture.dim();
        if rows == 0 || cols == 0 || channels != 3 {
            return Err(GeoidError::invalid(format!(
                "texture must be non-empty with 3 channels, got {:?}",
                texture.dim()
            )));
        }

        let (x, y) = view_plane(cfg.size_px);
        let mut rim = Array2::from_elem(x.dim(), false);
        ndarray::Zip::from(&mut rim).and(&x).and(&y).for_each(|r, &x, &y| {
            let rho = (x * x + y * y).sqrt();
            *r = rho <= 1.0 && rho >= cfg.rim_inner;
        });

        Ok(Self {
            texture,
            cfg,
            x,
            y,
            rim,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    pub fn frame_count(&self) -> usize {
        self.cfg.frame_count()
    }

    /// Renders frame `k`: background, projected sphere, then the rim on top.
    pub fn render_frame(&self, k: usize) -> Frame {
        let n = self.cfg.size_px;
        let lon0 = self.cfg.sub_longitude(k);
        let lat0 = self.cfg.lat0_deg;
        let tex = self.texture.view();

        let mut frame = Array3::<u8>::zeros((n, n, 3));
        frame
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut row)| {
                for j in 0..n {
                    let rgb = if self.rim[[i, j]] {
                        self.cfg.rim_color
                    } else {
                        let p = orthographic_inverse_point(self.x[[i, j]], self.y[[i, j]], lon0, lat0);
                        if p.visible {
                            sample_bilinear_point(&tex, p.lat, p.lon)
                        } else {
                            self.cfg.background
                        }
                    };
                    row[[j, 0]] = rgb[0];
                    row[[j, 1]] = rgb[1];
                    row[[j, 2]] = rgb[2];
                }
            });
        frame
    }

    /// Renders every frame and pushes them to `sink` in increasing index
    /// order, then finalizes the sink. Returns the number of frames.
    pub fn run<S: FrameSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        let total = self.frame_count();
        let batch = (rayon::current_num_threads() * 2).max(1);
        let start = Instant::now();

        info!(
            frames = total,
            size = self.cfg.size_px,
            fps = self.cfg.fps,
            lat0 = self.cfg.lat0_deg,
            spin = self.cfg.spin_deg_per_s,
            "rendering frames"
        );

        for first in (0..total).step_by(batch) {
            let last = (first + batch).min(total);
            // collect() 는 인덱스 순서를 유지한다
            let frames: Vec<Frame> = (first..last)
                .into_par_iter()
                .map(|k| self.render_frame(k))
                .collect();
            for (k, frame) in (first..last).zip(frames.iter()) {
                sink.push(k, frame)?;
            }
            debug!(done = last, total, "frame batch emitted");
        }
        sink.finish()?;

        info!(
            frames = total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rendering finished"
        );
        Ok(total)
    }
}

/// Renders the whole sequence into memory.
pub fn render_frames(texture: &Texture, cfg: RenderConfig) -> Result<Vec<Frame>> {
    let sequencer = FrameSequencer::new(texture, cfg)?;
    let mut frames = Vec::with_capacity(sequencer.frame_count());
    sequencer.run(&mut frames)?;
    Ok(frames)
}

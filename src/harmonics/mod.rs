//! Spherical-harmonic side of the pipeline: coefficients in, scalar grid out.

pub mod coeffs;
pub mod grid;
pub mod legendre;
pub mod synth;

pub use self::coeffs::{load_coefficients, CoefficientTable};
pub use self::grid::ScalarGrid;
pub use self::legendre::{fully_normalized_legendre, LegendreRow};
pub use self::synth::{synthesize_geoid, synthesize_on_grid};

//! gfc 파일 -> 합성 -> 텍스처 -> 프레임 전체 경로

use crate::config::{GridSpec, RenderConfig, SynthesisConfig};
use crate::harmonics::{load_coefficients, synthesize_on_grid, CoefficientTable};
use crate::render::{render_frames, save_map_png, texture_from_grid, FrameSequencer, FrameSink, PngSequenceSink};
use approx::assert_abs_diff_eq;
use std::io::Write;

const MODEL: &str = "\
modelname                 PIPELINE
earth_gravity_constant    3.986004415E+14
radius                    6.3781363E+06
end_of_head ==================================
gfc  2  0  -4.84165143790815D-04  0.0
gfc  2  2   2.43938357328313E-06  -1.40027370385934E-06
gfc  3  0   9.57161207093473E-07  0.0
gfc  3  1   2.03046201047864E-06   2.48200415856872E-07
gfc  4  0   5.39965866638991E-07  0.0
";

fn write_model() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MODEL.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn tiny_render() -> RenderConfig {
    RenderConfig {
        fps: 2,
        duration_s: 1.0,
        size_px: 16,
        ..RenderConfig::default()
    }
}

#[test]
fn test_file_to_frames() {
    let file = write_model();
    let table = load_coefficients(file.path(), 4).unwrap();
    let grid = synthesize_on_grid(&table, &SynthesisConfig::new(4), &GridSpec::with_step(10.0)).unwrap();
    assert_eq!(grid.shape(), (19, 36));
    assert_eq!(grid.finite_count(), 19 * 36);

    let scale = grid.values().iter().fold(0.0_f64, |a, v| a.max(v.abs()));
    // C20 (편평도) 가 지배: 수 km
    assert!(scale > 1000.0 && scale < 10000.0, "{}", scale);
    assert_abs_diff_eq!(grid.finite_mean().unwrap(), 0.0, epsilon = 1e-9 * scale);

    let texture = texture_from_grid(&grid);
    assert_eq!(texture.dim(), (19, 36, 3));
    assert_eq!(texture, texture_from_grid(&grid));

    let frames = render_frames(&texture, tiny_render()).unwrap();
    assert_eq!(frames.len(), 2);
    for frame in &frames {
        assert_eq!(frame.dim(), (16, 16, 3));
        assert_eq!(
            [frame[[0, 0, 0]], frame[[0, 0, 1]], frame[[0, 0, 2]]],
            tiny_render().background
        );
    }
}

#[test]
fn test_zonal_texture_constant_along_rows() {
    let mut table = CoefficientTable::zeros(6);
    table.set(2, 0, -4.84165143790815e-4, 0.0).unwrap();
    table.set(4, 0, 5.39965866638991e-7, 0.0).unwrap();
    let grid = synthesize_on_grid(&table, &SynthesisConfig::new(6), &GridSpec::with_step(5.0)).unwrap();
    let texture = texture_from_grid(&grid);
    let (rows, cols, _) = texture.dim();
    for i in 0..rows {
        for j in 1..cols {
            for c in 0..3 {
                assert_eq!(texture[[i, j, c]], texture[[i, 0, c]]);
            }
        }
    }
    // 적도와 극은 다른 색
    assert_ne!(texture[[0, 0, 0]], texture[[rows / 2, 0, 0]]);
}

#[test]
fn test_outputs_on_disk() {
    let file = write_model();
    let table = load_coefficients(file.path(), 4).unwrap();
    let grid = synthesize_on_grid(&table, &SynthesisConfig::new(4), &GridSpec::with_step(10.0)).unwrap();
    let texture = texture_from_grid(&grid);

    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("geoid_map.png");
    save_map_png(&texture, &grid.lons().view(), &map_path).unwrap();
    let map = image::open(&map_path).unwrap().to_rgb8();
    assert_eq!(map.dimensions(), (36, 19));

    let mut sink = PngSequenceSink::new(dir.path().join("frames")).unwrap();
    let sequencer = FrameSequencer::new(&texture, tiny_render()).unwrap();
    let written = sequencer.run(&mut sink as &mut dyn FrameSink).unwrap();
    assert_eq!(written, 2);
    for k in 0..written {
        let img = image::open(sink.frame_path(k)).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 16));
    }
    assert!(!sink.frame_path(2).exists());
}

#[test]
fn test_degree_beyond_loaded_table_rejected() {
    let file = write_model();
    let table = load_coefficients(file.path(), 4).unwrap();
    let res = synthesize_on_grid(&table, &SynthesisConfig::new(8), &GridSpec::with_step(10.0));
    assert!(matches!(res, Err(crate::error::GeoidError::InvalidConfiguration(_))));
}

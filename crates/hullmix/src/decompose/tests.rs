use super::*;
use crate::progress::Recorder;
use crate::simplify::{SimplifyCfg, StopReason};
use crate::synth::{blend_image, BlendCfg, ReplayToken};

fn four_color_image() -> (ImageBuffer, Palette) {
    let colors = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
    let palette = Palette::from_rows(&colors).unwrap();
    let image = ImageBuffer::new(2, 2, palette.colors().to_vec()).unwrap();
    (image, palette)
}

#[test]
fn two_by_two_image_reconstructs_exactly() {
    let (image, palette) = four_color_image();
    let out = decompose(&image, &palette, &DecomposeCfg::default()).unwrap();
    assert!(out.stats.rmse < 1e-9, "rmse {}", out.stats.rmse);
    assert_eq!(out.layers.len(), 4);
    for (i, layer) in out.layers.iter().enumerate() {
        for (p, &w) in layer.weights.iter().enumerate() {
            let expected = if p == i { 1.0 } else { 0.0 };
            assert!((w - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn two_by_two_image_with_asap_weights() {
    let (image, palette) = four_color_image();
    let cfg = DecomposeCfg {
        color_weighting: ColorWeighting::Asap,
    };
    let out = decompose(&image, &palette, &cfg).unwrap();
    assert!(out.stats.rmse < 1e-9);
}

#[test]
fn blended_image_is_reproduced_from_its_palette() {
    let palette = Palette::from_rows(&[
        [0.9, 0.1, 0.1],
        [0.1, 0.8, 0.2],
        [0.15, 0.2, 0.9],
        [0.95, 0.95, 0.9],
        [0.05, 0.05, 0.1],
    ])
    .unwrap();
    let cfg = BlendCfg {
        width: 12,
        height: 10,
        ..BlendCfg::default()
    };
    let image = blend_image(&palette, cfg, ReplayToken::new(4, 0)).unwrap();
    let mut rec = Recorder::default();
    let out = decompose_with(&image, &palette, &DecomposeCfg::default(), &mut rec).unwrap();
    assert!(out.stats.rmse < 0.5, "rmse {}", out.stats.rmse);
    assert_eq!(rec.stats, Some(out.stats));
    for p in 0..image.len() {
        let w = out.pixel_weights(p);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(w.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }
    // Layers sum back to the reconstruction.
    let mut sum = vec![nalgebra::Vector3::zeros(); image.len()];
    for layer in &out.layers {
        for (acc, px) in sum.iter_mut().zip(layer.render()) {
            *acc += px;
        }
    }
    for (a, b) in sum.iter().zip(out.reconstruction.pixels()) {
        assert!((a - b).norm() < 1e-12);
    }
}

#[test]
fn zero_rows_do_not_produce_nan() {
    let mut row = vec![0.0, 0.0, 0.0];
    assert!(!normalize_row(&mut row));
    assert_eq!(row, vec![0.0, 0.0, 0.0]);
    let mut row = vec![0.5, 1.5, -1e-9];
    assert!(normalize_row(&mut row));
    assert!((row[0] - 0.25).abs() < 1e-9 && (row[1] - 0.75).abs() < 1e-9);
    assert_eq!(row[2], 0.0);
}

#[test]
fn single_pixel_image() {
    let image = ImageBuffer::new(1, 1, vec![nalgebra::Vector3::new(0.2, 0.3, 0.1)]).unwrap();
    let palette = Palette::from_rows(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();
    let out = decompose(&image, &palette, &DecomposeCfg::default()).unwrap();
    assert_eq!(out.hull_pixels, vec![0]);
    assert!(out.stats.rmse < 1e-9);
}

#[test]
fn image_shape_is_validated() {
    let px = vec![nalgebra::Vector3::zeros(); 5];
    assert!(matches!(ImageBuffer::new(2, 2, px), Err(GeomError::InvalidInput { .. })));
}

#[test]
fn pipeline_extracts_palette_and_reports_diagnostics() {
    let source = Palette::from_rows(&[
        [0.9, 0.1, 0.1],
        [0.1, 0.8, 0.2],
        [0.15, 0.2, 0.9],
        [0.95, 0.95, 0.9],
        [0.05, 0.05, 0.1],
    ])
    .unwrap();
    let image = blend_image(
        &source,
        BlendCfg {
            width: 16,
            height: 12,
            ..BlendCfg::default()
        },
        ReplayToken::new(8, 0),
    )
    .unwrap();
    let cfg = PipelineCfg {
        simplify: SimplifyCfg {
            target_vertex_count: 6,
            ..SimplifyCfg::default()
        },
        ..PipelineCfg::default()
    };
    let mut rec = Recorder::default();
    let out = run_pipeline(&image, &cfg, &mut rec).unwrap();
    let d = out.diagnostics;
    assert_eq!(d.final_vertex_count, out.palette.len());
    assert_eq!(d.iteration_count, out.simplify.iterations);
    assert_eq!(d.status, out.simplify.status);
    assert_eq!(out.simplify.stop, StopReason::TargetReached);
    assert!((4..=6).contains(&out.palette.len()), "{} colors", out.palette.len());
    assert_eq!(out.decomposition.layers.len(), out.palette.len());
    assert!(d.rmse.is_finite());
    assert_eq!(d.rmse, out.decomposition.stats.rmse);
    assert_eq!(rec.stats, Some(out.decomposition.stats));
    assert_eq!(rec.iterations.len(), d.iteration_count);
}

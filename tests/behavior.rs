use image::{DynamicImage, Rgb, RgbImage};

use inkshake::displacement::generate_displacement;
use inkshake::error::ShakeError;
use inkshake::frame::{render_frame, RenderParams};
use inkshake::mask::extract_mask;
use inkshake::resample::{remap, sample_bilinear, RenderMode, SampleFilter};

fn blob(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if (x / 3 + y / 4) % 3 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    }))
}

#[test]
fn all_white_image_stays_white_for_any_shake() {
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
    let mask = extract_mask(&source, 80).expect("mask should extract");
    assert!(mask.as_slice().iter().all(|&value| value == 0.0));

    for seed in [0, 1, 99] {
        for strength in [0.0, 1.5, 10.0] {
            let params = RenderParams {
                strength,
                seed,
                threshold: 80,
                mode: RenderMode::MaskOnly,
                ..RenderParams::default()
            };
            let frame = render_frame(&source, &params).expect("frame should render");
            assert!(frame.pixels().all(|px| px.0 == [255, 255, 255, 255]));
        }
    }
}

#[test]
fn single_black_pixel_is_ink() {
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([0, 0, 0])));
    let mask = extract_mask(&source, 80).expect("mask should extract");
    assert_eq!(mask.as_slice(), &[1.0]);

    let params = RenderParams {
        strength: 0.0,
        threshold: 80,
        ..RenderParams::default()
    };
    let frame = render_frame(&source, &params).expect("frame should render");
    assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[test]
fn zero_strength_reproduces_the_thresholded_mask() {
    let source = blob(40, 30);
    let mask = extract_mask(&source, 128).expect("mask should extract");
    for antialias in [false, true] {
        let params = RenderParams {
            strength: 0.0,
            cell_count: 7,
            threshold: 128,
            seed: 31337,
            antialias,
            mode: RenderMode::MaskOnly,
        };
        let frame = render_frame(&source, &params).expect("frame should render");
        for (pixel, &ink) in frame.pixels().zip(mask.as_slice()) {
            let expected = if ink == 1.0 {
                [0, 0, 0, 255]
            } else {
                [255, 255, 255, 255]
            };
            assert_eq!(pixel.0, expected);
        }
    }
}

#[test]
fn eight_cells_on_a_square_frame_use_a_nine_point_lattice() {
    let field = generate_displacement(64, 64, 8, 12, 3.0).expect("field should generate");
    assert_eq!(field.cells(), (8, 8));
    assert_eq!(field.lattice_points(), (9, 9));

    let wide = generate_displacement(128, 64, 8, 12, 3.0).expect("field should generate");
    assert_eq!(wide.lattice_points(), (9, 5));
}

#[test]
fn displacement_respects_the_strength_bound() {
    for (strength, seed) in [(0.5, 1), (3.0, 2), (17.25, 3)] {
        let field = generate_displacement(50, 20, 4, seed, strength).expect("field");
        let within = field
            .dx()
            .as_slice()
            .iter()
            .chain(field.dy().as_slice())
            .all(|value| value.abs() <= strength);
        assert!(within, "strength {strength} exceeded");
    }
}

#[test]
fn bilinear_sampling_fades_into_the_border() {
    let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([0, 0, 0])));
    let mask = extract_mask(&source, 80).expect("mask");
    let interior = sample_bilinear(&mask, 2.0, 2.0);
    assert_eq!(interior, 1.0);

    let edge = sample_bilinear(&mask, -0.3, 2.0);
    assert!(edge > 0.0 && edge < interior, "edge sample {edge}");

    let corner = sample_bilinear(&mask, 4.6, 4.6);
    assert!(corner > 0.0 && corner < interior, "corner sample {corner}");
}

#[test]
fn large_shake_never_reads_out_of_bounds() {
    let source = blob(17, 9);
    let mask = extract_mask(&source, 80).expect("mask");
    let field = generate_displacement(17, 9, 2, 4, 40.0).expect("field");
    for filter in [SampleFilter::Nearest, SampleFilter::Bilinear] {
        let values = remap(&mask, &field, filter).expect("remap");
        assert_eq!((values.width(), values.height()), (17, 9));
    }
}

#[test]
fn invalid_inputs_fail_without_output() {
    let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
    assert!(matches!(
        render_frame(&empty, &RenderParams::default()),
        Err(ShakeError::InvalidDimensions { .. })
    ));

    let source = blob(8, 8);
    let negative = RenderParams {
        strength: -0.01,
        ..RenderParams::default()
    };
    assert!(matches!(
        render_frame(&source, &negative),
        Err(ShakeError::InvalidParameter { name: "strength", .. })
    ));
}

#[test]
fn enormous_strength_renders_without_panicking() {
    let source = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
    for antialias in [true, false] {
        let params = RenderParams {
            strength: 1.0e30,
            cell_count: 2,
            antialias,
            ..RenderParams::default()
        };
        let frame = render_frame(&source, &params).expect("render");
        assert_eq!(frame.dimensions(), (8, 8));
    }
}

#[test]
fn huge_cell_counts_render_at_pixel_resolution() {
    let source = blob(4, 4);
    let params = RenderParams {
        cell_count: u32::MAX,
        ..RenderParams::default()
    };
    let frame = render_frame(&source, &params).expect("render");
    assert_eq!(frame.dimensions(), (4, 4));
}

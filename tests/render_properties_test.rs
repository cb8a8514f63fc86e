// Property tests for the preview renderer
use image::{Rgba, RgbaImage};
use image_converter::preview::{render, FilterParameters, Rotation, SourceImage};
use proptest::prelude::*;

fn arb_image() -> impl Strategy<Value = RgbaImage> {
    (1u32..7, 1u32..7).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<u8>(), (w * h * 4) as usize).prop_map(move |raw| {
            RgbaImage::from_raw(w, h, raw).expect("buffer length matches dimensions")
        })
    })
}

fn single_pixel(rgb: [u8; 3]) -> SourceImage {
    SourceImage::from_rgba(RgbaImage::from_pixel(1, 1, Rgba([rgb[0], rgb[1], rgb[2], 255])))
}

fn render_once(image: &RgbaImage, params: &FilterParameters) -> RgbaImage {
    render(&SourceImage::from_rgba(image.clone()), params)
}

proptest! {
    #[test]
    fn default_parameters_are_identity(image in arb_image()) {
        let out = render_once(&image, &FilterParameters::default());
        prop_assert_eq!(out, image);
    }

    #[test]
    fn four_quarter_turns_restore_image(image in arb_image()) {
        let params = FilterParameters {
            rotation: Rotation::Deg90,
            ..FilterParameters::default()
        };

        let mut current = image.clone();
        for _ in 0..4 {
            current = render_once(&current, &params);
        }
        prop_assert_eq!(current, image);
    }

    #[test]
    fn flips_are_involutions(image in arb_image(), horizontal in any::<bool>()) {
        let params = FilterParameters {
            flip_horizontal: horizontal,
            flip_vertical: !horizontal,
            ..FilterParameters::default()
        };

        let once = render_once(&image, &params);
        let twice = render_once(&once, &params);
        prop_assert_eq!(twice, image);
    }

    #[test]
    fn grayscale_channels_are_equal(image in arb_image()) {
        let params = FilterParameters {
            grayscale: true,
            ..FilterParameters::default()
        };

        let out = render_once(&image, &params);
        for pixel in out.pixels() {
            prop_assert_eq!(pixel[0], pixel[1]);
            prop_assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn negative_is_an_involution(image in arb_image()) {
        let params = FilterParameters {
            negative: true,
            ..FilterParameters::default()
        };

        let once = render_once(&image, &params);
        let twice = render_once(&once, &params);
        prop_assert_eq!(twice, image);
    }

    #[test]
    fn alpha_survives_color_stage(image in arb_image(), brightness in 0.5f64..2.0) {
        let params = FilterParameters {
            brightness,
            sepia: true,
            ..FilterParameters::default()
        };

        let out = render_once(&image, &params);
        for (before, after) in image.pixels().zip(out.pixels()) {
            prop_assert_eq!(before[3], after[3]);
        }
    }

    #[test]
    fn sharpen_keeps_flat_images(
        w in 1u32..9,
        h in 1u32..9,
        color in any::<[u8; 4]>(),
    ) {
        let image = RgbaImage::from_pixel(w, h, Rgba(color));
        let params = FilterParameters {
            sharpen: true,
            ..FilterParameters::default()
        };

        prop_assert_eq!(render_once(&image, &params), image);
    }

    #[test]
    fn output_dimensions_follow_rotation(image in arb_image(), degrees in 0i32..4) {
        let rotation = Rotation::try_from(degrees * 90).expect("multiple of 90");
        let params = FilterParameters {
            rotation,
            ..FilterParameters::default()
        };

        let out = render_once(&image, &params);
        let (w, h) = image.dimensions();
        if rotation.swaps_dimensions() {
            prop_assert_eq!(out.dimensions(), (h, w));
        } else {
            prop_assert_eq!(out.dimensions(), (w, h));
        }
    }
}

#[test]
fn brightness_doubles_channels() {
    let params = FilterParameters {
        brightness: 2.0,
        ..FilterParameters::default()
    };
    let out = render(&single_pixel([100, 50, 10]), &params);
    assert_eq!(out.get_pixel(0, 0), &Rgba([200, 100, 20, 255]));
}

#[test]
fn contrast_scales_around_midpoint() {
    let params = FilterParameters {
        contrast: 2.0,
        ..FilterParameters::default()
    };
    let out = render(&single_pixel([160, 128, 128]), &params);
    assert_eq!(out.get_pixel(0, 0)[0], 192);
}

#[test]
fn red_tint_on_black_rounds_half_up() {
    let params = FilterParameters {
        tint: "#ff0000".to_string(),
        ..FilterParameters::default()
    };
    let out = render(&single_pixel([0, 0, 0]), &params);
    assert_eq!(out.get_pixel(0, 0), &Rgba([128, 0, 0, 255]));
}

#[test]
fn malformed_tint_is_ignored() {
    let source = single_pixel([30, 60, 90]);
    for tint in ["red", "#ff00", "#gg0000", "#ff0000ff"] {
        let params = FilterParameters {
            tint: tint.to_string(),
            ..FilterParameters::default()
        };
        assert_eq!(&render(&source, &params), source.as_rgba(), "tint {tint:?}");
    }
}

#[test]
fn sharpen_leaves_border_ring_untouched() {
    let mut image = RgbaImage::from_pixel(5, 5, Rgba([40, 40, 40, 255]));
    image.put_pixel(2, 2, Rgba([200, 200, 200, 255]));
    let params = FilterParameters {
        sharpen: true,
        ..FilterParameters::default()
    };

    let out = render(&SourceImage::from_rgba(image.clone()), &params);
    for (x, y, pixel) in out.enumerate_pixels() {
        if x == 0 || y == 0 || x == 4 || y == 4 {
            assert_eq!(pixel, image.get_pixel(x, y));
        }
    }
    assert_eq!(out.get_pixel(2, 2)[0], 255);
}

#[test]
fn flip_applies_to_source_before_quarter_turn() {
    let image = RgbaImage::from_fn(2, 3, |x, y| Rgba([(y * 2 + x) as u8, 0, 0, 255]));
    let params = FilterParameters {
        rotation: Rotation::Deg90,
        flip_horizontal: true,
        ..FilterParameters::default()
    };

    let out = render(&SourceImage::from_rgba(image), &params);
    let tags: Vec<u8> = out.pixels().map(|p| p[0]).collect();
    assert_eq!(out.dimensions(), (3, 2));
    assert_eq!(tags, vec![5, 3, 1, 4, 2, 0]);
}

#[test]
fn vanishing_blur_radius_leaves_image_unchanged() {
    let source = SourceImage::from_rgba(RgbaImage::from_pixel(5, 5, Rgba([200, 150, 100, 255])));
    let params = FilterParameters {
        blur: 1e-170,
        ..FilterParameters::default()
    }
    .clamped();

    assert_eq!(&render(&source, &params), source.as_rgba());
}

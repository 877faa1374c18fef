//! End-to-end scenarios against the global registry, one per documented
//! behavior: parsing, mixing, relative `calc()`, contrast, gamut membership,
//! `none`/NaN handling, and named-color round-tripping.

use colorcraft::model::FormatOptions;
use colorcraft::{registry, Color, HueInterpolation, MixOptions};

#[test]
fn hex_color_converts_to_rgb_function_notation() {
    let color = Color::from("#ff5733").unwrap();
    let text = color.to(registry(), "rgb", &FormatOptions::new("css-gamut-map")).unwrap();
    assert_eq!(text, "rgb(255 87 51)");
}

#[test]
fn mixing_red_and_green_in_hsl_picks_the_requested_arc() {
    let red = Color::from("hsl(0 100 50)").unwrap();
    let green = Color::from("hsl(120 100 50)").unwrap();

    let shorter = red
        .mix(registry(), &green, "hsl", &MixOptions { hue: HueInterpolation::Shorter, ..Default::default() })
        .unwrap()
        .to(registry(), "hsl", &FormatOptions::new("css-gamut-map"))
        .unwrap();
    assert_eq!(shorter, "hsl(60 100 50)");

    let longer = red
        .mix(registry(), &green, "hsl", &MixOptions { hue: HueInterpolation::Longer, ..Default::default() })
        .unwrap()
        .to(registry(), "hsl", &FormatOptions::new("css-gamut-map"))
        .unwrap();
    assert_eq!(longer, "hsl(240 100 50)");
}

#[test]
fn color_mix_normalizes_partial_weights_and_scales_alpha() {
    let color = Color::from("color-mix(in hsl, hsl(0 100 50) 30%, hsl(120 100 50) 50%)").unwrap();
    let text = color.to(registry(), "hsl", &FormatOptions::new("css-gamut-map")).unwrap();
    assert_eq!(text, "hsl(75 100 50 / 0.8)");
}

#[test]
fn relative_color_syntax_evaluates_calc_against_the_origin_color() {
    let color = Color::from("rgb(from #ff0000 calc(r * 0.5) calc(g + 50) calc(b + 75))").unwrap();
    let mut options = FormatOptions::new("css-gamut-map");
    options.precision = Some(4);
    let text = color.to(registry(), "rgb", &options).unwrap();
    assert_eq!(text, "rgb(127.5 50 75)");
}

#[test]
fn white_on_black_hits_the_maximum_wcag_contrast_ratio() {
    let white = Color::from("#fff").unwrap();
    let black = Color::from("#000").unwrap();
    let ratio = white.contrast(registry(), &black).unwrap();
    assert!((ratio - 21.0).abs() < 1e-6);
}

#[test]
fn display_p3_red_escapes_srgb_but_stays_inside_unbounded_xyz() {
    let color = Color::from("color(display-p3 1 0 0)").unwrap();
    assert!(!color.in_gamut(registry(), Some("srgb")).unwrap());
    assert!(color.in_gamut(registry(), Some("xyz")).unwrap());
}

#[test]
fn none_and_calc_nan_both_collapse_to_zero() {
    let color = Color::from("hsl(none calc(NaN) 50%)").unwrap();
    let text = color.to(registry(), "hsl", &FormatOptions::new("css-gamut-map")).unwrap();
    assert_eq!(text, "hsl(0 0 50)");
}

#[test]
fn a_freshly_registered_named_color_round_trips_through_its_name() {
    registry().register_named_color("dusk mint", [123, 167, 151]).unwrap();
    let color = Color::from("rgb(123 167 151)").unwrap();
    let text = color.to(registry(), "named-color", &FormatOptions::new("css-gamut-map")).unwrap();
    assert_eq!(text, "duskmint");
}

//! Populates a fresh [`Registry`] with every built-in model, color space,
//! named color, and fit method.
//!
//! Grounded in the teacher's own hard-coded `ColorSpace` variants
//! (`core::space`, `core::conversion`) for which models exist and how they
//! bridge to each other; the actual component shapes and matrices come from
//! [`crate::core::math`]. The named-color list follows the standard CSS
//! Color 4 keyword table, the same set exercised by the retrieval pack's own
//! named-color parsers (e.g. `other_examples`' `tint`-derived color table).

use crate::core::math;
use crate::error::{Error, RegistrationError};
use crate::model::{transform, ColorModelConverter, ColorSpaceConverter, ComponentDefinition, TargetGamut, ValueKind};
use crate::registry::Registry;
use crate::Float;

fn model(
    components: [(&str, ComponentDefinition); 3],
    bridge: &str,
    to_bridge: crate::model::Transform,
    from_bridge: crate::model::Transform,
    target_gamut: TargetGamut,
    supports_legacy: bool,
    alpha_variant: Option<&str>,
) -> ColorModelConverter {
    ColorModelConverter {
        components: components.into_iter().map(|(n, d)| (n.to_owned(), d)).collect(),
        bridge: bridge.to_owned(),
        to_bridge,
        from_bridge,
        target_gamut,
        supports_legacy,
        alpha_variant: alpha_variant.map(str::to_owned),
    }
}

fn comp(index: usize, kind: ValueKind, precision: u32) -> ComponentDefinition {
    ComponentDefinition::new(index, kind, Some(precision))
}

/// Install every built-in model, color space, named color, and fit method.
/// Called exactly once, from [`crate::registry::registry`]'s lazy init.
pub(crate) fn install(registry: &Registry) {
    install_xyz(registry);
    install_rgb_spaces(registry);
    install_rgb_functions(registry);
    install_lab_family(registry);
    install_oklab_family(registry);
    crate::gamut::install(registry);
    install_named_colors(registry);
    crate::bases::install(registry);
}

// -- XYZ: the two roots of the conversion graph -------------------------------------------------

fn xyz_components() -> [(&'static str, ComponentDefinition); 3] {
    let unbounded = ValueKind::Range {
        min: Float::NEG_INFINITY,
        max: Float::INFINITY,
    };
    [
        ("x", comp(0, unbounded.clone(), 5)),
        ("y", comp(1, unbounded.clone(), 5)),
        ("z", comp(2, unbounded, 5)),
    ]
}

fn install_xyz(registry: &Registry) {
    let xyz_d65 = model(
        xyz_components(),
        "xyz-d50",
        transform(math::d65_to_d50),
        transform(math::d50_to_d65),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry
        .register_bridging_pair("xyz-d65", xyz_d65)
        .expect("xyz-d65 registers exactly once during builtins::install");

    let xyz_d50 = model(
        xyz_components(),
        "xyz-d65",
        transform(math::d50_to_d65),
        transform(math::d65_to_d50),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry
        .register_color_function("xyz-d50", xyz_d50)
        .expect("xyz-d50 registers exactly once during builtins::install");

    let xyz_alias = model(
        xyz_components(),
        "xyz-d65",
        transform(|v| *v),
        transform(|v| *v),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry
        .register_color_function("xyz", xyz_alias)
        .expect("xyz registers exactly once during builtins::install");
}

// -- RGB-family color spaces, each a matrix plus a transfer function -----------------------------

fn install_rgb_spaces(registry: &Registry) {
    registry
        .register_color_space(
            "srgb-linear",
            ColorSpaceConverter {
                bridge: "xyz-d65".to_owned(),
                to_bridge_matrix: math::LINEAR_SRGB_TO_XYZ,
                from_bridge_matrix: math::XYZ_TO_LINEAR_SRGB,
                to_linear: None,
                from_linear: None,
                target_gamut: TargetGamut::named("srgb"),
            },
        )
        .expect("srgb-linear registers exactly once");

    registry
        .register_color_space(
            "srgb",
            ColorSpaceConverter {
                bridge: "srgb-linear".to_owned(),
                to_bridge_matrix: identity(),
                from_bridge_matrix: identity(),
                to_linear: Some(transform(math::srgb_to_linear)),
                from_linear: Some(transform(math::linear_to_srgb)),
                target_gamut: TargetGamut::named("srgb"),
            },
        )
        .expect("srgb registers exactly once");

    registry
        .register_color_space(
            "display-p3",
            ColorSpaceConverter {
                bridge: "xyz-d65".to_owned(),
                to_bridge_matrix: math::LINEAR_DISPLAY_P3_TO_XYZ,
                from_bridge_matrix: math::XYZ_TO_LINEAR_DISPLAY_P3,
                to_linear: Some(transform(math::srgb_to_linear)),
                from_linear: Some(transform(math::linear_to_srgb)),
                target_gamut: TargetGamut::named("display-p3"),
            },
        )
        .expect("display-p3 registers exactly once");

    registry
        .register_color_space(
            "rec2020",
            ColorSpaceConverter {
                bridge: "xyz-d65".to_owned(),
                to_bridge_matrix: math::LINEAR_REC2020_TO_XYZ,
                from_bridge_matrix: math::XYZ_TO_LINEAR_REC2020,
                to_linear: Some(transform(math::rec2020_to_linear)),
                from_linear: Some(transform(math::linear_to_rec2020)),
                target_gamut: TargetGamut::named("rec2020"),
            },
        )
        .expect("rec2020 registers exactly once");

    registry
        .register_color_space(
            "a98-rgb",
            ColorSpaceConverter {
                bridge: "xyz-d65".to_owned(),
                to_bridge_matrix: math::LINEAR_A98RGB_TO_XYZ,
                from_bridge_matrix: math::XYZ_TO_LINEAR_A98RGB,
                to_linear: Some(transform(math::a98_to_linear)),
                from_linear: Some(transform(math::linear_to_a98)),
                target_gamut: TargetGamut::named("a98-rgb"),
            },
        )
        .expect("a98-rgb registers exactly once");

    registry
        .register_color_space(
            "prophoto-rgb",
            ColorSpaceConverter {
                bridge: "xyz-d50".to_owned(),
                to_bridge_matrix: math::LINEAR_PROPHOTO_TO_XYZ_D50,
                from_bridge_matrix: math::XYZ_D50_TO_LINEAR_PROPHOTO,
                to_linear: Some(transform(math::prophoto_to_linear)),
                from_linear: Some(transform(math::linear_to_prophoto)),
                target_gamut: TargetGamut::named("prophoto-rgb"),
            },
        )
        .expect("prophoto-rgb registers exactly once");
}

fn identity() -> [[Float; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

// -- The CSS color functions: rgb(), hsl(), hwb() -----------------------------------------------

fn install_rgb_functions(registry: &Registry) {
    let byte = ValueKind::Range { min: 0.0, max: 255.0 };

    let rgb = model(
        [("r", comp(0, byte.clone(), 0)), ("g", comp(1, byte.clone(), 0)), ("b", comp(2, byte, 0))],
        "srgb",
        transform(|v| [v[0] / 255.0, v[1] / 255.0, v[2] / 255.0]),
        transform(|v| [v[0] * 255.0, v[1] * 255.0, v[2] * 255.0]),
        TargetGamut::named("srgb"),
        true,
        Some("rgba"),
    );
    registry.register_color_function("rgb", rgb).expect("rgb registers exactly once");

    let percent = ValueKind::Percentage;
    let hsl = model(
        [("h", comp(0, ValueKind::Angle, 1)), ("s", comp(1, percent.clone(), 1)), ("l", comp(2, percent, 1))],
        "rgb",
        transform(|v| {
            let rgb01 = math::hsl_to_rgb(&[v[0], v[1] / 100.0, v[2] / 100.0]);
            [rgb01[0] * 255.0, rgb01[1] * 255.0, rgb01[2] * 255.0]
        }),
        transform(|v| {
            let hsl = math::rgb_to_hsl(&[v[0] / 255.0, v[1] / 255.0, v[2] / 255.0]);
            [hsl[0], hsl[1] * 100.0, hsl[2] * 100.0]
        }),
        TargetGamut::Unbounded,
        true,
        Some("hsla"),
    );
    registry.register_color_function("hsl", hsl).expect("hsl registers exactly once");

    let percent = ValueKind::Percentage;
    let hwb = model(
        [("h", comp(0, ValueKind::Angle, 1)), ("w", comp(1, percent.clone(), 1)), ("b", comp(2, percent, 1))],
        "rgb",
        transform(|v| {
            let rgb01 = math::hwb_to_rgb(&[v[0], v[1] / 100.0, v[2] / 100.0]);
            [rgb01[0] * 255.0, rgb01[1] * 255.0, rgb01[2] * 255.0]
        }),
        transform(|v| {
            let hwb = math::rgb_to_hwb(&[v[0] / 255.0, v[1] / 255.0, v[2] / 255.0]);
            [hwb[0], hwb[1] * 100.0, hwb[2] * 100.0]
        }),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry.register_color_function("hwb", hwb).expect("hwb registers exactly once");
}

// -- CIE Lab / LCH, D50-referenced ---------------------------------------------------------------

fn install_lab_family(registry: &Registry) {
    let lightness = ValueKind::Percentage;
    let ab = ValueKind::Range { min: -125.0, max: 125.0 };

    let lab = model(
        [("l", comp(0, lightness.clone(), 5)), ("a", comp(1, ab.clone(), 5)), ("b", comp(2, ab, 5))],
        "xyz-d50",
        transform(math::lab_to_xyz_d50),
        transform(math::xyz_d50_to_lab),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry.register_color_function("lab", lab).expect("lab registers exactly once");

    let chroma = ValueKind::Range { min: 0.0, max: 150.0 };
    let lch = model(
        [("l", comp(0, lightness, 5)), ("c", comp(1, chroma, 5)), ("h", comp(2, ValueKind::Angle, 5))],
        "lab",
        transform(math::polar_to_rectangular),
        transform(math::rectangular_to_polar),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry.register_color_function("lch", lch).expect("lch registers exactly once");
}

// -- Oklab / Oklch ------------------------------------------------------------------------------

fn install_oklab_family(registry: &Registry) {
    let lightness = ValueKind::Range { min: 0.0, max: 1.0 };
    let ab = ValueKind::Range { min: -0.4, max: 0.4 };

    let oklab = model(
        [("l", comp(0, lightness.clone(), 5)), ("a", comp(1, ab.clone(), 5)), ("b", comp(2, ab, 5))],
        "xyz-d65",
        transform(math::oklab_to_xyz),
        transform(math::xyz_to_oklab),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry.register_color_function("oklab", oklab).expect("oklab registers exactly once");

    let chroma = ValueKind::Range { min: 0.0, max: 0.4 };
    let oklch = model(
        [("l", comp(0, lightness, 5)), ("c", comp(1, chroma, 5)), ("h", comp(2, ValueKind::Angle, 2))],
        "oklab",
        transform(math::polar_to_rectangular),
        transform(math::rectangular_to_polar),
        TargetGamut::Unbounded,
        false,
        None,
    );
    registry.register_color_function("oklch", oklch).expect("oklch registers exactly once");
}

// -- Named colors: the standard CSS Color 4 keyword table ------------------------------------------

/// A handful of the standard CSS named colors are historical spelling
/// aliases that share one RGB value (`aqua`/`cyan`, `gray`/`grey`, ...).
/// `register_named_color` rejects a second name for an already-named RGB
/// value, so the table below keeps every traditional spelling but only the
/// first occurrence of each RGB value actually registers; the rest are
/// skipped here exactly like the alias itself had never been listed.
fn install_named_colors(registry: &Registry) {
    for (name, rgb) in NAMED_COLORS {
        match registry.register_named_color(name, *rgb) {
            Ok(()) | Err(Error::Registration(RegistrationError::RgbAlreadyNamed(_))) => {}
            Err(error) => panic!("built-in named color `{name}` failed to register: {error}"),
        }
    }
}

#[rustfmt::skip]
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]), ("antiquewhite", [250, 235, 215]), ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]), ("azure", [240, 255, 255]), ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]), ("black", [0, 0, 0]), ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]), ("blueviolet", [138, 43, 226]), ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]), ("cadetblue", [95, 158, 160]), ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]), ("coral", [255, 127, 80]), ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]), ("crimson", [220, 20, 60]), ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]), ("darkcyan", [0, 139, 139]), ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]), ("darkgreen", [0, 100, 0]), ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]), ("darkmagenta", [139, 0, 139]), ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]), ("darkorchid", [153, 50, 204]), ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]), ("darkseagreen", [143, 188, 143]), ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]), ("darkslategrey", [47, 79, 79]), ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]), ("deeppink", [255, 20, 147]), ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]), ("dimgrey", [105, 105, 105]), ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]), ("floralwhite", [255, 250, 240]), ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]), ("gainsboro", [220, 220, 220]), ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]), ("goldenrod", [218, 165, 32]), ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]), ("greenyellow", [173, 255, 47]), ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]), ("hotpink", [255, 105, 180]), ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]), ("ivory", [255, 255, 240]), ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]), ("lavenderblush", [255, 240, 245]), ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]), ("lightblue", [173, 216, 230]), ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]), ("lightgoldenrodyellow", [250, 250, 210]), ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]), ("lightgrey", [211, 211, 211]), ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]), ("lightseagreen", [32, 178, 170]), ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]), ("lightslategrey", [119, 136, 153]), ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]), ("lime", [0, 255, 0]), ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]), ("magenta", [255, 0, 255]), ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]), ("mediumblue", [0, 0, 205]), ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]), ("mediumseagreen", [60, 179, 113]), ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]), ("mediumturquoise", [72, 209, 204]), ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]), ("mintcream", [245, 255, 250]), ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]), ("navajowhite", [255, 222, 173]), ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]), ("olive", [128, 128, 0]), ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]), ("orangered", [255, 69, 0]), ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]), ("palegreen", [152, 251, 152]), ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]), ("papayawhip", [255, 239, 213]), ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]), ("pink", [255, 192, 203]), ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]), ("purple", [128, 0, 128]), ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]), ("rosybrown", [188, 143, 143]), ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]), ("salmon", [250, 128, 114]), ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]), ("seashell", [255, 245, 238]), ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]), ("skyblue", [135, 206, 235]), ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]), ("slategrey", [112, 128, 144]), ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]), ("steelblue", [70, 130, 180]), ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]), ("thistle", [216, 191, 216]), ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]), ("violet", [238, 130, 238]), ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]), ("whitesmoke", [245, 245, 245]), ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

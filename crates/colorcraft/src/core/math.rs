//! The math kernel: matrix/vector multiply, the conversion matrices for every
//! built-in color space, transfer functions (gammas), and the generic
//! polar/rectangular and lightness-revision conversions shared by the Lab and
//! Oklab families.
//!
//! Every function here is a pure `[Float; 3] -> [Float; 3]` transform with no
//! notion of a "current model" — [`crate::builtins`] wires them into
//! [`crate::model::ColorModelConverter`] entries under their registered
//! names. The matrices are sourced, like the teacher crate credits them, from
//! Lea Verou's and Chris Lilley's [Color.js](https://colorjs.io), which is
//! also the source for this crate's additional A98 RGB and ProPhoto RGB
//! entries that the teacher does not carry.

use crate::Float;

/// An extension trait for floating point numbers.
///
/// Pre-computes the rounding factor used when limiting a floating point
/// number's precision for equality comparisons, which depends on the
/// platform float width.
pub(crate) trait FloatExt {
    const ROUNDING_FACTOR: Self;
}

impl FloatExt for f64 {
    const ROUNDING_FACTOR: f64 = 1e12;
}

impl FloatExt for f32 {
    const ROUNDING_FACTOR: f32 = 1e4;
}

// --------------------------------------------------------------------------------------------------------------------

/// Multiply a 3 by 3 matrix and a 3-element vector, producing a new vector.
#[inline]
pub(crate) fn multiply(matrix: &[[Float; 3]; 3], vector: &[Float; 3]) -> [Float; 3] {
    let [row1, row2, row3] = matrix;

    [
        row1[0].mul_add(vector[0], row1[1].mul_add(vector[1], row1[2] * vector[2])),
        row2[0].mul_add(vector[0], row2[1].mul_add(vector[1], row2[2] * vector[2])),
        row3[0].mul_add(vector[0], row3[1].mul_add(vector[1], row3[2] * vector[2])),
    ]
}

// --------------------------------------------------------------------------------------------------------------------
// sRGB / Display P3 share the same gamma.
// https://github.com/color-js/color.js/blob/main/src/spaces/srgb.js

/// Convert gamma-corrected sRGB (or Display P3, which shares sRGB's gamma)
/// to linear-light coordinates.
pub(crate) fn srgb_to_linear(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        let magnitude = value.abs();
        if magnitude <= 0.04045 {
            value / 12.92
        } else {
            ((magnitude + 0.055) / 1.055).powf(2.4).copysign(value)
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

/// Convert linear-light sRGB (or Display P3) to gamma-corrected coordinates.
pub(crate) fn linear_to_srgb(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        let magnitude = value.abs();
        if magnitude <= 0.00313098 {
            value * 12.92
        } else {
            magnitude
                .powf(1.0 / 2.4)
                .mul_add(1.055, -0.055)
                .copysign(value)
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const LINEAR_SRGB_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.41239079926595934, 0.357584339383878,   0.1804807884018343  ],
    [ 0.21263900587151027, 0.715168678767756,   0.07219231536073371 ],
    [ 0.01933081871559182, 0.11919477979462598, 0.9505321522496607  ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const XYZ_TO_LINEAR_SRGB: [[Float; 3]; 3] = [
    [  3.2409699419045226,  -1.537383177570094,   -0.4986107602930034  ],
    [ -0.9692436362808796,   1.8759675015077202,   0.04155505740717559 ],
    [  0.05563007969699366, -0.20397695888897652,  1.0569715142428786  ],
];

// https://github.com/color-js/color.js/blob/main/src/spaces/p3-linear.js

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const LINEAR_DISPLAY_P3_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.4865709486482162, 0.26566769316909306, 0.1982172852343625 ],
    [ 0.2289745640697488, 0.6917385218365064,  0.079286914093745  ],
    [ 0.0000000000000000, 0.04511338185890264, 1.043944368900976  ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const XYZ_TO_LINEAR_DISPLAY_P3: [[Float; 3]; 3] = [
    [  2.493496911941425,   -0.9313836179191239,  -0.40271078445071684  ],
    [ -0.8294889695615747,   1.7626640603183463,   0.023624685841943577 ],
    [  0.03584583024378447, -0.07617238926804182,  0.9568845240076872   ],
];

// --------------------------------------------------------------------------------------------------------------------
// https://github.com/color-js/color.js/blob/main/src/spaces/rec2020.js

const REC2020_ALPHA: Float = 1.09929682680944;
const REC2020_BETA: Float = 0.018053968510807;

/// Convert gamma-corrected Rec. 2020 to linear-light coordinates.
pub(crate) fn rec2020_to_linear(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        if value < REC2020_BETA * 4.5 {
            value / 4.5
        } else {
            ((value + REC2020_ALPHA - 1.0) / REC2020_ALPHA).powf((0.45 as Float).recip())
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

/// Convert linear-light Rec. 2020 to gamma-corrected coordinates.
pub(crate) fn linear_to_rec2020(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        if value < REC2020_BETA {
            value * 4.5
        } else {
            REC2020_ALPHA * value.powf(0.45) - (REC2020_ALPHA - 1.0)
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const LINEAR_REC2020_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.6369580483012914, 0.14461690358620832,  0.1688809751641721  ],
    [ 0.2627002120112671, 0.6779980715188708,   0.05930171646986196 ],
    [ 0.000000000000000,  0.028072693049087428, 1.060985057710791   ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const XYZ_TO_LINEAR_REC2020: [[Float; 3]; 3] = [
    [  1.716651187971268,  -0.355670783776392, -0.253366281373660  ],
    [ -0.666684351832489,   1.616481236634939,  0.0157685458139111 ],
    [  0.017639857445311,  -0.042770613257809,  0.942103121235474  ],
];

// --------------------------------------------------------------------------------------------------------------------
// A98 RGB (Adobe RGB 1998). Pure power gamma, no linear toe.
// https://github.com/color-js/color.js/blob/main/src/spaces/a98rgb.js

const A98_GAMMA: Float = 563.0 / 256.0;

/// Convert gamma-corrected A98 RGB to linear-light coordinates.
pub(crate) fn a98_to_linear(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        value.abs().powf(A98_GAMMA).copysign(value)
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

/// Convert linear-light A98 RGB to gamma-corrected coordinates.
pub(crate) fn linear_to_a98(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        value.abs().powf(A98_GAMMA.recip()).copysign(value)
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const LINEAR_A98RGB_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.5766690429101305,  0.1855582379065463, 0.1882286462349947 ],
    [ 0.29734497525053605, 0.6273635662554661, 0.07529145849399788 ],
    [ 0.02703136138641234, 0.07068885253582723, 0.9913375368376388 ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const XYZ_TO_LINEAR_A98RGB: [[Float; 3]; 3] = [
    [  2.0415879038107465, -0.5650069742788596,  -0.34473135077832406 ],
    [ -0.9692436362808795,  1.8759675015077202,   0.04155505740717557 ],
    [  0.013444280632031142, -0.11836239223101838, 1.0151749943912054 ],
];

// --------------------------------------------------------------------------------------------------------------------
// ProPhoto RGB. Native D50 white point; bridges straight to xyz-d50. Gamma
// 1.8 with a short linear toe near black.
// https://github.com/color-js/color.js/blob/main/src/spaces/prophoto-linear.js

const PROPHOTO_ET2: Float = 16.0 / 512.0;
const PROPHOTO_ET: Float = 1.0 / 512.0;
const PROPHOTO_GAMMA: Float = 1.8;

/// Convert gamma-corrected ProPhoto RGB to linear-light coordinates.
pub(crate) fn prophoto_to_linear(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        let magnitude = value.abs();
        if magnitude <= PROPHOTO_ET2 {
            value / 16.0
        } else {
            magnitude.powf(PROPHOTO_GAMMA).copysign(value)
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

/// Convert linear-light ProPhoto RGB to gamma-corrected coordinates.
pub(crate) fn linear_to_prophoto(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        let magnitude = value.abs();
        if magnitude <= PROPHOTO_ET {
            value * 16.0
        } else {
            magnitude.powf(PROPHOTO_GAMMA.recip()).copysign(value)
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const LINEAR_PROPHOTO_TO_XYZ_D50: [[Float; 3]; 3] = [
    [ 0.7977604896723027,  0.13518583717574031, 0.0313493495815248   ],
    [ 0.2880711282292934,  0.7118432178101014,  0.00008565396060525902 ],
    [ 0.0,                 0.0,                 0.8251046025104601   ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const XYZ_D50_TO_LINEAR_PROPHOTO: [[Float; 3]; 3] = [
    [  1.3457989731028281, -0.25558010007997534, -0.05110628506753401 ],
    [ -0.5446224939028347,  1.5082327413132781,   0.02053603239147973 ],
    [  0.0,                 0.0,                  1.2119675456389454  ],
];

// --------------------------------------------------------------------------------------------------------------------
// Oklab. https://github.com/color-js/color.js/blob/main/src/spaces/oklab.js

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const OKLAB_TO_OKLMS: [[Float; 3]; 3] = [
    [ 1.0000000000000000,  0.3963377773761749,  0.2158037573099136 ],
    [ 1.0000000000000000, -0.1055613458156586, -0.0638541728258133 ],
    [ 1.0000000000000000, -0.0894841775298119, -1.2914855480194092 ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const OKLMS_TO_XYZ: [[Float; 3]; 3] = [
    [  1.2268798758459243, -0.5578149944602171,  0.2813910456659647 ],
    [ -0.0405757452148008,  1.1122868032803170, -0.0717110580655164 ],
    [ -0.0763729366746601, -0.4214933324022432,  1.5869240198367816 ],
];

/// Convert Oklab to XYZ (D65).
pub(crate) fn oklab_to_xyz(value: &[Float; 3]) -> [Float; 3] {
    let [l, m, s] = multiply(&OKLAB_TO_OKLMS, value);
    multiply(&OKLMS_TO_XYZ, &[l.powi(3), m.powi(3), s.powi(3)])
}

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const XYZ_TO_OKLMS: [[Float; 3]; 3] = [
    [ 0.8190224379967030, 0.3619062600528904, -0.1288737815209879 ],
    [ 0.0329836539323885, 0.9292868615863434,  0.0361446663506424 ],
    [ 0.0481771893596242, 0.2642395317527308,  0.6335478284694309 ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const OKLMS_TO_OKLAB: [[Float; 3]; 3] = [
    [ 0.2104542683093140,  0.7936177747023054, -0.0040720430116193 ],
    [ 1.9779985324311684, -2.4285922420485799,  0.4505937096174110 ],
    [ 0.0259040424655478,  0.7827717124575296, -0.8086757549230774 ],
];

/// Convert XYZ (D65) to Oklab.
pub(crate) fn xyz_to_oklab(value: &[Float; 3]) -> [Float; 3] {
    let [l, m, s] = multiply(&XYZ_TO_OKLMS, value);
    multiply(&OKLMS_TO_OKLAB, &[l.cbrt(), m.cbrt(), s.cbrt()])
}

// --------------------------------------------------------------------------------------------------------------------
// Bradford chromatic adaptation between the D65 and D50 white points.
// https://github.com/color-js/color.js/blob/main/src/adapt.js

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const D65_TO_D50: [[Float; 3]; 3] = [
    [  1.0479297925449969,   0.022946870601609652, -0.05019226628920524  ],
    [  0.02962780877005599,  0.9904344267538799,   -0.017073799063418826 ],
    [ -0.009243040646204504, 0.015055191490298152,  0.7518742814281371   ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
pub(crate) const D50_TO_D65: [[Float; 3]; 3] = [
    [  0.955473421488075,    -0.02309845494876471,  0.06325924320057072  ],
    [ -0.0283697093338637,    1.0099953980813041,   0.021041441191917323 ],
    [  0.012314014864481998, -0.020507649298898964, 1.330365926242124    ],
];

/// Convert XYZ D65 to XYZ D50 using the (linear) Bradford method.
pub(crate) fn d65_to_d50(value: &[Float; 3]) -> [Float; 3] {
    multiply(&D65_TO_D50, value)
}

/// Convert XYZ D50 to XYZ D65 using the (linear) Bradford method.
pub(crate) fn d50_to_d65(value: &[Float; 3]) -> [Float; 3] {
    multiply(&D50_TO_D65, value)
}

// --------------------------------------------------------------------------------------------------------------------
// CIE Lab, D50-referenced (as `lab`'s declared bridge `xyz-d50` requires).
// https://en.wikipedia.org/wiki/CIELAB_color_space

const LAB_DELTA: Float = 6.0 / 29.0;
const D50_WHITE: [Float; 3] = [0.9642956764295678, 1.0, 0.8251046025104604];

/// Convert XYZ D50 to CIE Lab.
pub(crate) fn xyz_d50_to_lab(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn f(t: Float) -> Float {
        if t > LAB_DELTA.powi(3) {
            t.cbrt()
        } else {
            t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
        }
    }

    let [x, y, z] = [
        value[0] / D50_WHITE[0],
        value[1] / D50_WHITE[1],
        value[2] / D50_WHITE[2],
    ]
    .map(f);

    [116.0 * y - 16.0, 500.0 * (x - y), 200.0 * (y - z)]
}

/// Convert CIE Lab to XYZ D50.
pub(crate) fn lab_to_xyz_d50(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn f_inv(t: Float) -> Float {
        if t > LAB_DELTA {
            t.powi(3)
        } else {
            3.0 * LAB_DELTA * LAB_DELTA * (t - 4.0 / 29.0)
        }
    }

    let [l, a, b] = *value;
    let fy = (l + 16.0) / 116.0;
    let [x, y, z] = [fy + a / 500.0, fy, fy - b / 200.0].map(f_inv);

    [x * D50_WHITE[0], y * D50_WHITE[1], z * D50_WHITE[2]]
}

// --------------------------------------------------------------------------------------------------------------------
// Generic polar <-> rectangular conversion shared by Lab/LCH and Oklab/Oklch.

const POLAR_EPSILON: Float = 0.0002;

/// Convert rectangular (L, a, b) coordinates to polar (L, C, H) coordinates.
#[allow(non_snake_case)]
pub(crate) fn rectangular_to_polar(value: &[Float; 3]) -> [Float; 3] {
    let [L, a, b] = *value;

    let a_m = a.abs();
    if a_m < POLAR_EPSILON && b.abs() < POLAR_EPSILON {
        return [L, 0.0, Float::NAN];
    }

    let C = if a_m < b { b.hypot(a_m) } else { a_m.hypot(b) };
    let h = b.atan2(a).to_degrees();
    let h = if h.is_sign_negative() { h + 360.0 } else { h };

    [L, C, h]
}

/// Convert polar (L, C, H) coordinates to rectangular (L, a, b) coordinates.
#[allow(non_snake_case)]
pub(crate) fn polar_to_rectangular(value: &[Float; 3]) -> [Float; 3] {
    let [L, C, h] = *value;

    if h.is_nan() {
        [L, 0.0, 0.0]
    } else {
        let hue_radian = h.to_radians();
        [L, C * hue_radian.cos(), C * hue_radian.sin()]
    }
}

// --------------------------------------------------------------------------------------------------------------------
// HSL / HWB, both bridging to `rgb`.
// https://drafts.csswg.org/css-color-4/#hsl-to-rgb
// https://drafts.csswg.org/css-color-4/#rgb-to-hwb

fn rgb_to_hue_min_max(value: &[Float; 3]) -> (Float, Float, Float) {
    let [r, g, b] = *value;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta != 0.0 {
        60.0 * if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        }
    } else {
        Float::NAN
    };

    (hue, min, max)
}

/// Convert sRGB (each component in `0..=1`) to HSL (`h` in degrees, `s`/`l`
/// fractions in `0..=1`).
pub(crate) fn rgb_to_hsl(value: &[Float; 3]) -> [Float; 3] {
    let (hue, min, max) = rgb_to_hue_min_max(value);
    let lightness = (min + max) / 2.0;
    let delta = max - min;

    let saturation = if delta != 0.0 {
        if lightness == 0.0 || lightness == 1.0 {
            0.0
        } else {
            (max - lightness) / lightness.min(1.0 - lightness)
        }
    } else {
        0.0
    };

    [hue, saturation, lightness]
}

/// Convert HSL (`h` in degrees, `s`/`l` fractions in `0..=1`) to sRGB.
pub(crate) fn hsl_to_rgb(value: &[Float; 3]) -> [Float; 3] {
    let [h, s, l] = *value;
    let saturation = if s.is_nan() { 0.0 } else { s };
    let lightness = if l.is_nan() { 0.0 } else { l };

    if saturation <= 0.0 {
        return [lightness, lightness, lightness];
    }

    let hue = if h.is_nan() { 0.0 } else { h.rem_euclid(360.0) };

    let f = |n: Float| -> Float {
        let k = (n + hue / 30.0) % 12.0;
        let a = saturation * lightness.min(1.0 - lightness);
        lightness - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };

    [f(0.0), f(8.0), f(4.0)]
}

/// Convert sRGB to HWB (`h` in degrees, `w`/`b` fractions in `0..=1`).
pub(crate) fn rgb_to_hwb(value: &[Float; 3]) -> [Float; 3] {
    let (hue, min, max) = rgb_to_hue_min_max(value);
    [hue, min, 1.0 - max]
}

/// Convert HWB to sRGB.
pub(crate) fn hwb_to_rgb(value: &[Float; 3]) -> [Float; 3] {
    let [h, w, b] = *value;

    if w + b >= 1.0 {
        let gray = w / (w + b);
        return [gray, gray, gray];
    }

    let [r, g, bl] = hsl_to_rgb(&[h, 1.0, 0.5]);
    [
        r * (1.0 - w - b) + w,
        g * (1.0 - w - b) + w,
        bl * (1.0 - w - b) + w,
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(actual: &[Float; 3], expected: &[Float; 3]) {
        for i in 0..3 {
            let a = actual[i];
            let e = expected[i];
            if e.is_nan() {
                assert!(a.is_nan(), "component {i}: expected NaN, got {a}");
            } else {
                assert!(
                    (a - e).abs() < 1e-4,
                    "component {i}: expected {e}, got {a}"
                );
            }
        }
    }

    #[test]
    fn srgb_gamma_round_trips() {
        let srgb = [0.8235294, 0.4117647, 0.1176471];
        let linear = srgb_to_linear(&srgb);
        assert_close(&linear, &[0.6444797, 0.1412633, 0.0129830]);
        assert_close(&linear_to_srgb(&linear), &srgb);
    }

    #[test]
    fn rgb_hsl_hwb_round_trip() {
        let srgb = [0.8235294, 0.4117647, 0.1176471];
        let hsl = rgb_to_hsl(&srgb);
        assert_close(&hsl, &[25.0, 0.75, 0.47058824]);
        assert_close(&hsl_to_rgb(&hsl), &srgb);

        let hwb = rgb_to_hwb(&srgb);
        assert_close(&hwb, &[25.0, 0.11764706, 0.17647059]);
        assert_close(&hwb_to_rgb(&hwb), &srgb);
    }

    #[test]
    fn lab_xyz_round_trip() {
        let xyz_d50 = [0.33730087, 0.24544919, 0.03195887];
        let lab = xyz_d50_to_lab(&xyz_d50);
        assert_close(&lab, &[56.62930022, 39.23708020, 57.55376917]);
        assert_close(&lab_to_xyz_d50(&lab), &xyz_d50);
    }

    #[test]
    fn oklab_polar_round_trip() {
        let oklab = [0.63439842, 0.09907391, 0.11919316];
        let oklch = rectangular_to_polar(&oklab);
        assert_close(&oklch, &[0.63439842, 0.15499242, 50.26648308]);
        assert_close(&polar_to_rectangular(&oklch), &oklab);
    }
}

use fixed::types::{I26F6, I2F14};

/// 32-bit signed fixed number with the low 6 bits representing fraction.
///
/// All pixel-space coordinates and distances inside the virtual machine are
/// 26.6 values; one pixel is 64 units.
pub type F26Dot6 = I26F6;

/// 16-bit signed fixed number with the low 14 bits representing fraction.
///
/// Used for the components of the freedom, projection and dual-projection
/// vectors, and for the scale entries of composite glyph components.
pub type F2Dot14 = I2F14;

/// Rounded integer division, half away from zero.
///
/// The divisor must be nonzero.
pub(crate) fn div_round(n: i64, d: i64) -> i64 {
    let q = (n.abs() + d.abs() / 2) / d.abs();
    if (n < 0) != (d < 0) {
        -q
    } else {
        q
    }
}

/// 26.6 multiplication with the 64-divide performed after the full-width
/// multiply, rounded to nearest.
pub(crate) fn fixed_mul(a: F26Dot6, b: F26Dot6) -> F26Dot6 {
    let product = a.to_bits() as i64 * b.to_bits() as i64;
    F26Dot6::from_bits(div_round(product, 64) as i32)
}

/// 26.6 division, rounded to nearest.
pub(crate) fn fixed_div(a: F26Dot6, b: F26Dot6) -> F26Dot6 {
    let n = (a.to_bits() as i64) << 6;
    F26Dot6::from_bits(div_round(n, b.to_bits() as i64) as i32)
}

/// 26.6 division with the quotient truncated toward zero. This is the
/// semantics of the DIV instruction; everything else divides rounded.
pub(crate) fn fixed_div_unrounded(a: F26Dot6, b: F26Dot6) -> F26Dot6 {
    let n = (a.to_bits() as i64) << 6;
    F26Dot6::from_bits((n / b.to_bits() as i64) as i32)
}

/// Rounded division of a 26.6 value by a plain integer.
pub(crate) fn fixed_div_by_int(a: F26Dot6, d: i32) -> F26Dot6 {
    F26Dot6::from_bits(div_round(a.to_bits() as i64, d as i64) as i32)
}

/// 26.6 × 2.14 → 26.6, rounded to nearest.
pub(crate) fn mul_f2dot14(a: F26Dot6, v: F2Dot14) -> F26Dot6 {
    let product = a.to_bits() as i64 * v.to_bits() as i64;
    F26Dot6::from_bits(div_round(product, 1 << 14) as i32)
}

/// 26.6 ÷ 2.14 → 26.6, rounded to nearest. The divisor must be nonzero.
pub(crate) fn div_f2dot14(a: F26Dot6, v: F2Dot14) -> F26Dot6 {
    let n = (a.to_bits() as i64) << 14;
    F26Dot6::from_bits(div_round(n, v.to_bits() as i64) as i32)
}

/// 2.14 × 2.14 → 2.14, rounded to nearest.
pub(crate) fn mul_2dot14(a: F2Dot14, b: F2Dot14) -> F2Dot14 {
    let product = a.to_bits() as i32 * b.to_bits() as i32;
    F2Dot14::from_bits(div_round(product as i64, 1 << 14) as i16)
}

/// ⌊n + ½⌋ at 26.6 granularity. Floors rather than truncating, so negative
/// values round the same way positive ones do on the number line.
pub(crate) fn round_nearest(a: F26Dot6) -> F26Dot6 {
    F26Dot6::from_bits(a.to_bits().wrapping_add(32) & !0x3F)
}

#[cfg(test)]
mod test {
    use super::*;

    fn px(v: f64) -> F26Dot6 {
        F26Dot6::from_num(v)
    }

    #[test]
    fn addition_is_exact() {
        let values = [-100.5, -0.25, 0.0, 0.015625, 1.0, 37.75];
        for &a in &values {
            for &b in &values {
                assert_eq!((px(a) + px(b)) - px(b), px(a));
            }
        }
    }

    #[test]
    fn multiplication_rounds_to_nearest() {
        assert_eq!(fixed_mul(px(1.5), px(2.0)), px(3.0));
        assert_eq!(fixed_mul(px(-1.5), px(2.0)), px(-3.0));
        // 3/64 * 1/2 = 1.5/64, rounds away from zero
        assert_eq!(fixed_mul(F26Dot6::from_bits(3), px(0.5)).to_bits(), 2);
        assert_eq!(fixed_mul(F26Dot6::from_bits(-3), px(0.5)).to_bits(), -2);
    }

    #[test]
    fn division_rounds_to_nearest() {
        assert_eq!(fixed_div(px(1.0), px(3.0)).to_bits(), 21);
        assert_eq!(fixed_div(px(-1.0), px(3.0)).to_bits(), -21);
        assert_eq!(fixed_div(px(2.0), px(3.0)).to_bits(), 43);
    }

    #[test]
    fn unrounded_division_truncates_toward_zero() {
        assert_eq!(fixed_div_unrounded(px(2.0), px(3.0)).to_bits(), 42);
        assert_eq!(fixed_div_unrounded(px(-2.0), px(3.0)).to_bits(), -42);
    }

    #[test]
    fn f2dot14_multiply() {
        let half = F2Dot14::from_num(0.5);
        assert_eq!(mul_f2dot14(px(3.0), half), px(1.5));
        assert_eq!(mul_f2dot14(px(-3.0), half), px(-1.5));
        assert_eq!(mul_f2dot14(px(10.0), F2Dot14::from_num(1)), px(10.0));
    }

    #[test]
    fn round_nearest_floors_the_half_bias() {
        assert_eq!(round_nearest(px(0.5)), px(1.0));
        assert_eq!(round_nearest(px(0.4)), px(0.0));
        assert_eq!(round_nearest(px(-0.5)), px(0.0));
        assert_eq!(round_nearest(px(-0.6)), px(-1.0));
        assert_eq!(round_nearest(px(-1.5)), px(-1.0));
    }
}

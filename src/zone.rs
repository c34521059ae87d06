use crate::{
    data_types::{fixed_div, fixed_mul, F26Dot6},
    error::HintingErrorKind,
};

/// A pool of control points. Zone 0 holds scratch points with no outline
/// behind them; zone 1 holds the glyph's points plus the four phantoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Twilight,
    Glyph,
}

impl Zone {
    pub(crate) fn from_i32(value: i32) -> Result<Self, HintingErrorKind> {
        match value {
            0 => Ok(Zone::Twilight),
            1 => Ok(Zone::Glyph),
            _ => Err(HintingErrorKind::InvalidZonePointer { value }),
        }
    }

    pub(crate) fn number(self) -> u8 {
        match self {
            Zone::Twilight => 0,
            Zone::Glyph => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Axis {
    X,
    Y,
}

/// One control point as the interpreter sees it: the scaled, pre-hinted
/// position and the running hinted position, with per-axis touch flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFittedPoint {
    pub original_x: F26Dot6,
    pub original_y: F26Dot6,
    pub current_x: F26Dot6,
    pub current_y: F26Dot6,
    pub on_curve: bool,
    pub touched_x: bool,
    pub touched_y: bool,
    pub last_in_contour: bool,
}

impl GridFittedPoint {
    /// An untouched point with current and original coincident.
    pub(crate) fn at(x: F26Dot6, y: F26Dot6, on_curve: bool) -> Self {
        Self {
            original_x: x,
            original_y: y,
            current_x: x,
            current_y: y,
            on_curve,
            touched_x: false,
            touched_y: false,
            last_in_contour: false,
        }
    }

    /// The shape every twilight point starts the program with.
    pub(crate) fn twilight_default() -> Self {
        Self {
            last_in_contour: true,
            ..Self::at(F26Dot6::ZERO, F26Dot6::ZERO, true)
        }
    }

    fn original(&self, axis: Axis) -> F26Dot6 {
        match axis {
            Axis::X => self.original_x,
            Axis::Y => self.original_y,
        }
    }

    fn current(&self, axis: Axis) -> F26Dot6 {
        match axis {
            Axis::X => self.current_x,
            Axis::Y => self.current_y,
        }
    }

    fn set_current(&mut self, axis: Axis, value: F26Dot6) {
        match axis {
            Axis::X => self.current_x = value,
            Axis::Y => self.current_y = value,
        }
    }

    fn touched(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.touched_x,
            Axis::Y => self.touched_y,
        }
    }
}

/// Interpolates the untouched points of every contour along one axis.
///
/// Each contour is walked circularly between consecutive touched points.
/// An untouched point whose original coordinate lies outside the touched
/// pair's original span shifts rigidly with the nearer end; one inside the
/// span keeps its original ratio between the two. A contour with a single
/// touched point shifts as a whole; a contour with none is left alone.
///
/// The slice must not include the phantom points.
pub(crate) fn interpolate_untouched(points: &mut [GridFittedPoint], axis: Axis) {
    let mut contour_start = 0;
    while contour_start < points.len() {
        let mut contour_end = contour_start;
        while !points[contour_end].last_in_contour {
            contour_end += 1;
        }

        let mut first_touched = contour_start;
        while first_touched <= contour_end && !points[first_touched].touched(axis) {
            first_touched += 1;
        }

        if first_touched <= contour_end {
            let mut first = first_touched;
            loop {
                // next touched point after `first`, wrapping to the one the
                // walk started at
                let mut second = first;
                loop {
                    second += 1;
                    if second > contour_end {
                        second = first_touched;
                        break;
                    }
                    if points[second].touched(axis) {
                        break;
                    }
                }

                let adjacent = first + 1 == second
                    || (first == contour_end && second == contour_start);
                if !adjacent {
                    interpolate_span(points, contour_start, contour_end, first, second, axis);
                }

                first = second;
                if first == first_touched {
                    break;
                }
            }
        }

        contour_start = contour_end + 1;
    }
}

fn interpolate_span(
    points: &mut [GridFittedPoint],
    contour_start: usize,
    contour_end: usize,
    first: usize,
    second: usize,
    axis: Axis,
) {
    let (lowest, highest) = if points[first].original(axis) <= points[second].original(axis) {
        (first, second)
    } else {
        (second, first)
    };

    let low_original = points[lowest].original(axis);
    let high_original = points[highest].original(axis);
    let low_shift = points[lowest].current(axis) - low_original;
    let high_shift = points[highest].current(axis) - high_original;
    let divisor = high_original - low_original;

    let mut k = if first == contour_end {
        contour_start
    } else {
        first + 1
    };
    while k != second {
        let original = points[k].original(axis);
        let moved = if original <= low_original {
            original + low_shift
        } else if original >= high_original {
            original + high_shift
        } else {
            original
                + fixed_div(
                    fixed_mul(low_shift, high_original - original)
                        + fixed_mul(high_shift, original - low_original),
                    divisor,
                )
        };
        points[k].set_current(axis, moved);

        k = if k == contour_end { contour_start } else { k + 1 };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn px(v: f64) -> F26Dot6 {
        F26Dot6::from_num(v)
    }

    fn contour(xs: &[f64]) -> Vec<GridFittedPoint> {
        let mut points: Vec<GridFittedPoint> = xs
            .iter()
            .map(|&x| GridFittedPoint::at(px(x), px(0.0), true))
            .collect();
        points.last_mut().unwrap().last_in_contour = true;
        points
    }

    fn touch_x(point: &mut GridFittedPoint, shift: f64) {
        point.current_x += px(shift);
        point.touched_x = true;
    }

    #[test]
    fn linear_interpolation_between_touched_pair() {
        let mut points = contour(&[0.0, 10.0, 20.0]);
        touch_x(&mut points[0], 4.0);
        touch_x(&mut points[2], 8.0);

        interpolate_untouched(&mut points, Axis::X);

        // 10 + (4·(20−10) + 8·(10−0)) / 20
        assert_eq!(points[1].current_x, px(16.0));
        assert!(!points[1].touched_x);
    }

    #[test]
    fn points_outside_the_span_shift_rigidly() {
        let mut points = contour(&[5.0, 0.0, 20.0, 30.0]);
        touch_x(&mut points[1], 1.0);
        touch_x(&mut points[2], 3.0);

        interpolate_untouched(&mut points, Axis::X);

        // between the touched originals: interpolated
        assert_eq!(points[0].current_x, px(5.0) + px(1.5));
        // beyond the high end: rigid shift with the high point
        assert_eq!(points[3].current_x, px(33.0));
    }

    #[test]
    fn single_touched_point_shifts_the_contour() {
        let mut points = contour(&[0.0, 7.0, 13.0]);
        touch_x(&mut points[1], 2.0);

        interpolate_untouched(&mut points, Axis::X);

        assert_eq!(points[0].current_x, px(2.0));
        assert_eq!(points[2].current_x, px(15.0));
    }

    #[test]
    fn untouched_contour_is_left_alone() {
        let mut points = contour(&[0.0, 7.0, 13.0]);
        let before = points.clone();
        interpolate_untouched(&mut points, Axis::X);
        assert_eq!(points, before);
    }

    #[test]
    fn contours_are_independent() {
        let mut points = contour(&[0.0, 10.0, 20.0]);
        points.extend(contour(&[0.0, 10.0]));
        touch_x(&mut points[0], 4.0);
        touch_x(&mut points[2], 8.0);

        interpolate_untouched(&mut points, Axis::X);

        assert_eq!(points[1].current_x, px(16.0));
        // second contour has no touched points
        assert_eq!(points[3].current_x, px(0.0));
        assert_eq!(points[4].current_x, px(10.0));
    }

    #[test]
    fn axes_do_not_interfere() {
        let mut points = contour(&[0.0, 10.0, 20.0]);
        for p in points.iter_mut() {
            p.original_y = p.original_x;
            p.current_y = p.current_x;
        }
        touch_x(&mut points[0], 4.0);
        touch_x(&mut points[2], 8.0);

        interpolate_untouched(&mut points, Axis::Y);

        // only x was touched; a y pass moves nothing
        assert_eq!(points[1].current_y, px(10.0));
        assert_eq!(points[1].current_x, px(10.0));
    }

    #[test]
    fn wrapping_span_interpolates_across_the_contour_seam() {
        // touched pair 2 → 0 (wrapping through 3)
        let mut points = contour(&[0.0, 5.0, 10.0, 15.0]);
        touch_x(&mut points[0], 2.0);
        touch_x(&mut points[2], 2.0);

        interpolate_untouched(&mut points, Axis::X);

        // both spans see the same rigid +2 shift
        assert_eq!(points[1].current_x, px(7.0));
        assert_eq!(points[3].current_x, px(17.0));
    }
}

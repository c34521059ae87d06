use crate::{
    data_types::{mul_f2dot14, F26Dot6, F2Dot14},
    error::HintingErrorKind,
    zone::Zone,
};

/// Instruction-control bit: glyph programs are not executed at all; points
/// keep their scaled original positions.
pub const INHIBIT_GRID_FITTING: u32 = 0x01;
/// Instruction-control bit: glyph programs start from the initial graphics
/// state instead of the state captured after the CVT program.
pub const RESET_STATE: u32 = 0x02;

/// A unit vector; x² + y² = 1 as closely as 2.14 components allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub x: F2Dot14,
    pub y: F2Dot14,
}

impl Vector {
    pub fn x_axis() -> Self {
        Self {
            x: F2Dot14::ONE,
            y: F2Dot14::ZERO,
        }
    }

    pub fn y_axis() -> Self {
        Self {
            x: F2Dot14::ZERO,
            y: F2Dot14::ONE,
        }
    }

    /// Normalizes (x, y) and stores it. The scale of the input does not
    /// matter, only its direction; (0, 0) has none and is rejected.
    pub fn from_components(x: f64, y: f64) -> Result<Self, HintingErrorKind> {
        let length = (x * x + y * y).sqrt();
        if length == 0.0 {
            return Err(HintingErrorKind::InvalidVector);
        }
        Ok(Self {
            x: F2Dot14::from_num(x / length),
            y: F2Dot14::from_num(y / length),
        })
    }

    /// The coordinate of (x, y) along this vector, in 26.6.
    pub fn project(&self, x: F26Dot6, y: F26Dot6) -> F26Dot6 {
        mul_f2dot14(x, self.x) + mul_f2dot14(y, self.y)
    }

    /// Combines a per-axis pair into a single magnitude along this vector:
    /// √((x·a)² + (y·b)²). Used to project the pixel-per-em pair.
    pub fn weighted_magnitude(&self, a: f64, b: f64) -> f64 {
        let x: f64 = self.x.to_num();
        let y: f64 = self.y.to_num();
        ((x * a) * (x * a) + (y * b) * (y * b)).sqrt()
    }
}

/// The round state: a period, a phase offset within the period, and the
/// threshold above which a value moves to the next period boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    pub period: F26Dot6,
    pub phase: F26Dot6,
    pub threshold: F26Dot6,
}

impl RoundState {
    pub fn to_grid() -> Self {
        Self {
            period: F26Dot6::ONE,
            phase: F26Dot6::ZERO,
            threshold: F26Dot6::from_bits(32),
        }
    }

    pub fn to_half_grid() -> Self {
        Self {
            period: F26Dot6::ONE,
            phase: F26Dot6::from_bits(32),
            threshold: F26Dot6::from_bits(32),
        }
    }

    pub fn to_double_grid() -> Self {
        Self {
            period: F26Dot6::from_bits(32),
            phase: F26Dot6::ZERO,
            threshold: F26Dot6::from_bits(16),
        }
    }

    pub fn down_to_grid() -> Self {
        Self {
            period: F26Dot6::ONE,
            phase: F26Dot6::ZERO,
            threshold: F26Dot6::ZERO,
        }
    }

    pub fn up_to_grid() -> Self {
        Self {
            period: F26Dot6::ONE,
            phase: F26Dot6::ZERO,
            threshold: F26Dot6::from_bits(63),
        }
    }

    pub fn off() -> Self {
        Self {
            period: F26Dot6::from_bits(1),
            phase: F26Dot6::ZERO,
            threshold: F26Dot6::ZERO,
        }
    }

    /// Maps a signed distance onto the grid this state describes.
    ///
    /// The sign is stripped first and restored last, and a value that was
    /// nonzero before rounding is pushed up until the result is
    /// non-negative. Shipped fonts depend on this exact handling of
    /// negative values; do not simplify it.
    pub fn round(&self, n: F26Dot6) -> F26Dot6 {
        let negative = n < 0;
        let n = if negative { -n } else { n };

        let period = self.period.to_bits();
        let mut i = (n - self.phase + self.threshold).to_bits();

        // i may be negative, and truncating division would round the wrong
        // way there.
        let mut period_correction = 0;
        while i < 0 {
            i += period;
            period_correction += 1;
        }

        let mut rounded =
            F26Dot6::from_bits((i / period - period_correction) * period) + self.phase;
        if n != 0 {
            while rounded < 0 {
                rounded += self.period;
            }
        }

        if negative {
            -rounded
        } else {
            rounded
        }
    }
}

/// The mutable context every point-manipulation instruction consults.
///
/// `reset(true)` produces the state the font and CVT programs start from.
/// The CVT program's final state, after a `reset(false)`, is captured as the
/// default that every glyph program starts from; the partial reset restores
/// the per-glyph fields (vectors, loop, round state, reference points, zone
/// pointers) while letting the CVT program's choices for the rest stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsState {
    /// Whether MIRP flips the sign of a control value to match the sign of
    /// the measured distance.
    pub auto_flip: bool,

    /// Control values closer than this to the measured distance snap to the
    /// control value.
    pub control_value_cut_in: F26Dot6,

    /// First pixel-per-em targeted by the delta instructions.
    pub delta_base: u32,

    /// Delta magnitudes move in steps of 2^-delta_shift pixels.
    pub delta_shift: u32,

    /// Measurement direction for original, pre-hinted positions.
    pub dual_projection_vector: Vector,

    /// Direction along which points move.
    pub freedom_vector: Vector,

    /// Direction along which distances are measured.
    pub projection_vector: Vector,

    pub instruction_control: u32,

    /// Repeat count consumed by the loop-driven instructions, which reset
    /// it to 1 afterwards.
    pub loop_counter: i32,

    /// Floor applied to MDRP/MIRP distances.
    pub minimum_distance: F26Dot6,

    pub round_state: RoundState,

    /// The three reference point indices.
    pub rp: [i32; 3],

    /// The three zone pointers.
    pub zp: [Zone; 3],

    /// Distances closer than this to the single width snap to the single
    /// width value.
    pub single_width_cut_in: F26Dot6,

    pub single_width_value: F26Dot6,
}

impl GraphicsState {
    /// Restores defaults. The fields that the CVT program is allowed to
    /// configure for all glyph programs are only restored on the full
    /// (`initially`) reset.
    pub fn reset(&mut self, initially: bool) {
        if initially {
            self.auto_flip = true;
            self.delta_base = 9;
            self.delta_shift = 3;
            self.instruction_control = 0;
            self.minimum_distance = F26Dot6::ONE;
            self.control_value_cut_in = F26Dot6::from_bits(68); // 17/16 px
            self.single_width_cut_in = F26Dot6::ZERO;
            self.single_width_value = F26Dot6::ZERO;
        }

        self.freedom_vector = Vector::x_axis();
        self.projection_vector = self.freedom_vector;
        self.dual_projection_vector = self.projection_vector;

        self.loop_counter = 1;
        self.round_state = RoundState::to_grid();

        self.rp = [0; 3];
        self.zp = [Zone::Glyph; 3];
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            auto_flip: true,
            control_value_cut_in: F26Dot6::from_bits(68),
            delta_base: 9,
            delta_shift: 3,
            dual_projection_vector: Vector::x_axis(),
            freedom_vector: Vector::x_axis(),
            projection_vector: Vector::x_axis(),
            instruction_control: 0,
            loop_counter: 1,
            minimum_distance: F26Dot6::ONE,
            round_state: RoundState::to_grid(),
            rp: [0; 3],
            zp: [Zone::Glyph; 3],
            single_width_cut_in: F26Dot6::ZERO,
            single_width_value: F26Dot6::ZERO,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn px(v: f64) -> F26Dot6 {
        F26Dot6::from_num(v)
    }

    #[test]
    fn vectors_are_normalized() {
        let v = Vector::from_components(3.0, 4.0).unwrap();
        assert_eq!(v.x, F2Dot14::from_num(0.6));
        assert_eq!(v.y, F2Dot14::from_num(0.8));

        let x: f64 = v.x.to_num();
        let y: f64 = v.y.to_num();
        let norm = x * x + y * y;
        assert!((norm - 1.0).abs() <= 1.0 / 8192.0, "norm {norm}");
    }

    #[test]
    fn zero_vector_is_rejected() {
        assert_eq!(
            Vector::from_components(0.0, 0.0),
            Err(HintingErrorKind::InvalidVector)
        );
    }

    #[test]
    fn axis_projection_is_identity() {
        let p = (px(3.25), px(-7.5));
        assert_eq!(Vector::x_axis().project(p.0, p.1), p.0);
        assert_eq!(Vector::y_axis().project(p.0, p.1), p.1);
    }

    #[test]
    fn weighted_magnitude_on_axes() {
        assert_eq!(Vector::x_axis().weighted_magnitude(20.0, 40.0), 20.0);
        assert_eq!(Vector::y_axis().weighted_magnitude(20.0, 40.0), 40.0);
    }

    #[test]
    fn round_to_grid_matches_floor_plus_half() {
        let state = RoundState::to_grid();
        for bits in 0..256 {
            let n = F26Dot6::from_bits(bits);
            let expected = F26Dot6::from_bits((bits + 32) & !0x3F);
            assert_eq!(state.round(n), expected, "bits {bits}");
        }
    }

    #[test]
    fn round_sanity_values() {
        let grid = RoundState::to_grid();
        assert_eq!(grid.round(px(0.5)), px(1.0));
        assert_eq!(grid.round(px(-0.5)), px(-1.0));

        let custom = RoundState {
            period: px(1.5),
            phase: px(0.5),
            threshold: px(0.75),
        };
        assert_eq!(custom.round(px(2.5)), px(2.0));
    }

    #[test]
    fn round_zero_is_zero_for_phase_free_states() {
        for state in [
            RoundState::to_grid(),
            RoundState::to_double_grid(),
            RoundState::down_to_grid(),
            RoundState::up_to_grid(),
            RoundState::off(),
        ] {
            assert_eq!(state.round(F26Dot6::ZERO), F26Dot6::ZERO);
        }
    }

    #[test]
    fn round_off_is_identity() {
        let state = RoundState::off();
        for bits in [-130, -64, -1, 0, 1, 63, 64, 100] {
            let n = F26Dot6::from_bits(bits);
            assert_eq!(state.round(n), n);
        }
    }

    #[test]
    fn round_down_truncates_magnitude() {
        let state = RoundState::down_to_grid();
        assert_eq!(state.round(px(1.9)), px(1.0));
        // sign is mirrored, so negative values also truncate magnitude
        assert_eq!(state.round(px(-1.9)), px(-1.0));
    }

    #[test]
    fn round_up_catches_any_fraction() {
        let state = RoundState::up_to_grid();
        assert_eq!(state.round(px(1.0)), px(1.0));
        assert_eq!(state.round(F26Dot6::from_bits(65)), px(2.0));
        // a nonzero value never rounds to zero
        assert_eq!(state.round(F26Dot6::from_bits(1)), px(1.0));
    }

    #[test]
    fn glyph_reset_keeps_cvt_program_choices() {
        let mut state = GraphicsState::default();
        state.auto_flip = false;
        state.minimum_distance = px(2.0);
        state.delta_base = 11;
        state.loop_counter = 7;
        state.rp = [3, 4, 5];
        state.zp = [Zone::Twilight; 3];
        state.round_state = RoundState::off();

        state.reset(false);

        assert!(!state.auto_flip);
        assert_eq!(state.minimum_distance, px(2.0));
        assert_eq!(state.delta_base, 11);
        assert_eq!(state.loop_counter, 1);
        assert_eq!(state.rp, [0; 3]);
        assert_eq!(state.zp, [Zone::Glyph; 3]);
        assert_eq!(state.round_state, RoundState::to_grid());
        assert_eq!(state.projection_vector, Vector::x_axis());
    }
}

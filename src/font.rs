use crate::data_types::F2Dot14;

/// Everything the virtual machine needs to know about a font.
///
/// The processor never touches the font container itself; the caller parses
/// the relevant tables and exposes them through this trait. The bytecode
/// accessors return the raw streams, the control-value accessor returns the
/// already-parsed big-endian shorts, and `glyph` returns outlines with
/// absolute coordinates in font units.
pub trait FontDescription {
    fn units_per_em(&self) -> u16;

    /// Size of the persistent storage area, in cells.
    fn max_storage(&self) -> u16;

    /// Declared operand-stack capacity. Exceeding it is reported as a
    /// warning, not an error.
    fn max_stack_elements(&self) -> u16;

    /// Number of scratch points available in the twilight zone.
    fn max_twilight_points(&self) -> u16;

    /// Declared function-definition capacity. Exceeding it is reported as a
    /// warning, not an error.
    fn max_function_defs(&self) -> u16;

    /// Distance from the baseline to the top of the em, in font units. Used
    /// for the upper bearing phantom point.
    fn ascent(&self) -> i16;

    /// Positive distance from the baseline to the bottom of the em, in font
    /// units. Used for the lower bearing phantom point.
    fn descent(&self) -> i16;

    fn font_program(&self) -> Option<&[u8]>;

    fn cvt_program(&self) -> Option<&[u8]>;

    /// The font's control-value table, in font units.
    fn control_values(&self) -> Option<&[i16]>;

    fn glyph(&self, glyph_id: u16) -> Option<Glyph>;
}

#[derive(Debug, Clone)]
pub struct Glyph {
    pub advance_width: u16,
    pub left_side_bearing: i16,
    pub outline: GlyphOutline,
    pub instructions: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum GlyphOutline {
    Simple(Vec<Contour>),
    Composite(Vec<Component>),
}

#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<OutlinePoint>,
}

#[derive(Debug, Clone, Copy)]
pub struct OutlinePoint {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// One component of a composite glyph.
#[derive(Debug, Clone)]
pub struct Component {
    pub glyph_id: u16,
    pub scale: ComponentScale,
    pub anchor: ComponentAnchor,
    /// Round the component's translation to the pixel grid before applying
    /// it.
    pub round_to_grid: bool,
    /// Use this component's phantom points as the composite's metrics.
    pub use_my_metrics: bool,
}

/// 2×2 transform applied to a component's points.
#[derive(Debug, Clone, Copy)]
pub struct ComponentScale {
    pub xx: F2Dot14,
    pub xy: F2Dot14,
    pub yx: F2Dot14,
    pub yy: F2Dot14,
}

impl ComponentScale {
    pub const IDENTITY: ComponentScale = ComponentScale {
        xx: F2Dot14::ONE,
        xy: F2Dot14::ZERO,
        yx: F2Dot14::ZERO,
        yy: F2Dot14::ONE,
    };
}

#[derive(Debug, Clone, Copy)]
pub enum ComponentAnchor {
    /// Translate the component by an offset in font units.
    Offset { x: i16, y: i16 },

    /// Translate the component so that its point `component` coincides with
    /// point `base` of the points loaded so far.
    Points { base: u16, component: u16 },
}

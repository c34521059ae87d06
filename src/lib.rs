//! A virtual machine for the stack-based hinting bytecode embedded in
//! scalable outline fonts.
//!
//! The caller hands the processor a [`FontDescription`], seeds a target
//! resolution with [`HintingProcessor::set_ppem`] (which runs the font and
//! CVT programs), and then grid-fits glyphs one at a time with
//! [`HintingProcessor::glyph_points`]; the result is the glyph's control
//! points snapped to the pixel grid, phantom points included. Everything
//! outside that — parsing the font container, expanding outlines into
//! contours, rasterizing the fitted points — belongs to the caller.

mod data_types;
mod decoder;
mod error;
mod font;
mod graphics_state;
mod instruction;
mod interpreter;
mod zone;

pub use crate::{
    data_types::{F26Dot6, F2Dot14},
    decoder::ProgramKind,
    error::{
        HintingError, HintingErrorKind, HintingResult, InstructionPosition, Warning, WarningKind,
    },
    font::{
        Component, ComponentAnchor, ComponentScale, Contour, FontDescription, Glyph, GlyphOutline,
        OutlinePoint,
    },
    graphics_state::{GraphicsState, RoundState, Vector, INHIBIT_GRID_FITTING, RESET_STATE},
    interpreter::{HintingProcessor, Points, GETINFO_VERSION},
    zone::{GridFittedPoint, Zone},
};

use std::{collections::HashMap, ops::Range, sync::Arc};

use crate::{
    data_types::{
        div_f2dot14, div_round, fixed_div, fixed_div_by_int, fixed_div_unrounded, fixed_mul,
        mul_2dot14, mul_f2dot14, round_nearest, F26Dot6, F2Dot14,
    },
    decoder::{decode, DecodedInstruction, InstructionStream, ProgramKind},
    error::{HintingErrorKind, HintingResult, Warning, WarningKind},
    font::{ComponentAnchor, FontDescription, Glyph, GlyphOutline},
    graphics_state::{GraphicsState, RoundState, Vector, INHIBIT_GRID_FITTING, RESET_STATE},
    instruction::{Instruction, MRP_COLOR, MRP_MIN_DIST, MRP_ROUND, MRP_SET_RP0},
    zone::{interpolate_untouched, Axis, GridFittedPoint, Zone},
};

/// Value answered for the GETINFO version selector.
pub const GETINFO_VERSION: i32 = 37;

/// Instructions one program may execute before it is declared an endless
/// loop.
const MAX_INSTRUCTIONS_PER_PROGRAM: u32 = 100_000;

/// Warnings kept in the sink; everything past this is counted and logged
/// but not stored.
const MAX_STORED_WARNINGS: usize = 64;

const COLOR_WHITE: u8 = 0x02;

/// GETINFO result bit for the greyscale selector.
const GETINFO_GREYSCALE: i32 = 0x1000;

pub type Points = Vec<GridFittedPoint>;

#[derive(Debug, Clone, Copy)]
struct StorageElement {
    value: i32,
    initialized: bool,
}

/// One control value, stored at the scale it was last written at. `value`
/// over `ppem` is what matters: reads re-project the pair onto the current
/// pixel-per-em.
#[derive(Debug, Clone, Copy)]
struct CvtEntry {
    value: i32,
    ppem: i32,
    /// Written by the executing glyph program.
    local: bool,
    /// Read by a glyph program before any write; writing it afterwards is
    /// an error.
    global: bool,
    /// Written during the current glyph execution.
    set: bool,
}

#[derive(Debug, Clone)]
struct FunctionDefinition {
    program: ProgramKind,
    /// Index range of the body in the defining program's decoded
    /// instructions, ENDF included so executing it pops the call stack.
    range: Range<usize>,
}

/// A cursor into one of the decoded streams. While a function executes, the
/// range narrows to the function body, which keeps jumps from escaping it.
#[derive(Debug, Clone)]
struct StreamPosition {
    program: ProgramKind,
    range: Range<usize>,
    index: usize,
}

/// The hinting virtual machine.
///
/// One processor owns all mutable state for one font at one resolution;
/// several processors may run on independent threads, sharing the decoded
/// font and CVT programs by reference (see [`HintingProcessor::from_processor`]).
///
/// The lifecycle is: construct once per font, [`set_ppem`] on every
/// resolution change, then [`glyph_points`] per glyph.
///
/// [`set_ppem`]: HintingProcessor::set_ppem
/// [`glyph_points`]: HintingProcessor::glyph_points
pub struct HintingProcessor<F> {
    font: Arc<F>,
    units_per_em: u32,

    ppem_x: u32,
    ppem_y: u32,
    point_size: u32,

    font_program: Arc<InstructionStream>,
    cvt_program: Arc<InstructionStream>,
    glyph_program: Arc<InstructionStream>,

    functions: HashMap<u32, FunctionDefinition>,
    storage: Vec<StorageElement>,
    cvt: Vec<CvtEntry>,

    default_graphics_state: GraphicsState,
    graphics_state: GraphicsState,

    stack: Vec<i32>,
    points: Points,
    twilight: Points,

    /// `None` while no program is executing.
    state: Option<ProgramKind>,
    current: StreamPosition,
    next: StreamPosition,
    call_stack: Vec<StreamPosition>,

    warnings: Vec<Warning>,
    suppressed_warnings: usize,
}

impl<F: FontDescription> HintingProcessor<F> {
    /// Decodes the font and CVT programs and prepares a processor. No
    /// bytecode runs until the first [`set_ppem`](Self::set_ppem).
    pub fn new(font: F) -> HintingResult<Self> {
        Self::with_streams(Arc::new(font), None, None)
    }

    /// A processor sharing another processor's font description and
    /// already-decoded font and CVT programs. This is the cheap way to hint
    /// the same font from several threads.
    pub fn from_processor(other: &Self) -> Self {
        Self::with_streams(
            Arc::clone(&other.font),
            Some(Arc::clone(&other.font_program)),
            Some(Arc::clone(&other.cvt_program)),
        )
        .expect("streams were already decoded")
    }

    fn with_streams(
        font: Arc<F>,
        font_program: Option<Arc<InstructionStream>>,
        cvt_program: Option<Arc<InstructionStream>>,
    ) -> HintingResult<Self> {
        let font_program = match font_program {
            Some(stream) => stream,
            None => Arc::new(decode(
                ProgramKind::Font,
                font.font_program().unwrap_or(&[]),
            )?),
        };
        let cvt_program = match cvt_program {
            Some(stream) => stream,
            None => Arc::new(decode(
                ProgramKind::ControlValue,
                font.cvt_program().unwrap_or(&[]),
            )?),
        };

        let rest_position = StreamPosition {
            program: ProgramKind::Font,
            range: 0..0,
            index: 0,
        };
        let units_per_em = font.units_per_em() as u32;

        Ok(Self {
            font,
            units_per_em,
            ppem_x: 0,
            ppem_y: 0,
            point_size: 0,
            font_program,
            cvt_program,
            glyph_program: Arc::new(InstructionStream::empty(ProgramKind::Glyph)),
            functions: HashMap::new(),
            storage: Vec::new(),
            cvt: Vec::new(),
            default_graphics_state: GraphicsState::default(),
            graphics_state: GraphicsState::default(),
            stack: Vec::new(),
            points: Points::new(),
            twilight: Points::new(),
            state: None,
            current: rest_position.clone(),
            next: rest_position,
            call_stack: Vec::new(),
            warnings: Vec::new(),
            suppressed_warnings: 0,
        })
    }

    /// Re-seeds all resolution-dependent state and runs the font and CVT
    /// programs. Storage, control values and function definitions do not
    /// survive this call.
    ///
    /// Whatever graphics state the CVT program leaves behind is captured,
    /// after the per-glyph reset, as the default every glyph program starts
    /// from. The capture happens even when the CVT program fails, so a
    /// broken CVT program does not leave glyph programs without a default.
    pub fn set_ppem(&mut self, ppem_x: u32, ppem_y: u32, point_size: u32) -> HintingResult<()> {
        self.ppem_x = ppem_x;
        self.ppem_y = ppem_y;
        self.point_size = point_size;

        self.functions.clear();
        self.storage = vec![
            StorageElement {
                value: 0,
                initialized: false,
            };
            self.font.max_storage() as usize
        ];

        self.execute_program(ProgramKind::Font)?;

        self.cvt = match self.font.control_values() {
            Some(values) => values
                .iter()
                .map(|&value| CvtEntry {
                    value: value as i32,
                    ppem: self.units_per_em as i32,
                    local: false,
                    global: false,
                    set: false,
                })
                .collect(),
            None => Vec::new(),
        };

        let result = self.execute_program(ProgramKind::ControlValue);
        self.graphics_state.reset(false);
        self.default_graphics_state = self.graphics_state;
        result
    }

    /// Loads the glyph's outline into zone 1, runs its program, and returns
    /// the grid-fitted points: the contours in order, followed by the four
    /// phantom points.
    pub fn glyph_points(&mut self, glyph_id: u16) -> HintingResult<Points> {
        let glyph = self
            .font
            .glyph(glyph_id)
            .ok_or(HintingErrorKind::UnknownGlyph { glyph_id })?;

        self.load_glyph(&glyph)?;
        self.execute_program(ProgramKind::Glyph)?;

        Ok(std::mem::take(&mut self.points))
    }

    /// The warnings collected so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// How many warnings were dropped after the sink filled up.
    pub fn suppressed_warnings(&self) -> usize {
        self.suppressed_warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        self.suppressed_warnings = 0;
        std::mem::take(&mut self.warnings)
    }

    /*** Glyph loading ***/

    fn scaled_x(&self, font_units: i32) -> F26Dot6 {
        F26Dot6::from_bits(div_round(
            ((font_units as i64) << 6) * self.ppem_x as i64,
            self.units_per_em as i64,
        ) as i32)
    }

    fn scaled_y(&self, font_units: i32) -> F26Dot6 {
        F26Dot6::from_bits(div_round(
            ((font_units as i64) << 6) * self.ppem_y as i64,
            self.units_per_em as i64,
        ) as i32)
    }

    fn load_glyph(&mut self, glyph: &Glyph) -> HintingResult<()> {
        let mut bearings = Points::with_capacity(4);

        // Point n: left side bearing.
        let mut p = GridFittedPoint::at(F26Dot6::ZERO, F26Dot6::ZERO, true);
        p.last_in_contour = true;
        bearings.push(p);

        // Point n+1: advance width, snapped to the grid.
        let advance = self.scaled_x(glyph.advance_width as i32);
        let mut p = GridFittedPoint::at(advance, F26Dot6::ZERO, true);
        p.current_x = round_nearest(advance);
        p.last_in_contour = true;
        bearings.push(p);

        // Point n+2: upper bearing.
        let ascent = self.scaled_y(self.font.ascent() as i32);
        let mut p = GridFittedPoint::at(F26Dot6::ZERO, ascent, true);
        p.current_y = round_nearest(ascent);
        p.last_in_contour = true;
        bearings.push(p);

        // Point n+3: lower bearing.
        let descent = self.scaled_y(-(self.font.descent() as i32));
        let mut p = GridFittedPoint::at(F26Dot6::ZERO, descent, true);
        p.current_y = round_nearest(descent);
        p.last_in_contour = true;
        bearings.push(p);

        let mut points = match &glyph.outline {
            GlyphOutline::Simple(contours) => {
                // The loader hands us coordinates in outline space; shift
                // them so the bounding box honors the left side bearing.
                let x_min = contours
                    .iter()
                    .flat_map(|contour| contour.points.iter())
                    .map(|point| point.x)
                    .min();
                let displacement = match x_min {
                    Some(x_min) => glyph.left_side_bearing as i32 - x_min as i32,
                    None => 0,
                };

                let mut points = Points::new();
                for contour in contours {
                    let count = contour.points.len();
                    for (i, outline_point) in contour.points.iter().enumerate() {
                        let mut p = GridFittedPoint::at(
                            self.scaled_x(outline_point.x as i32 + displacement),
                            self.scaled_y(outline_point.y as i32),
                            outline_point.on_curve,
                        );
                        p.last_in_contour = i + 1 == count;
                        points.push(p);
                    }
                }
                points
            }
            GlyphOutline::Composite(components) => {
                let mut assembled = Points::new();
                for component in components {
                    // The component is grid-fitted on its own before its
                    // points join the composite.
                    let mut component_points = self.glyph_points(component.glyph_id)?;

                    for cp in component_points.iter_mut() {
                        let x = cp.current_x;
                        let y = cp.current_y;
                        cp.current_x =
                            mul_f2dot14(x, component.scale.xx) + mul_f2dot14(y, component.scale.yx);
                        cp.current_y =
                            mul_f2dot14(x, component.scale.xy) + mul_f2dot14(y, component.scale.yy);
                    }

                    let (mut tx, mut ty) = match component.anchor {
                        ComponentAnchor::Offset { x, y } => {
                            (self.scaled_x(x as i32), self.scaled_y(y as i32))
                        }
                        ComponentAnchor::Points { base, component: attached } => {
                            let base_point = assembled.get(base as usize).ok_or(
                                HintingErrorKind::InvalidPointIndex {
                                    zone: Zone::Glyph.number(),
                                    index: base as i32,
                                },
                            )?;
                            let attached_point = component_points.get(attached as usize).ok_or(
                                HintingErrorKind::InvalidPointIndex {
                                    zone: Zone::Glyph.number(),
                                    index: attached as i32,
                                },
                            )?;
                            (
                                base_point.current_x - attached_point.current_x,
                                base_point.current_y - attached_point.current_y,
                            )
                        }
                    };
                    if component.round_to_grid {
                        tx = round_nearest(tx);
                        ty = round_nearest(ty);
                    }

                    let contour_points = component_points.len() - 4;
                    for cp in &component_points[..contour_points] {
                        let mut p = GridFittedPoint::at(
                            cp.current_x + tx,
                            cp.current_y + ty,
                            cp.on_curve,
                        );
                        p.last_in_contour = cp.last_in_contour;
                        assembled.push(p);
                    }

                    if component.use_my_metrics {
                        bearings.clear();
                        bearings.extend_from_slice(&component_points[contour_points..]);
                    }
                }
                assembled
            }
        };

        points.append(&mut bearings);
        self.points = points;

        self.glyph_program =
            if self.default_graphics_state.instruction_control & INHIBIT_GRID_FITTING != 0 {
                Arc::new(InstructionStream::empty(ProgramKind::Glyph))
            } else {
                Arc::new(decode(ProgramKind::Glyph, &glyph.instructions)?)
            };

        Ok(())
    }

    /*** The fetch-dispatch loop ***/

    fn stream(&self, program: ProgramKind) -> &Arc<InstructionStream> {
        match program {
            ProgramKind::Font => &self.font_program,
            ProgramKind::ControlValue => &self.cvt_program,
            ProgramKind::Glyph => &self.glyph_program,
        }
    }

    fn execute_program(&mut self, program: ProgramKind) -> HintingResult<()> {
        self.state = Some(program);
        match program {
            ProgramKind::Font | ProgramKind::ControlValue => self.graphics_state.reset(true),
            ProgramKind::Glyph => {
                // the per-glyph set/used discipline starts over
                for entry in self.cvt.iter_mut() {
                    entry.set = false;
                }
                self.graphics_state =
                    if self.default_graphics_state.instruction_control & RESET_STATE != 0 {
                        GraphicsState::default()
                    } else {
                        self.default_graphics_state
                    };
            }
        }

        let len = self.stream(program).instructions.len();
        self.current = StreamPosition {
            program,
            range: 0..len,
            index: 0,
        };
        self.next = self.current.clone();
        self.call_stack.clear();

        self.stack.clear();
        self.stack.reserve(self.font.max_stack_elements() as usize);
        self.twilight = vec![
            GridFittedPoint::twilight_default();
            self.font.max_twilight_points() as usize
        ];

        self.run().map_err(|e| {
            let offset = self
                .stream(self.current.program)
                .instructions
                .get(self.current.index)
                .map(|inst| inst.offset)
                .unwrap_or(0);
            e.at(self.current.program, offset)
        })?;

        if self.graphics_state.loop_counter != 1 {
            self.add_warning(WarningKind::LoopNotReset {
                value: self.graphics_state.loop_counter,
            });
        }
        if !self.call_stack.is_empty() {
            self.add_warning(WarningKind::CallStackNotEmpty {
                depth: self.call_stack.len(),
            });
        }
        if !self.stack.is_empty() {
            self.add_warning(WarningKind::StackNotEmpty {
                count: self.stack.len(),
            });
        }

        self.state = None;
        Ok(())
    }

    fn run(&mut self) -> HintingResult<()> {
        let mut executed: u32 = 0;
        while self.current.index < self.current.range.end {
            if executed > MAX_INSTRUCTIONS_PER_PROGRAM {
                return Err(HintingErrorKind::InstructionBudgetExceeded.into());
            }

            self.next = self.current.clone();
            self.next.index += 1;

            let stream = Arc::clone(self.stream(self.current.program));
            self.dispatch(&stream.instructions[self.current.index])?;

            self.current = self.next.clone();
            executed += 1;
        }
        Ok(())
    }

    fn dispatch(&mut self, instruction: &DecodedInstruction) -> HintingResult<()> {
        match &instruction.kind {
            Instruction::Push(elements) => {
                self.push_elements(elements);
                Ok(())
            }
            Instruction::ReadStore => self.rs(),
            Instruction::WriteStore => self.ws(),
            Instruction::WriteCvtInPixels => self.wcvtp(),
            Instruction::WriteCvtInFontUnits => self.wcvtf(),
            Instruction::ReadCvt => self.rcvt(),
            Instruction::SetVectorsToAxis { x } => self.svtca(*x),
            Instruction::SetProjectionToAxis { x } => self.spvtca(*x),
            Instruction::SetFreedomToAxis { x } => self.sfvtca(*x),
            Instruction::SetProjectionToLine { perpendicular } => self.spvtl(*perpendicular),
            Instruction::SetFreedomToLine { perpendicular } => self.sfvtl(*perpendicular),
            Instruction::SetFreedomToProjection => self.sfvtpv(),
            Instruction::SetDualProjectionToLine { perpendicular } => self.sdpvtl(*perpendicular),
            Instruction::SetProjectionFromStack => self.spvfs(),
            Instruction::SetFreedomFromStack => self.sfvfs(),
            Instruction::GetProjectionVector => self.gpv(),
            Instruction::GetFreedomVector => self.gfv(),
            Instruction::SetReferencePoint(index) => self.srp(*index),
            Instruction::SetZonePointer(index) => self.szp(*index),
            Instruction::SetZonePointers => self.szps(),
            Instruction::RoundToHalfGrid => self.set_round_state(RoundState::to_half_grid()),
            Instruction::RoundToGrid => self.set_round_state(RoundState::to_grid()),
            Instruction::RoundToDoubleGrid => self.set_round_state(RoundState::to_double_grid()),
            Instruction::RoundDownToGrid => self.set_round_state(RoundState::down_to_grid()),
            Instruction::RoundUpToGrid => self.set_round_state(RoundState::up_to_grid()),
            Instruction::RoundOff => self.set_round_state(RoundState::off()),
            Instruction::SuperRound => self.sround(1.0),
            Instruction::SuperRound45 => self.sround(std::f64::consts::FRAC_1_SQRT_2),
            Instruction::SetLoop => self.sloop(),
            Instruction::SetMinimumDistance => self.smd(),
            Instruction::InstructionControl => self.instctrl(),
            Instruction::ScanConversionControl | Instruction::ScanType => {
                // rasterizer dropout control; nothing here consumes it
                self.pop().map(|_| ())
            }
            Instruction::SetCvtCutIn => self.scvtci(),
            Instruction::SetSingleWidthCutIn => self.sswci(),
            Instruction::SetSingleWidth => self.ssw(),
            Instruction::SetAutoFlip { on } => self.set_auto_flip(*on),
            Instruction::SetDeltaBase => self.sdb(),
            Instruction::SetDeltaShift => self.sds(),
            Instruction::GetCoordinate { original } => self.gc(*original),
            Instruction::SetCoordinateFromStack => self.scfs(),
            Instruction::MeasureDistance { original } => self.md(*original),
            Instruction::MeasurePpem => self.mppem(),
            Instruction::MeasurePointSize => self.mps(),
            Instruction::FlipPoint => self.flippt(),
            Instruction::FlipRange { on } => self.fliprg(*on),
            Instruction::ShiftPoint { use_rp1 } => self.shp(*use_rp1),
            Instruction::ShiftContour { use_rp1 } => self.shc(*use_rp1),
            Instruction::ShiftZone { use_rp1 } => self.shz(*use_rp1),
            Instruction::ShiftPointByPixels => self.shpix(),
            Instruction::MoveStackIndirectRelativePoint { set_rp0 } => self.msirp(*set_rp0),
            Instruction::MoveDirectAbsolutePoint { round } => self.mdap(*round),
            Instruction::MoveIndirectAbsolutePoint { round } => self.miap(*round),
            Instruction::MoveDirectRelativePoint { flags } => self.mdrp(*flags),
            Instruction::MoveIndirectRelativePoint { flags } => self.mirp(*flags),
            Instruction::AlignToReferencePoint => self.align(),
            Instruction::MoveToIntersection => self.isect(),
            Instruction::AlignPoints => self.alignpts(),
            Instruction::InterpolatePoint => self.ip(),
            Instruction::UntouchPoint => self.utp(),
            Instruction::InterpolateUntouchedPoints { x } => self.iup(*x),
            Instruction::DeltaP { variant } => self.deltap(*variant),
            Instruction::DeltaC { variant } => self.deltac(*variant),
            Instruction::Dup => self.dup(),
            Instruction::Pop => self.pop().map(|_| ()),
            Instruction::ClearStack => {
                self.stack.clear();
                Ok(())
            }
            Instruction::Swap => self.swap(),
            Instruction::Depth => {
                let depth = self.stack.len() as i32;
                self.push(depth);
                Ok(())
            }
            Instruction::CopyIndex => self.cindex(),
            Instruction::MoveIndex => self.mindex(),
            Instruction::Roll => self.roll(),
            Instruction::If => self.if_test(),
            Instruction::Else => self.else_skip(),
            Instruction::EndIf => Ok(()),
            Instruction::JumpRelativeOnTrue => self.jump_conditional(instruction.offset, true),
            Instruction::Jump => {
                let jump_offset = self.pop()?;
                self.jump_to(instruction.offset as i32 + jump_offset)
            }
            Instruction::JumpRelativeOnFalse => self.jump_conditional(instruction.offset, false),
            Instruction::LessThan => self.compare(|a, b| a < b),
            Instruction::LessThanOrEqual => self.compare(|a, b| a <= b),
            Instruction::GreaterThan => self.compare(|a, b| a > b),
            Instruction::GreaterThanOrEqual => self.compare(|a, b| a >= b),
            Instruction::Equal => self.compare(|a, b| a == b),
            Instruction::NotEqual => self.compare(|a, b| a != b),
            Instruction::Odd => self.odd(),
            Instruction::Even => self.even(),
            Instruction::And => self.and(),
            Instruction::Or => self.or(),
            Instruction::Not => self.not(),
            Instruction::Add => self.add(),
            Instruction::Subtract => self.sub(),
            Instruction::Divide => self.div(),
            Instruction::Multiply => self.mul(),
            Instruction::AbsoluteValue => self.abs(),
            Instruction::Negate => self.neg(),
            Instruction::Floor => self.floor(),
            Instruction::Ceiling => self.ceiling(),
            Instruction::Max => self.max(),
            Instruction::Min => self.min(),
            Instruction::Round { color } => self.round_value(*color),
            Instruction::NoRound { color } => self.no_round(*color),
            Instruction::FunctionDef => self.fdef(),
            Instruction::EndFunctionDef => self.endf(),
            Instruction::Call => {
                let id = self.pop()?;
                self.call_function(id)
            }
            Instruction::LoopCall => self.loopcall(),
            Instruction::InstructionDef => Err(HintingErrorKind::UnsupportedInstruction.into()),
            Instruction::GetInfo => self.getinfo(),
        }
    }

    /*** Diagnostics ***/

    fn current_offset(&self) -> Option<u32> {
        self.stream(self.current.program)
            .instructions
            .get(self.current.index)
            .map(|inst| inst.offset)
    }

    fn add_warning(&mut self, kind: WarningKind) {
        let warning = Warning {
            program: self.state.unwrap_or(ProgramKind::Font),
            offset: self.current_offset(),
            kind,
        };
        log::warn!("{warning}");
        if self.warnings.len() < MAX_STORED_WARNINGS {
            self.warnings.push(warning);
        } else {
            self.suppressed_warnings += 1;
        }
    }

    /*** Operand stack ***/

    fn push(&mut self, element: i32) {
        self.stack.push(element);
        let max = self.font.max_stack_elements();
        if self.stack.len() > max as usize {
            self.add_warning(WarningKind::TooManyStackElements {
                count: self.stack.len(),
                max,
            });
        }
    }

    fn push_elements(&mut self, elements: &[i32]) {
        for &element in elements {
            self.push(element);
        }
    }

    fn push_fixed(&mut self, value: F26Dot6) {
        self.push(value.to_bits());
    }

    fn push_bool(&mut self, value: bool) {
        self.push(value as i32);
    }

    fn pop(&mut self) -> HintingResult<i32> {
        self.stack
            .pop()
            .ok_or_else(|| HintingErrorKind::StackUnderflow.into())
    }

    fn pop_fixed(&mut self) -> HintingResult<F26Dot6> {
        Ok(F26Dot6::from_bits(self.pop()?))
    }

    fn nth_from_top(&self, depth: i32) -> HintingResult<i32> {
        match usize::try_from(depth) {
            Ok(depth) if depth < self.stack.len() => {
                Ok(self.stack[self.stack.len() - 1 - depth])
            }
            _ => Err(HintingErrorKind::StackIndexOutOfRange {
                depth_requested: depth,
                size: self.stack.len(),
            }
            .into()),
        }
    }

    fn remove_nth_from_top(&mut self, depth: i32) -> HintingResult<i32> {
        match usize::try_from(depth) {
            Ok(depth) if depth < self.stack.len() => {
                Ok(self.stack.remove(self.stack.len() - 1 - depth))
            }
            _ => Err(HintingErrorKind::StackIndexOutOfRange {
                depth_requested: depth,
                size: self.stack.len(),
            }
            .into()),
        }
    }

    /*** Storage and control values ***/

    fn storage_index(&self, index: i32) -> HintingResult<usize> {
        match usize::try_from(index) {
            Ok(i) if i < self.storage.len() => Ok(i),
            _ => Err(HintingErrorKind::StorageOutOfRange { index }.into()),
        }
    }

    fn storage_value(&self, index: i32) -> HintingResult<i32> {
        let i = self.storage_index(index)?;
        if !self.storage[i].initialized {
            return Err(HintingErrorKind::StorageUninitialized { index }.into());
        }
        Ok(self.storage[i].value)
    }

    fn set_storage(&mut self, index: i32, value: i32) -> HintingResult<()> {
        let i = self.storage_index(index)?;
        self.storage[i] = StorageElement {
            value,
            initialized: true,
        };
        Ok(())
    }

    fn cvt_index(&self, index: i32) -> HintingResult<usize> {
        match usize::try_from(index) {
            Ok(i) if i < self.cvt.len() => Ok(i),
            _ => Err(HintingErrorKind::CvtOutOfRange { index }.into()),
        }
    }

    /// The pixel-per-em along the projection vector, unrounded.
    fn projected_ppem(&self) -> f64 {
        self.graphics_state
            .projection_vector
            .weighted_magnitude(self.ppem_x as f64, self.ppem_y as f64)
    }

    fn cvt_value(&mut self, index: i32) -> HintingResult<F26Dot6> {
        let i = self.cvt_index(index)?;

        if self.state == Some(ProgramKind::Glyph) {
            if self.cvt[i].local {
                if !self.cvt[i].set {
                    return Err(HintingErrorKind::CvtLocalNotSet { index }.into());
                }
            } else if !self.cvt[i].set {
                self.cvt[i].global = true;
            }
        }

        let entry = self.cvt[i];
        let pixels = entry.value as f64 * self.projected_ppem() / entry.ppem as f64;
        Ok(F26Dot6::from_bits((pixels * 64.0).round() as i32))
    }

    fn glyph_program_cvt_write_check(&mut self, i: usize, index: i32) -> HintingResult<()> {
        if self.state == Some(ProgramKind::Glyph) {
            if self.cvt[i].global && !self.cvt[i].set {
                return Err(HintingErrorKind::CvtGlobalThenSet { index }.into());
            }
            self.cvt[i].local = true;
        }
        Ok(())
    }

    fn set_cvt_value_pixels(&mut self, index: i32, value: F26Dot6) -> HintingResult<()> {
        let i = self.cvt_index(index)?;
        self.glyph_program_cvt_write_check(i, index)?;
        self.cvt[i].set = true;
        self.cvt[i].value = value.to_bits();
        self.cvt[i].ppem = (self.projected_ppem() * 64.0).round() as i32;
        Ok(())
    }

    fn set_cvt_value_font_units(&mut self, index: i32, value: i32) -> HintingResult<()> {
        let i = self.cvt_index(index)?;
        self.glyph_program_cvt_write_check(i, index)?;
        self.cvt[i].set = true;
        self.cvt[i].value = value;
        self.cvt[i].ppem = self.units_per_em as i32;
        Ok(())
    }

    /*** Points and zones ***/

    fn zone_points(&self, zone: Zone) -> &Points {
        match zone {
            Zone::Twilight => &self.twilight,
            Zone::Glyph => &self.points,
        }
    }

    fn zone_points_mut(&mut self, zone: Zone) -> &mut Points {
        match zone {
            Zone::Twilight => &mut self.twilight,
            Zone::Glyph => &mut self.points,
        }
    }

    fn point_index(&self, zone: Zone, index: i32) -> HintingResult<usize> {
        match usize::try_from(index) {
            Ok(i) if i < self.zone_points(zone).len() => Ok(i),
            _ => Err(HintingErrorKind::InvalidPointIndex {
                zone: zone.number(),
                index,
            }
            .into()),
        }
    }

    fn point(&self, zone: Zone, index: i32) -> HintingResult<&GridFittedPoint> {
        let i = self.point_index(zone, index)?;
        Ok(&self.zone_points(zone)[i])
    }

    /// The point's current coordinate along the projection vector.
    fn point_projection(&self, zone: Zone, index: i32) -> HintingResult<F26Dot6> {
        let point = self.point(zone, index)?;
        Ok(self
            .graphics_state
            .projection_vector
            .project(point.current_x, point.current_y))
    }

    /// The point's original coordinate, measured along the dual projection
    /// vector when `dual` is set.
    fn original_projection(&self, zone: Zone, index: i32, dual: bool) -> HintingResult<F26Dot6> {
        let vector = if dual {
            self.graphics_state.dual_projection_vector
        } else {
            self.graphics_state.projection_vector
        };
        let point = self.point(zone, index)?;
        Ok(vector.project(point.original_x, point.original_y))
    }

    fn point_x(&self, zone: Zone, index: i32) -> HintingResult<F26Dot6> {
        Ok(self.point(zone, index)?.current_x)
    }

    fn point_y(&self, zone: Zone, index: i32) -> HintingResult<F26Dot6> {
        Ok(self.point(zone, index)?.current_y)
    }

    fn original_point_x(&self, zone: Zone, index: i32) -> HintingResult<F26Dot6> {
        Ok(self.point(zone, index)?.original_x)
    }

    fn original_point_y(&self, zone: Zone, index: i32) -> HintingResult<F26Dot6> {
        Ok(self.point(zone, index)?.original_y)
    }

    /// Projection·freedom, the divisor of every projected move. Zero means
    /// the point cannot move at all.
    fn projection_dot_freedom(&self) -> HintingResult<F2Dot14> {
        let projection = self.graphics_state.projection_vector;
        let freedom = self.graphics_state.freedom_vector;
        let dot =
            mul_2dot14(projection.x, freedom.x) + mul_2dot14(projection.y, freedom.y);
        if dot.to_bits() == 0 {
            return Err(HintingErrorKind::FreedomPerpendicularToProjection.into());
        }
        Ok(dot)
    }

    /// Moves the point along the freedom vector until its projection equals
    /// `new_position`, touching the axes the freedom vector has a component
    /// on.
    fn move_point(&mut self, zone: Zone, index: i32, new_position: F26Dot6) -> HintingResult<()> {
        let projection = self.graphics_state.projection_vector;
        let freedom = self.graphics_state.freedom_vector;
        let dot = self.projection_dot_freedom()?;

        let i = self.point_index(zone, index)?;
        let point = &mut self.zone_points_mut(zone)[i];

        let move_by_projection =
            new_position - projection.project(point.current_x, point.current_y);
        let move_by_freedom = div_f2dot14(move_by_projection, dot);

        point.current_x += mul_f2dot14(move_by_freedom, freedom.x);
        point.current_y += mul_f2dot14(move_by_freedom, freedom.y);
        if freedom.x.to_bits() != 0 {
            point.touched_x = true;
        }
        if freedom.y.to_bits() != 0 {
            point.touched_y = true;
        }
        Ok(())
    }

    /// The twilight-only variant of `move_point` that moves the *original*
    /// coordinate. No touch flags; original positions have none.
    fn move_twilight_original(&mut self, index: i32, new_position: F26Dot6) -> HintingResult<()> {
        let projection = self.graphics_state.projection_vector;
        let freedom = self.graphics_state.freedom_vector;
        let dot = self.projection_dot_freedom()?;

        let i = self.point_index(Zone::Twilight, index)?;
        let point = &mut self.twilight[i];

        let move_by_projection =
            new_position - projection.project(point.original_x, point.original_y);
        let move_by_freedom = div_f2dot14(move_by_projection, dot);

        point.original_x += mul_f2dot14(move_by_freedom, freedom.x);
        point.original_y += mul_f2dot14(move_by_freedom, freedom.y);
        Ok(())
    }

    fn set_twilight_original_xy(&mut self, index: i32, x: F26Dot6, y: F26Dot6) -> HintingResult<()> {
        let i = self.point_index(Zone::Twilight, index)?;
        self.twilight[i].original_x = x;
        self.twilight[i].original_y = y;
        Ok(())
    }

    fn shift_point(
        &mut self,
        zone: Zone,
        index: i32,
        amount: F26Dot6,
        touch: bool,
    ) -> HintingResult<()> {
        let freedom = self.graphics_state.freedom_vector;
        let i = self.point_index(zone, index)?;
        let point = &mut self.zone_points_mut(zone)[i];

        point.current_x += mul_f2dot14(amount, freedom.x);
        point.current_y += mul_f2dot14(amount, freedom.y);
        if touch {
            if freedom.x.to_bits() != 0 {
                point.touched_x = true;
            }
            if freedom.y.to_bits() != 0 {
                point.touched_y = true;
            }
        }
        Ok(())
    }

    fn move_point_to_xy(
        &mut self,
        zone: Zone,
        index: i32,
        x: F26Dot6,
        y: F26Dot6,
    ) -> HintingResult<()> {
        let i = self.point_index(zone, index)?;
        let point = &mut self.zone_points_mut(zone)[i];
        point.current_x = x;
        point.current_y = y;
        point.touched_x = true;
        point.touched_y = true;
        Ok(())
    }

    fn set_on_curve(&mut self, index: i32, on_curve: bool) -> HintingResult<()> {
        if self.state != Some(ProgramKind::Glyph) {
            return Err(HintingErrorKind::WrongProgramContext.into());
        }
        let i = self.point_index(Zone::Glyph, index)?;
        self.points[i].on_curve = on_curve;
        Ok(())
    }

    fn on_curve(&self, index: i32) -> HintingResult<bool> {
        if self.state != Some(ProgramKind::Glyph) {
            return Err(HintingErrorKind::WrongProgramContext.into());
        }
        Ok(self.point(Zone::Glyph, index)?.on_curve)
    }

    /// Index of the last point of the given contour. Phantom points each
    /// count as their own one-point contour.
    fn last_contour_point(&self, contour: i32) -> HintingResult<usize> {
        let mut remaining = contour;
        for (i, point) in self.points.iter().enumerate() {
            if point.last_in_contour {
                if remaining == 0 {
                    return Ok(i);
                }
                remaining -= 1;
            }
        }
        Err(HintingErrorKind::InvalidContourIndex { index: contour }.into())
    }

    fn contour_point_count(&self) -> HintingResult<usize> {
        if self.state != Some(ProgramKind::Glyph) {
            return Err(HintingErrorKind::WrongProgramContext.into());
        }
        Ok(self.points.len())
    }

    /*** Graphics-state access ***/

    fn set_round_state(&mut self, round_state: RoundState) -> HintingResult<()> {
        self.graphics_state.round_state = round_state;
        Ok(())
    }

    fn round(&self, n: F26Dot6) -> F26Dot6 {
        self.graphics_state.round_state.round(n)
    }

    /// Identity for all three colors; the hook where engine-characteristic
    /// compensation would plug in.
    fn compensate_for_color(&self, n: F26Dot6, color: u8) -> HintingResult<F26Dot6> {
        if color > COLOR_WHITE {
            return Err(HintingErrorKind::InvalidColor { value: color }.into());
        }
        Ok(n)
    }

    fn set_freedom_vector(&mut self, x: f64, y: f64) -> HintingResult<()> {
        self.graphics_state.freedom_vector = Vector::from_components(x, y)?;
        Ok(())
    }

    /// Setting the projection vector always drags the dual projection
    /// vector with it; only SDPVTL separates them afterwards.
    fn set_projection_vector(&mut self, x: f64, y: f64) -> HintingResult<()> {
        let vector = Vector::from_components(x, y)?;
        self.graphics_state.projection_vector = vector;
        self.graphics_state.dual_projection_vector = vector;
        Ok(())
    }

    fn set_dual_projection_vector(&mut self, x: f64, y: f64) -> HintingResult<()> {
        self.graphics_state.dual_projection_vector = Vector::from_components(x, y)?;
        Ok(())
    }

    fn reference_point(&self, index: usize) -> i32 {
        self.graphics_state.rp[index]
    }

    fn zone_pointer(&self, index: usize) -> Zone {
        self.graphics_state.zp[index]
    }

    fn take_loop_count(&mut self) -> i32 {
        let count = self.graphics_state.loop_counter.max(0);
        self.graphics_state.loop_counter = 1;
        count
    }

    fn measured_ppem(&self) -> HintingResult<u32> {
        match self.state {
            Some(ProgramKind::ControlValue) | Some(ProgramKind::Glyph) => {
                Ok(self.projected_ppem().round() as u32)
            }
            _ => Err(HintingErrorKind::WrongProgramContext.into()),
        }
    }

    /// Always true; a rasterizer consumer would feed the real mode in.
    fn greyscale(&self) -> bool {
        true
    }

    /*** Control flow ***/

    /// Advances past the instruction `next` points at and returns its
    /// index; the IF/ELSE/FDEF scans are built on this.
    fn skip_next_instruction(&mut self) -> HintingResult<usize> {
        if self.next.index >= self.next.range.end {
            return Err(HintingErrorKind::JumpOutOfRange {
                offset: self.stream(self.next.program).byte_len as i32,
            }
            .into());
        }
        let index = self.next.index;
        self.next.index += 1;
        Ok(index)
    }

    fn if_test(&mut self) -> HintingResult<()> {
        if self.pop()? != 0 {
            return Ok(());
        }
        // false: resume after the matching ELSE or EIF
        let stream = Arc::clone(self.stream(self.next.program));
        let mut level = 1;
        loop {
            let i = self.skip_next_instruction()?;
            match stream.instructions[i].kind {
                Instruction::Else if level == 1 => return Ok(()),
                Instruction::EndIf => {
                    level -= 1;
                    if level == 0 {
                        return Ok(());
                    }
                }
                Instruction::If => level += 1,
                _ => {}
            }
        }
    }

    /// Reached at the end of a taken IF branch: skip the ELSE block.
    fn else_skip(&mut self) -> HintingResult<()> {
        let stream = Arc::clone(self.stream(self.next.program));
        let mut level = 1;
        loop {
            let i = self.skip_next_instruction()?;
            match stream.instructions[i].kind {
                Instruction::Else if level == 1 => {
                    return Err(HintingErrorKind::StrayElse.into())
                }
                Instruction::EndIf => {
                    level -= 1;
                    if level == 0 {
                        return Ok(());
                    }
                }
                Instruction::If => level += 1,
                _ => {}
            }
        }
    }

    fn jump_conditional(&mut self, instruction_offset: u32, jump_when: bool) -> HintingResult<()> {
        let condition = self.pop()?;
        let jump_offset = self.pop()?;
        if (condition != 0) == jump_when {
            self.jump_to(instruction_offset as i32 + jump_offset)?;
        }
        Ok(())
    }

    fn jump_to(&mut self, target: i32) -> HintingResult<()> {
        let stream = Arc::clone(self.stream(self.current.program));
        let range = self.current.range.clone();
        let instructions = &stream.instructions[range.clone()];

        let last = match instructions.last() {
            Some(last) => last,
            None => return Err(HintingErrorKind::JumpOutOfRange { offset: target }.into()),
        };

        // jumping right past the last instruction ends the program
        if target == (last.offset + last.size) as i32 {
            self.next.index = range.end;
            return Ok(());
        }

        if target < instructions[0].offset as i32 || target > last.offset as i32 {
            return Err(HintingErrorKind::JumpOutOfRange { offset: target }.into());
        }

        match u32::try_from(target) {
            Ok(target_offset) => match stream.index_of_offset(range, target_offset) {
                Some(index) => {
                    self.next.index = index;
                    Ok(())
                }
                None => Err(HintingErrorKind::JumpTargetNotAligned { offset: target }.into()),
            },
            Err(_) => Err(HintingErrorKind::JumpOutOfRange { offset: target }.into()),
        }
    }

    /*** Functions ***/

    fn fdef(&mut self) -> HintingResult<()> {
        let id = self.pop()?;
        if !(0..=0xFFFF).contains(&id) {
            return Err(HintingErrorKind::InvalidFunctionId { id }.into());
        }
        let id = id as u32;

        let start = self.next.index;
        let stream = Arc::clone(self.stream(self.next.program));
        loop {
            let i = self.skip_next_instruction()?;
            if stream.instructions[i].kind == Instruction::EndFunctionDef {
                return self.define_function(id, start..self.next.index);
            }
        }
    }

    fn define_function(&mut self, id: u32, range: Range<usize>) -> HintingResult<()> {
        if self.functions.contains_key(&id) {
            return Err(HintingErrorKind::DuplicateFunctionDefinition { id }.into());
        }
        self.functions.insert(
            id,
            FunctionDefinition {
                program: self.current.program,
                range,
            },
        );

        let max = self.font.max_function_defs();
        if self.functions.len() > max as usize {
            self.add_warning(WarningKind::TooManyFunctionDefinitions {
                count: self.functions.len(),
                max,
            });
        }
        Ok(())
    }

    fn call_function(&mut self, id: i32) -> HintingResult<()> {
        let id = id as u32;
        let function = self
            .functions
            .get(&id)
            .ok_or(HintingErrorKind::UndefinedFunction { id })?
            .clone();

        self.call_stack.push(self.next.clone());
        self.next = StreamPosition {
            program: function.program,
            index: function.range.start,
            range: function.range,
        };
        Ok(())
    }

    fn endf(&mut self) -> HintingResult<()> {
        self.next = self
            .call_stack
            .pop()
            .ok_or(HintingErrorKind::EmptyCallStack)?;
        Ok(())
    }

    /// N calls are queued by pushing the function entry N−1 times: each
    /// ENDF then re-enters the body, and the last one returns past the
    /// LOOPCALL.
    fn loopcall(&mut self) -> HintingResult<()> {
        let id = self.pop()?;
        let count = self.pop()?;
        for _ in 0..count.max(0) {
            self.call_function(id)?;
        }
        Ok(())
    }

    /*** Storage, CVT and state instructions ***/

    fn rs(&mut self) -> HintingResult<()> {
        let location = self.pop()?;
        let value = self.storage_value(location)?;
        self.push(value);
        Ok(())
    }

    fn ws(&mut self) -> HintingResult<()> {
        let value = self.pop()?;
        let location = self.pop()?;
        self.set_storage(location, value)
    }

    fn wcvtp(&mut self) -> HintingResult<()> {
        let value = self.pop_fixed()?;
        let location = self.pop()?;
        self.set_cvt_value_pixels(location, value)
    }

    fn wcvtf(&mut self) -> HintingResult<()> {
        let value = self.pop()?;
        let location = self.pop()?;
        self.set_cvt_value_font_units(location, value)
    }

    fn rcvt(&mut self) -> HintingResult<()> {
        let location = self.pop()?;
        let value = self.cvt_value(location)?;
        self.push_fixed(value);
        Ok(())
    }

    fn svtca(&mut self, x: bool) -> HintingResult<()> {
        if x {
            self.set_freedom_vector(1.0, 0.0)?;
            self.set_projection_vector(1.0, 0.0)
        } else {
            self.set_freedom_vector(0.0, 1.0)?;
            self.set_projection_vector(0.0, 1.0)
        }
    }

    fn spvtca(&mut self, x: bool) -> HintingResult<()> {
        if x {
            self.set_projection_vector(1.0, 0.0)
        } else {
            self.set_projection_vector(0.0, 1.0)
        }
    }

    fn sfvtca(&mut self, x: bool) -> HintingResult<()> {
        if x {
            self.set_freedom_vector(1.0, 0.0)
        } else {
            self.set_freedom_vector(0.0, 1.0)
        }
    }

    /// Pops the two point numbers shared by the vector-to-line
    /// instructions and returns the line's direction. The zone pointers
    /// are crossed: zp2 goes with the first popped point, zp1 with the
    /// second.
    fn line_direction(&mut self, perpendicular: bool) -> HintingResult<(f64, f64)> {
        let p1 = self.pop()?;
        let p2 = self.pop()?;
        let zone1 = self.zone_pointer(2);
        let zone2 = self.zone_pointer(1);

        let dx = self.point_x(zone2, p2)? - self.point_x(zone1, p1)?;
        let dy = self.point_y(zone2, p2)? - self.point_y(zone1, p1)?;

        let (x, y): (f64, f64) = (dx.to_num(), dy.to_num());
        if perpendicular {
            Ok((-y, x))
        } else {
            Ok((x, y))
        }
    }

    fn spvtl(&mut self, perpendicular: bool) -> HintingResult<()> {
        let (x, y) = self.line_direction(perpendicular)?;
        self.set_projection_vector(x, y)
    }

    fn sfvtl(&mut self, perpendicular: bool) -> HintingResult<()> {
        let (x, y) = self.line_direction(perpendicular)?;
        self.set_freedom_vector(x, y)
    }

    fn sfvtpv(&mut self) -> HintingResult<()> {
        self.graphics_state.freedom_vector = self.graphics_state.projection_vector;
        Ok(())
    }

    fn sdpvtl(&mut self, perpendicular: bool) -> HintingResult<()> {
        let p1 = self.pop()?;
        let p2 = self.pop()?;
        let zone1 = self.zone_pointer(2);
        let zone2 = self.zone_pointer(1);

        let dx = self.point_x(zone2, p2)? - self.point_x(zone1, p1)?;
        let dy = self.point_y(zone2, p2)? - self.point_y(zone1, p1)?;
        let orig_dx = self.original_point_x(zone2, p2)? - self.original_point_x(zone1, p1)?;
        let orig_dy = self.original_point_y(zone2, p2)? - self.original_point_y(zone1, p1)?;

        let ((x, y), (orig_x, orig_y)): ((f64, f64), (f64, f64)) = if perpendicular {
            (
                ((-dy).to_num(), dx.to_num()),
                ((-orig_dy).to_num(), orig_dx.to_num()),
            )
        } else {
            (
                (dx.to_num(), dy.to_num()),
                (orig_dx.to_num(), orig_dy.to_num()),
            )
        };

        self.set_projection_vector(x, y)?;
        self.set_dual_projection_vector(orig_x, orig_y)
    }

    fn spvfs(&mut self) -> HintingResult<()> {
        let y = self.pop()?;
        let x = self.pop()?;
        self.set_projection_vector(x as f64, y as f64)
    }

    fn sfvfs(&mut self) -> HintingResult<()> {
        let y = self.pop()?;
        let x = self.pop()?;
        self.set_freedom_vector(x as f64, y as f64)
    }

    fn gpv(&mut self) -> HintingResult<()> {
        let vector = self.graphics_state.projection_vector;
        self.push(vector.x.to_bits() as i32);
        self.push(vector.y.to_bits() as i32);
        Ok(())
    }

    fn gfv(&mut self) -> HintingResult<()> {
        let vector = self.graphics_state.freedom_vector;
        self.push(vector.x.to_bits() as i32);
        self.push(vector.y.to_bits() as i32);
        Ok(())
    }

    fn srp(&mut self, index: u8) -> HintingResult<()> {
        if index > 2 {
            return Err(HintingErrorKind::InvalidReferencePointIndex { index }.into());
        }
        self.graphics_state.rp[index as usize] = self.pop()?;
        Ok(())
    }

    fn szp(&mut self, index: u8) -> HintingResult<()> {
        if index > 2 {
            return Err(HintingErrorKind::InvalidReferencePointIndex { index }.into());
        }
        let zone = Zone::from_i32(self.pop()?)?;
        self.graphics_state.zp[index as usize] = zone;
        Ok(())
    }

    fn szps(&mut self) -> HintingResult<()> {
        let zone = Zone::from_i32(self.pop()?)?;
        self.graphics_state.zp = [zone; 3];
        Ok(())
    }

    fn sround(&mut self, base_period: f64) -> HintingResult<()> {
        let n = self.pop()?;

        let period_bits = match (n >> 6) & 0x03 {
            0 => (base_period * 32.0).round() as i32,
            1 => (base_period * 64.0).round() as i32,
            2 => (base_period * 128.0).round() as i32,
            _ => return Err(HintingErrorKind::InvalidRoundState { bits: n }.into()),
        };
        let phase_bits = div_round(period_bits as i64 * ((n >> 4) & 0x03) as i64, 4) as i32;
        let threshold_selector = n & 0x0F;
        let threshold_bits = if threshold_selector == 0 {
            period_bits - 1
        } else {
            div_round(period_bits as i64 * (threshold_selector - 4) as i64, 8) as i32
        };

        self.graphics_state.round_state = RoundState {
            period: F26Dot6::from_bits(period_bits),
            phase: F26Dot6::from_bits(phase_bits),
            threshold: F26Dot6::from_bits(threshold_bits),
        };
        Ok(())
    }

    fn sloop(&mut self) -> HintingResult<()> {
        self.graphics_state.loop_counter = self.pop()?;
        Ok(())
    }

    fn smd(&mut self) -> HintingResult<()> {
        self.graphics_state.minimum_distance = self.pop_fixed()?;
        Ok(())
    }

    fn instctrl(&mut self) -> HintingResult<()> {
        let mask = self.pop()?;
        let value = self.pop()?;
        if mask & !0x03 != 0 {
            self.add_warning(WarningKind::InstructionControlBits { mask });
        }
        let mask = (mask & 0x03) as u32;
        let value = (value & 0x03) as u32;
        self.graphics_state.instruction_control =
            (self.graphics_state.instruction_control & !mask) | (value & mask);
        Ok(())
    }

    fn scvtci(&mut self) -> HintingResult<()> {
        self.graphics_state.control_value_cut_in = self.pop_fixed()?;
        Ok(())
    }

    fn sswci(&mut self) -> HintingResult<()> {
        self.graphics_state.single_width_cut_in = self.pop_fixed()?;
        Ok(())
    }

    fn ssw(&mut self) -> HintingResult<()> {
        // popped as a 16.16 quantity
        let value = self.pop()?;
        self.graphics_state.single_width_value =
            F26Dot6::from_bits(div_round(value as i64, 1 << 10) as i32);
        Ok(())
    }

    fn set_auto_flip(&mut self, on: bool) -> HintingResult<()> {
        if self.state == Some(ProgramKind::Font) {
            return Err(HintingErrorKind::WrongProgramContext.into());
        }
        self.graphics_state.auto_flip = on;
        Ok(())
    }

    fn sdb(&mut self) -> HintingResult<()> {
        self.graphics_state.delta_base = self.pop()? as u32;
        Ok(())
    }

    fn sds(&mut self) -> HintingResult<()> {
        self.graphics_state.delta_shift = self.pop()? as u32;
        Ok(())
    }

    /*** Measurement instructions ***/

    fn gc(&mut self, original: bool) -> HintingResult<()> {
        let p = self.pop()?;
        let zone = self.zone_pointer(2);
        let value = if original {
            self.original_projection(zone, p, true)?
        } else {
            self.point_projection(zone, p)?
        };
        self.push_fixed(value);
        Ok(())
    }

    fn scfs(&mut self) -> HintingResult<()> {
        let value = self.pop_fixed()?;
        let p = self.pop()?;
        let zone = self.zone_pointer(2);
        self.move_point(zone, p, value)?;

        // a twilight point's original position follows its current one
        if zone == Zone::Twilight {
            self.move_twilight_original(p, value)?;
        }
        Ok(())
    }

    fn md(&mut self, original: bool) -> HintingResult<()> {
        let p1 = self.pop()?;
        let p2 = self.pop()?;
        let zone1 = self.zone_pointer(1);
        let zone0 = self.zone_pointer(0);
        let distance = if original {
            self.original_projection(zone0, p2, true)? - self.original_projection(zone1, p1, true)?
        } else {
            self.point_projection(zone0, p2)? - self.point_projection(zone1, p1)?
        };
        self.push_fixed(distance);
        Ok(())
    }

    fn mppem(&mut self) -> HintingResult<()> {
        let ppem = self.measured_ppem()?;
        self.push(ppem as i32);
        Ok(())
    }

    fn mps(&mut self) -> HintingResult<()> {
        match self.state {
            Some(ProgramKind::ControlValue) | Some(ProgramKind::Glyph) => {
                let point_size = self.point_size;
                self.push(point_size as i32);
                Ok(())
            }
            _ => Err(HintingErrorKind::WrongProgramContext.into()),
        }
    }

    /*** On-curve flags ***/

    fn flippt(&mut self) -> HintingResult<()> {
        if self.zone_pointer(0) != Zone::Glyph {
            return Err(HintingErrorKind::InvalidZonePointer { value: 0 }.into());
        }
        let count = self.take_loop_count();
        for _ in 0..count {
            let p = self.pop()?;
            let flipped = !self.on_curve(p)?;
            self.set_on_curve(p, flipped)?;
        }
        Ok(())
    }

    fn fliprg(&mut self, on: bool) -> HintingResult<()> {
        let high = self.pop()?;
        let low = self.pop()?;
        for p in low..=high {
            self.set_on_curve(p, on)?;
        }
        Ok(())
    }

    /*** Shift instructions ***/

    /// The reference point and its zone for the shift family: rp2 in zp1,
    /// or rp1 in zp0.
    fn shift_reference(&self, use_rp1: bool) -> (i32, Zone) {
        if use_rp1 {
            (self.reference_point(1), self.zone_pointer(0))
        } else {
            (self.reference_point(2), self.zone_pointer(1))
        }
    }

    fn shp(&mut self, use_rp1: bool) -> HintingResult<()> {
        let zone2 = self.zone_pointer(2);
        let (rp, zone) = self.shift_reference(use_rp1);
        let distance =
            self.point_projection(zone, rp)? - self.original_projection(zone, rp, false)?;

        let count = self.take_loop_count();
        for _ in 0..count {
            let p = self.pop()?;
            self.shift_point(zone2, p, distance, true)?;
        }
        Ok(())
    }

    fn shc(&mut self, use_rp1: bool) -> HintingResult<()> {
        let (rp, zone) = self.shift_reference(use_rp1);
        if self.zone_pointer(2) != Zone::Glyph {
            return Err(HintingErrorKind::InvalidZonePointer { value: 0 }.into());
        }

        let distance =
            self.point_projection(zone, rp)? - self.original_projection(zone, rp, false)?;

        let contour = self.pop()?;
        let first = if contour > 0 {
            self.last_contour_point(contour - 1)? + 1
        } else {
            0
        };
        let last = self.last_contour_point(contour)?;

        for i in first..=last {
            // the reference point itself must not move
            if zone != Zone::Glyph || i as i32 != rp {
                self.shift_point(Zone::Glyph, i as i32, distance, true)?;
            }
        }
        Ok(())
    }

    fn shz(&mut self, use_rp1: bool) -> HintingResult<()> {
        let zone_to_shift = Zone::from_i32(self.pop()?)?;
        let (rp, zone) = self.shift_reference(use_rp1);

        let distance =
            self.point_projection(zone, rp)? - self.original_projection(zone, rp, false)?;

        let count = match zone {
            Zone::Twilight => self.twilight.len(),
            // phantom points stay put
            Zone::Glyph => self.contour_point_count()? - 4,
        };

        // zone shifts do not touch
        for i in 0..count {
            if zone_to_shift != zone || i as i32 != rp {
                self.shift_point(zone_to_shift, i as i32, distance, false)?;
            }
        }
        Ok(())
    }

    fn shpix(&mut self) -> HintingResult<()> {
        let amount = self.pop_fixed()?;
        let zone2 = self.zone_pointer(2);

        let count = self.take_loop_count();
        for _ in 0..count {
            let p = self.pop()?;
            self.shift_point(zone2, p, amount, true)?;
        }
        Ok(())
    }

    /*** Move instructions ***/

    fn msirp(&mut self, set_rp0: bool) -> HintingResult<()> {
        let distance = self.pop_fixed()?;
        let p = self.pop()?;
        let rp0 = self.reference_point(0);
        let zone0 = self.zone_pointer(0);
        let zone1 = self.zone_pointer(1);

        // A twilight target is materialized at the reference point first:
        // original and current both land on rp0, then the original moves
        // out by the distance before the real move below.
        if zone1 == Zone::Twilight {
            let rx = self.point_x(zone0, rp0)?;
            let ry = self.point_y(zone0, rp0)?;
            self.set_twilight_original_xy(p, rx, ry)?;
            let target = self.point_projection(zone0, rp0)? + distance;
            self.move_twilight_original(p, target)?;
            self.move_point_to_xy(zone1, p, rx, ry)?;
        }

        let target = self.point_projection(zone0, rp0)? + distance;
        self.move_point(zone1, p, target)?;

        self.graphics_state.rp[1] = rp0;
        self.graphics_state.rp[2] = p;
        if set_rp0 {
            self.graphics_state.rp[0] = p;
        }
        Ok(())
    }

    fn mdap(&mut self, round: bool) -> HintingResult<()> {
        let p = self.pop()?;
        let zone = self.zone_pointer(0);
        let position = self.point_projection(zone, p)?;
        let target = if round { self.round(position) } else { position };
        self.move_point(zone, p, target)?;

        self.graphics_state.rp[0] = p;
        self.graphics_state.rp[1] = p;
        Ok(())
    }

    fn miap(&mut self, round: bool) -> HintingResult<()> {
        let location = self.pop()?;
        let p = self.pop()?;
        let zone = self.zone_pointer(0);
        let cvt_position = self.cvt_value(location)?;
        let current_position = self.point_projection(zone, p)?;

        // In the twilight zone the original position becomes the unrounded
        // control value.
        if zone == Zone::Twilight {
            self.move_twilight_original(p, cvt_position)?;
        }

        if !round {
            self.move_point(zone, p, cvt_position)?;
        } else {
            let cut_in = self.graphics_state.control_value_cut_in;
            // no cut-in test for twilight points
            if zone == Zone::Twilight
                || (cvt_position - current_position < cut_in
                    && current_position - cvt_position < cut_in)
            {
                let target = self.round(cvt_position);
                self.move_point(zone, p, target)?;
            } else {
                let target = self.round(current_position);
                self.move_point(zone, p, target)?;
            }
        }

        self.graphics_state.rp[0] = p;
        self.graphics_state.rp[1] = p;
        Ok(())
    }

    /// Keeps `distance` at least the minimum distance, preserving the sign
    /// of the measured original distance.
    fn apply_minimum_distance(&self, distance: F26Dot6, negative: bool) -> F26Dot6 {
        let minimum = self.graphics_state.minimum_distance;
        if (minimum >= 0) == negative {
            if -minimum < distance {
                -minimum
            } else {
                distance
            }
        } else if distance < minimum {
            minimum
        } else {
            distance
        }
    }

    fn mdrp(&mut self, flags: u8) -> HintingResult<()> {
        let p = self.pop()?;
        let zone1 = self.zone_pointer(1);
        let rp0 = self.reference_point(0);
        let zone0 = self.zone_pointer(0);

        let mut distance =
            self.original_projection(zone1, p, true)? - self.original_projection(zone0, rp0, true)?;
        let negative = distance < 0;

        // single-width substitution
        let cut_in = self.graphics_state.single_width_cut_in;
        let mut single_width = self.graphics_state.single_width_value;
        if (single_width >= 0) == negative {
            single_width = -single_width;
        }
        if distance - single_width < cut_in && single_width - distance < cut_in {
            distance = single_width;
        }

        if flags & MRP_ROUND != 0 {
            distance = self.round(distance);
        }

        if flags & MRP_MIN_DIST != 0 {
            distance = self.apply_minimum_distance(distance, negative);
        }

        distance = self.compensate_for_color(distance, flags & MRP_COLOR)?;

        let target = self.point_projection(zone0, rp0)? + distance;
        self.move_point(zone1, p, target)?;

        self.graphics_state.rp[1] = rp0;
        self.graphics_state.rp[2] = p;
        if flags & MRP_SET_RP0 != 0 {
            self.graphics_state.rp[0] = p;
        }
        Ok(())
    }

    fn mirp(&mut self, flags: u8) -> HintingResult<()> {
        let location = self.pop()?;
        let mut cvt_distance = self.cvt_value(location)?;
        let p = self.pop()?;
        let rp0 = self.reference_point(0);
        let zone0 = self.zone_pointer(0);
        let zone1 = self.zone_pointer(1);

        let rp0_position = self.point_projection(zone0, rp0)?;
        let original_distance =
            self.original_projection(zone1, p, true)? - self.original_projection(zone0, rp0, true)?;
        let negative = original_distance < 0;
        let auto_flip = self.graphics_state.auto_flip;

        if auto_flip && (cvt_distance >= 0) == negative {
            cvt_distance = -cvt_distance;
        }

        let mut distance = if flags & MRP_ROUND != 0 {
            // round, with the control value winning inside the cut-in
            let cut_in = self.graphics_state.control_value_cut_in;
            if cvt_distance - original_distance < cut_in
                && original_distance - cvt_distance < cut_in
            {
                self.round(cvt_distance)
            } else {
                self.round(original_distance)
            }
        } else {
            cvt_distance
        };

        if flags & MRP_MIN_DIST != 0 {
            if auto_flip {
                distance = self.apply_minimum_distance(distance, negative);
            } else if distance < self.graphics_state.minimum_distance {
                distance = self.graphics_state.minimum_distance;
            }
        }

        distance = self.compensate_for_color(distance, flags & MRP_COLOR)?;

        // a twilight target's original position moves too
        if zone1 == Zone::Twilight {
            let rx = self.point_x(zone0, rp0)?;
            let ry = self.point_y(zone0, rp0)?;
            self.move_point_to_xy(zone1, p, rx, ry)?;
            self.set_twilight_original_xy(p, rx, ry)?;
            self.move_twilight_original(p, rp0_position + distance)?;
        }

        self.move_point(zone1, p, rp0_position + distance)?;

        self.graphics_state.rp[1] = rp0;
        self.graphics_state.rp[2] = p;
        if flags & MRP_SET_RP0 != 0 {
            self.graphics_state.rp[0] = p;
        }
        Ok(())
    }

    /*** Alignment and interpolation ***/

    fn align(&mut self) -> HintingResult<()> {
        let rp0 = self.reference_point(0);
        let zone0 = self.zone_pointer(0);
        let zone1 = self.zone_pointer(1);

        let count = self.take_loop_count();
        for _ in 0..count {
            let p = self.pop()?;
            let target = self.point_projection(zone0, rp0)?;
            self.move_point(zone1, p, target)?;
        }
        Ok(())
    }

    fn isect(&mut self) -> HintingResult<()> {
        let b1 = self.pop()?;
        let b0 = self.pop()?;
        let a1 = self.pop()?;
        let a0 = self.pop()?;
        let p = self.pop()?;

        let zone2 = self.zone_pointer(2);
        let zone1 = self.zone_pointer(1);
        let zone0 = self.zone_pointer(0);

        let xa = self.point_x(zone1, a0)?;
        let ya = self.point_y(zone1, a0)?;
        let dxa = self.point_x(zone1, a1)? - xa;
        let dya = self.point_y(zone1, a1)? - ya;

        let xb = self.point_x(zone0, b0)?;
        let yb = self.point_y(zone0, b0)?;
        let dxb = self.point_x(zone0, b1)? - xb;
        let dyb = self.point_y(zone0, b1)? - yb;

        let denominator = fixed_mul(dxb, dya) - fixed_mul(dxa, dyb);
        if denominator == 0 {
            // parallel: the centroid of the four line ends
            let x = fixed_div_by_int(xa + xb + fixed_div_by_int(dxa + dxb, 2), 2);
            let y = fixed_div_by_int(ya + yb + fixed_div_by_int(dya + dyb, 2), 2);
            return self.move_point_to_xy(zone2, p, x, y);
        }

        let x = fixed_div(
            -fixed_mul(fixed_mul(xb, dxa), dyb) + fixed_mul(fixed_mul(dxa, dxb), yb)
                - fixed_mul(fixed_mul(dxa, dxb), ya)
                + fixed_mul(fixed_mul(xa, dxb), dya),
            denominator,
        );
        let y = fixed_div(
            fixed_mul(fixed_mul(dxb, dya), yb) - fixed_mul(fixed_mul(dxa, ya), dyb)
                - fixed_mul(fixed_mul(xb, dya), dyb)
                + fixed_mul(fixed_mul(xa, dya), dyb),
            denominator,
        );

        self.move_point_to_xy(zone2, p, x, y)
    }

    fn alignpts(&mut self) -> HintingResult<()> {
        let p1 = self.pop()?;
        let p2 = self.pop()?;
        let zone0 = self.zone_pointer(0);
        let zone1 = self.zone_pointer(1);

        let target = fixed_div_by_int(
            self.point_projection(zone1, p1)? + self.point_projection(zone0, p2)?,
            2,
        );
        self.move_point(zone1, p1, target)?;
        self.move_point(zone0, p2, target)
    }

    fn ip(&mut self) -> HintingResult<()> {
        let count = self.take_loop_count();
        for _ in 0..count {
            let p = self.pop()?;
            let zone0 = self.zone_pointer(0);
            let zone1 = self.zone_pointer(1);
            let zone2 = self.zone_pointer(2);
            let rp1 = self.reference_point(1);
            let rp2 = self.reference_point(2);

            let original1 = self.original_projection(zone0, rp1, true)?;
            let original2 = self.original_projection(zone1, rp2, true)?;
            let original_position = self.original_projection(zone2, p, true)?;
            let current1 = self.point_projection(zone0, rp1)?;
            let current2 = self.point_projection(zone1, rp2)?;

            // the reference points may coincide; fall back to the midpoint
            let target = if original1 == original2 {
                fixed_div_by_int(current1 + current2, 2)
            } else {
                current1
                    + fixed_div(
                        fixed_mul(original_position - original1, current2 - current1),
                        original2 - original1,
                    )
            };
            self.move_point(zone2, p, target)?;
        }
        Ok(())
    }

    fn utp(&mut self) -> HintingResult<()> {
        if self.zone_pointer(0) != Zone::Glyph {
            return Err(HintingErrorKind::InvalidZonePointer { value: 0 }.into());
        }
        if self.state != Some(ProgramKind::Glyph) {
            return Err(HintingErrorKind::WrongProgramContext.into());
        }
        let p = self.pop()?;
        let freedom = self.graphics_state.freedom_vector;
        let i = self.point_index(Zone::Glyph, p)?;
        if freedom.x.to_bits() != 0 {
            self.points[i].touched_x = false;
        }
        if freedom.y.to_bits() != 0 {
            self.points[i].touched_y = false;
        }
        Ok(())
    }

    fn iup(&mut self, x: bool) -> HintingResult<()> {
        if self.zone_pointer(2) != Zone::Glyph {
            return Err(HintingErrorKind::InvalidZonePointer { value: 0 }.into());
        }
        if self.state != Some(ProgramKind::Glyph) {
            return Err(HintingErrorKind::WrongProgramContext.into());
        }

        let axis = if x { Axis::X } else { Axis::Y };
        let contour_points = self.points.len().saturating_sub(4);
        interpolate_untouched(&mut self.points[..contour_points], axis);
        Ok(())
    }

    /*** Deltas ***/

    fn delta_base_for_variant(&self, variant: u8) -> u32 {
        self.graphics_state.delta_base + 16 * (variant as u32 - 1)
    }

    /// Decodes a delta selector against the current pixel-per-em; the
    /// matched magnitude is in 2^-delta_shift pixel steps.
    fn delta_amount(&self, arg: i32, base: u32, ppem: u32) -> Option<F26Dot6> {
        if ppem != base.wrapping_add(((arg >> 4) & 0x0F) as u32) {
            return None;
        }
        let magnitude = arg & 0x0F;
        let magnitude = if magnitude <= 7 {
            magnitude - 8
        } else {
            magnitude - 7
        };
        let shift = self.graphics_state.delta_shift.min(31);
        Some(F26Dot6::from_bits(
            ((magnitude as i64 * 64) >> shift) as i32,
        ))
    }

    fn deltap(&mut self, variant: u8) -> HintingResult<()> {
        let count = self.pop()?;
        let zone = self.zone_pointer(0);
        let base = self.delta_base_for_variant(variant);
        let ppem = self.measured_ppem()?;

        for _ in 0..count.max(0) {
            let p = self.pop()?;
            let arg = self.pop()?;
            if let Some(amount) = self.delta_amount(arg, base, ppem) {
                self.shift_point(zone, p, amount, true)?;
            }
        }
        Ok(())
    }

    fn deltac(&mut self, variant: u8) -> HintingResult<()> {
        let count = self.pop()?;
        let base = self.delta_base_for_variant(variant);
        let ppem = self.measured_ppem()?;

        for _ in 0..count.max(0) {
            let location = self.pop()?;
            let arg = self.pop()?;
            if let Some(amount) = self.delta_amount(arg, base, ppem) {
                let value = self.cvt_value(location)? + amount;
                self.set_cvt_value_pixels(location, value)?;
            }
        }
        Ok(())
    }

    /*** Stack manipulation ***/

    fn dup(&mut self) -> HintingResult<()> {
        let element = self.pop()?;
        self.push(element);
        self.push(element);
        Ok(())
    }

    fn swap(&mut self) -> HintingResult<()> {
        let e2 = self.pop()?;
        let e1 = self.pop()?;
        self.push(e2);
        self.push(e1);
        Ok(())
    }

    fn cindex(&mut self) -> HintingResult<()> {
        let k = self.pop()?;
        let element = self.nth_from_top(k.wrapping_sub(1))?;
        self.push(element);
        Ok(())
    }

    fn mindex(&mut self) -> HintingResult<()> {
        let k = self.pop()?;
        let element = self.remove_nth_from_top(k.wrapping_sub(1))?;
        self.push(element);
        Ok(())
    }

    fn roll(&mut self) -> HintingResult<()> {
        let a = self.pop()?;
        let b = self.pop()?;
        let c = self.pop()?;
        self.push(b);
        self.push(a);
        self.push(c);
        Ok(())
    }

    /*** Arithmetic and logic ***/

    fn compare(&mut self, predicate: fn(i32, i32) -> bool) -> HintingResult<()> {
        let e2 = self.pop()?;
        let e1 = self.pop()?;
        self.push_bool(predicate(e1, e2));
        Ok(())
    }

    fn odd(&mut self) -> HintingResult<()> {
        let n = self.pop_fixed()?;
        let rounded = self.round(n);
        self.push_bool((rounded.to_bits() >> 6) & 1 == 1);
        Ok(())
    }

    fn even(&mut self) -> HintingResult<()> {
        let n = self.pop_fixed()?;
        let rounded = self.round(n);
        self.push_bool((rounded.to_bits() >> 6) & 1 == 0);
        Ok(())
    }

    fn and(&mut self) -> HintingResult<()> {
        let e2 = self.pop()?;
        let e1 = self.pop()?;
        self.push_bool(e1 != 0 && e2 != 0);
        Ok(())
    }

    fn or(&mut self) -> HintingResult<()> {
        let e2 = self.pop()?;
        let e1 = self.pop()?;
        self.push_bool(e1 != 0 || e2 != 0);
        Ok(())
    }

    fn not(&mut self) -> HintingResult<()> {
        let e = self.pop()?;
        self.push_bool(e == 0);
        Ok(())
    }

    fn add(&mut self) -> HintingResult<()> {
        let n1 = self.pop()?;
        let n2 = self.pop()?;
        self.push(n2.wrapping_add(n1));
        Ok(())
    }

    fn sub(&mut self) -> HintingResult<()> {
        let n1 = self.pop()?;
        let n2 = self.pop()?;
        self.push(n2.wrapping_sub(n1));
        Ok(())
    }

    fn div(&mut self) -> HintingResult<()> {
        let n1 = self.pop_fixed()?;
        let n2 = self.pop_fixed()?;
        if n1 == 0 {
            return Err(HintingErrorKind::DivisionByZero.into());
        }
        self.push_fixed(fixed_div_unrounded(n2, n1));
        Ok(())
    }

    fn mul(&mut self) -> HintingResult<()> {
        let n1 = self.pop_fixed()?;
        let n2 = self.pop_fixed()?;
        self.push_fixed(fixed_mul(n1, n2));
        Ok(())
    }

    fn abs(&mut self) -> HintingResult<()> {
        let n = self.pop()?;
        self.push(n.wrapping_abs());
        Ok(())
    }

    fn neg(&mut self) -> HintingResult<()> {
        let n = self.pop()?;
        self.push(n.wrapping_neg());
        Ok(())
    }

    fn floor(&mut self) -> HintingResult<()> {
        let n = self.pop()?;
        self.push(n & !0x3F);
        Ok(())
    }

    fn ceiling(&mut self) -> HintingResult<()> {
        let n = self.pop()?;
        self.push(n.wrapping_add(0x3F) & !0x3F);
        Ok(())
    }

    fn max(&mut self) -> HintingResult<()> {
        let n1 = self.pop()?;
        let n2 = self.pop()?;
        self.push(n1.max(n2));
        Ok(())
    }

    fn min(&mut self) -> HintingResult<()> {
        let n1 = self.pop()?;
        let n2 = self.pop()?;
        self.push(n1.min(n2));
        Ok(())
    }

    fn round_value(&mut self, color: u8) -> HintingResult<()> {
        let n = self.pop_fixed()?;
        let n = self.compensate_for_color(n, color)?;
        let rounded = self.round(n);
        self.push_fixed(rounded);
        Ok(())
    }

    fn no_round(&mut self, color: u8) -> HintingResult<()> {
        let n = self.pop_fixed()?;
        let n = self.compensate_for_color(n, color)?;
        self.push_fixed(n);
        Ok(())
    }

    fn getinfo(&mut self) -> HintingResult<()> {
        let selector = self.pop()?;
        let mut result = 0;
        if selector & 0x01 != 0 {
            result |= GETINFO_VERSION;
        }
        // rotation and stretching are never reported
        if selector & 0x20 != 0 && self.greyscale() {
            result |= GETINFO_GREYSCALE;
        }
        self.push(result);
        Ok(())
    }
}

/// MDRP/MIRP flag bit: make the moved point the new rp0.
pub(crate) const MRP_SET_RP0: u8 = 0x10;
/// MDRP/MIRP flag bit: keep the distance at least the minimum distance.
pub(crate) const MRP_MIN_DIST: u8 = 0x08;
/// MDRP/MIRP flag bit: round the distance.
pub(crate) const MRP_ROUND: u8 = 0x04;
/// MDRP/MIRP flag bits: distance color (grey, black, white).
pub(crate) const MRP_COLOR: u8 = 0x03;

/// A single decoded instruction.
///
/// Opcodes that pack a variant into their low bits (the axis, perpendicular,
/// round and color selectors, the MDRP/MIRP flag nibbles) are decoded into
/// fields here, and all four push forms collapse into [`Instruction::Push`]
/// with the immediate payload already extracted, so the interpreter never
/// looks at raw bytes again after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Pushes the decoded immediate values. PUSHB and NPUSHB payloads were
    /// zero-extended, PUSHW and NPUSHW payloads sign-extended.
    Push(Vec<i32>),

    /// Pops a storage location and pushes the value stored there. Reading a
    /// location no program has written is an error.
    ReadStore,

    /// Pops a value and a storage location and writes the value there.
    WriteStore,

    /// Pops a value in pixels (26.6) and a CVT location and writes the value
    /// there, remembering the pixel-per-em it was written at.
    WriteCvtInPixels,

    /// Pops a value in font units and a CVT location and writes the value
    /// there; the value scales with the pixel-per-em on every read.
    WriteCvtInFontUnits,

    /// Pops a CVT location and pushes the entry's value scaled to the
    /// current pixel-per-em along the projection vector.
    ReadCvt,

    /// Sets both the freedom and the projection vector to the given
    /// coordinate axis.
    SetVectorsToAxis { x: bool },

    SetProjectionToAxis { x: bool },

    SetFreedomToAxis { x: bool },

    /// Pops two point numbers and sets the projection vector parallel (or
    /// perpendicular) to the line through them.
    SetProjectionToLine { perpendicular: bool },

    /// Pops two point numbers and sets the freedom vector parallel (or
    /// perpendicular) to the line through them.
    SetFreedomToLine { perpendicular: bool },

    /// Sets the freedom vector to the current projection vector.
    SetFreedomToProjection,

    /// Like `SetProjectionToLine`, but the dual projection vector is set
    /// from the *original* positions of the two points while the projection
    /// vector is set from their current positions. The one instruction that
    /// leaves the two projection vectors different.
    SetDualProjectionToLine { perpendicular: bool },

    /// Pops y then x as raw 2.14 components and sets the projection vector.
    /// The components are normalized before they are stored.
    SetProjectionFromStack,

    SetFreedomFromStack,

    /// Pushes the projection vector's x and y components as 2.14 values.
    GetProjectionVector,

    GetFreedomVector,

    /// Pops a point number into reference point 0, 1 or 2.
    SetReferencePoint(u8),

    /// Pops a zone number (0 or 1) into zone pointer 0, 1 or 2.
    SetZonePointer(u8),

    /// Pops one zone number into all three zone pointers.
    SetZonePointers,

    RoundToHalfGrid,
    RoundToGrid,
    RoundToDoubleGrid,
    RoundDownToGrid,
    RoundUpToGrid,
    RoundOff,

    /// Pops a packed period/phase/threshold descriptor and sets a custom
    /// round state with a one-pixel base period.
    SuperRound,

    /// As `SuperRound` with a √2/2-pixel base period, for measuring along
    /// a diagonal.
    SuperRound45,

    /// Pops the repeat count consumed by the loop-driven instructions.
    SetLoop,

    SetMinimumDistance,

    /// Pops a selector mask and a value and folds them into the
    /// instruction-control word.
    InstructionControl,

    /// Dropout-control setup for a rasterizer. Pops its operand; this
    /// processor keeps no dropout state.
    ScanConversionControl,

    /// As `ScanConversionControl`.
    ScanType,

    SetCvtCutIn,

    SetSingleWidthCutIn,

    /// Pops the single width value as a 16.16 quantity.
    SetSingleWidth,

    SetAutoFlip { on: bool },

    /// Pops the first pixel-per-em targeted by the delta instructions.
    SetDeltaBase,

    /// Pops the exponent selecting the delta step, 2^-shift pixels.
    SetDeltaShift,

    /// Pops a point number and pushes its current (or original) coordinate
    /// along the projection vector. The original coordinate is measured
    /// along the dual projection vector.
    GetCoordinate { original: bool },

    /// Pops a coordinate and a point number and moves the point there.
    SetCoordinateFromStack,

    /// Pops two point numbers and pushes the distance between them along
    /// the projection vector, current or original.
    MeasureDistance { original: bool },

    /// Pushes the pixel-per-em along the projection vector.
    MeasurePpem,

    /// Pushes the point size.
    MeasurePointSize,

    /// Pops `loop` point numbers and toggles their on-curve flags.
    FlipPoint,

    /// Pops a range of point numbers and makes them all on-curve (or all
    /// off-curve).
    FlipRange { on: bool },

    /// Pops `loop` point numbers and shifts each by the amount the
    /// reference point has moved from its original position.
    ShiftPoint { use_rp1: bool },

    /// Pops a contour number and shifts every point of that contour by the
    /// amount the reference point has moved. The reference point itself
    /// stays put when it lies on the contour.
    ShiftContour { use_rp1: bool },

    /// Pops a zone number and shifts that zone's points by the amount the
    /// reference point has moved, without touching them. Phantom points are
    /// left alone.
    ShiftZone { use_rp1: bool },

    /// Pops a pixel amount and `loop` point numbers and shifts each point
    /// by that amount along the freedom vector.
    ShiftPointByPixels,

    /// Pops a distance and a point number and moves the point until it is
    /// that distance from rp0. In the twilight zone the point's original
    /// position is rewritten as well.
    MoveStackIndirectRelativePoint { set_rp0: bool },

    /// Pops a point number and touches the point, optionally snapping it to
    /// its own rounded position. The point becomes rp0 and rp1.
    MoveDirectAbsolutePoint { round: bool },

    /// Pops a CVT location and a point number and moves the point to the
    /// control value, with the cut-in test when rounding is requested. In
    /// the twilight zone the original position becomes the unrounded
    /// control value and the cut-in test is skipped.
    MoveIndirectAbsolutePoint { round: bool },

    /// Pops a point number and moves it so its distance from rp0 matches
    /// the distance between their original positions, subject to the
    /// single-width substitution, optional rounding, the minimum distance,
    /// and color compensation, as selected by the flag bits.
    MoveDirectRelativePoint { flags: u8 },

    /// As `MoveDirectRelativePoint`, except that the target distance comes
    /// from a popped CVT location (sign-flipped to match the measured
    /// distance when auto-flip is on, and gated by the cut-in when
    /// rounding). In the twilight zone the original position is rewritten
    /// as well.
    MoveIndirectRelativePoint { flags: u8 },

    /// Pops `loop` point numbers and moves each to rp0's position along
    /// the projection vector.
    AlignToReferencePoint,

    /// Pops a point number and two line segments (four point numbers) and
    /// moves the point to the intersection of the lines. Parallel lines put
    /// the point in the middle of the four.
    MoveToIntersection,

    /// Pops two point numbers and moves both to the midpoint of their
    /// projections.
    AlignPoints,

    /// Pops `loop` point numbers and moves each to preserve its original
    /// ratio between rp1 and rp2.
    InterpolatePoint,

    /// Pops a point number and clears its touch flags on the freedom
    /// vector's axes.
    UntouchPoint,

    /// Interpolates the untouched points of every contour between their
    /// touched neighbors, along one axis.
    InterpolateUntouchedPoints { x: bool },

    /// Pops a count and that many (point, selector) pairs; each selector
    /// encodes a pixel-per-em and a magnitude, and matching points are
    /// shifted by the magnitude. The variant offsets the delta base by 0,
    /// 16 or 32.
    DeltaP { variant: u8 },

    /// As `DeltaP`, but adjusts CVT entries instead of moving points.
    DeltaC { variant: u8 },

    Dup,
    Pop,
    ClearStack,
    Swap,
    Depth,

    /// Pops k and pushes a copy of the k-th stack element, counted from the
    /// top starting at 1.
    CopyIndex,

    /// Pops k and moves the k-th stack element to the top.
    MoveIndex,

    /// Cyclic rotate of the top three stack elements.
    Roll,

    /// Pops a condition; when false, skips to the matching ELSE or EIF.
    If,

    /// Marks the end of the taken IF branch: skips to the matching EIF.
    Else,

    /// No-op; the terminator the IF/ELSE scans look for.
    EndIf,

    JumpRelativeOnTrue,

    /// Pops a byte offset, relative to this instruction, and jumps there.
    Jump,

    JumpRelativeOnFalse,

    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,

    /// Rounds the popped 26.6 value, then tests the low bit of its integer
    /// part.
    Odd,
    Even,

    And,
    Or,
    Not,

    Add,
    Subtract,

    /// 26.6 division of the lower element by the top, truncated.
    Divide,

    Multiply,
    AbsoluteValue,
    Negate,

    /// Truncates at the 6-bit boundary; floors, so negative values move
    /// down.
    Floor,

    Ceiling,
    Max,
    Min,

    /// Rounds the popped value with color compensation applied first.
    Round { color: u8 },

    /// Color compensation without rounding.
    NoRound { color: u8 },

    /// Pops a function id and binds it to the instructions up to the next
    /// ENDF. Redefinition is an error.
    FunctionDef,

    /// Returns from the function being executed.
    EndFunctionDef,

    /// Pops a function id and calls it.
    Call,

    /// Pops a function id and a count and calls the function that many
    /// times.
    LoopCall,

    /// User-defined instructions are not supported.
    InstructionDef,

    /// Pops a selector and pushes the engine information it asks for:
    /// version number, and the greyscale flag.
    GetInfo,
}

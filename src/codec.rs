use std::fmt::{Display, Formatter};

use crate::board::{Board, Label};
use crate::location::{Dimension, Location};
use crate::logic::Var;

/// Reasons a [`VarCodec`] cannot be constructed. Detected before any compilation happens;
/// identifiers from an under-sized codec would silently collide.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CodecError {
    /// A field width cannot represent the largest value the field must carry.
    FieldTooNarrow {
        /// Which field: `"column"`, `"row"`, or `"label"`.
        field: &'static str,
        /// The configured width, in decimal digits.
        width: u32,
        /// The largest value the field must hold.
        max_value: usize,
    },
    /// The combined field widths exceed what a 64-bit magnitude can carry.
    WidthOverflow {
        /// Total decimal digits requested, including the leading digit.
        total: u32,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldTooNarrow { field, width, max_value } => {
                write!(f, "{} field of {} digit(s) cannot hold values up to {}", field, width, max_value)
            }
            Self::WidthOverflow { total } => {
                write!(f, "{} total digits do not fit in a 64-bit variable magnitude", total)
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Reasons a fact cannot be encoded: the inputs lie outside the codec's configured domain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    /// The location lies outside the board the codec was configured for.
    OutOfBounds(Location),
    /// The label lies outside the configured label space.
    LabelOutOfRange {
        /// The offending label.
        label: Label,
        /// Size of the configured label space.
        label_count: usize,
    },
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds(location) => write!(f, "location {:?} is out of bounds", location),
            Self::LabelOutOfRange { label, label_count } => {
                write!(f, "label {} outside label space of size {}", label, label_count)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Reasons a variable magnitude cannot be decoded, indicating a mis-paired codec/board
/// combination or a variable the codec never issued.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The magnitude does not carry this codec's leading digit and field widths.
    ForeignMagnitude(u64),
    /// The fields parsed, but name a cell or label outside the configured domain.
    OutOfRange {
        /// The decoded location.
        location: Location,
        /// The decoded label.
        label: Label,
    },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForeignMagnitude(magnitude) => {
                write!(f, "magnitude {} does not match the codec's field layout", magnitude)
            }
            Self::OutOfRange { location, label } => {
                write!(f, "decoded fact ({:?}, {}) is outside the configured domain", location, label)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// The bijection between puzzle facts and satisfiability variables.
///
/// The proposition "the cell at location `(x, y)` holds label `n`" is packed into a decimal
/// magnitude `1·X…X·Y…Y·N…N`: a constant leading `1` (so the printed integer is positive and
/// never starts with a misleading zero) followed by fixed-width fields for column, row, and
/// label. Injectivity holds because every valid field value fits its width, which is validated
/// at construction rather than assumed.
#[derive(Clone, Copy, Debug)]
pub struct VarCodec {
    dims: (Dimension, Dimension),
    label_count: usize,
    col_width: u32,
    row_width: u32,
    label_width: u32,
}

fn pow10(exp: u32) -> u64 {
    10u64.pow(exp)
}

fn digits_for(max_value: usize) -> u32 {
    let mut digits = 1;
    let mut bound = 10u64;
    while max_value as u64 >= bound {
        digits += 1;
        bound *= 10;
    }
    digits
}

impl VarCodec {
    /// Construct a codec with explicit field widths (column, row, label order).
    ///
    /// Fails fast with [`CodecError::FieldTooNarrow`] if any width cannot represent its
    /// field's maximum value for this board and label range.
    pub fn new(
        dims: (Dimension, Dimension),
        label_count: usize,
        widths: (u32, u32, u32),
    ) -> Result<Self, CodecError> {
        let (col_width, row_width, label_width) = widths;

        let checks = [
            ("column", col_width, dims.0.get() - 1),
            ("row", row_width, dims.1.get() - 1),
            ("label", label_width, label_count.saturating_sub(1)),
        ];
        for (field, width, max_value) in checks {
            if width == 0 || max_value as u64 >= pow10(width) {
                return Err(CodecError::FieldTooNarrow { field, width, max_value });
            }
        }

        let total = 1 + col_width + row_width + label_width;
        // 10^18 < 2^63; anything wider would overflow the signed boundary form
        if total > 18 {
            return Err(CodecError::WidthOverflow { total });
        }

        Ok(Self { dims, label_count, col_width, row_width, label_width })
    }

    /// Construct a codec sized to `board`: each field width is computed from the actual board
    /// dimensions and label range, so no hardcoded width silently caps supported sizes.
    pub fn for_board(board: &Board) -> Result<Self, CodecError> {
        let dims = board.dims();
        let label_count = board.label_count();

        Self::new(dims, label_count, (
            digits_for(dims.0.get() - 1),
            digits_for(dims.1.get() - 1),
            digits_for(label_count.saturating_sub(1)),
        ))
    }

    /// Size of the label space this codec covers.
    pub fn label_count(&self) -> usize {
        self.label_count
    }

    fn base(&self) -> u64 {
        pow10(self.col_width + self.row_width + self.label_width)
    }

    /// Encode the fact "`location` holds `label`" as a variable.
    ///
    /// Deterministic and total over the valid domain; apply polarity afterwards with
    /// [`Var::lit`](crate::logic::Var::lit) and friends.
    pub fn encode(&self, location: Location, label: Label) -> Result<Var, EncodeError> {
        if location.0 >= self.dims.0.get() || location.1 >= self.dims.1.get() {
            return Err(EncodeError::OutOfBounds(location));
        }
        if label >= self.label_count {
            return Err(EncodeError::LabelOutOfRange { label, label_count: self.label_count });
        }

        let magnitude = self.base()
            + location.0 as u64 * pow10(self.row_width + self.label_width)
            + location.1 as u64 * pow10(self.label_width)
            + label as u64;

        Ok(Var::new(magnitude))
    }

    /// Decode a variable back into the fact it encodes; the exact left inverse of
    /// [`encode`](Self::encode). Operates on magnitudes, so polarity never matters here.
    pub fn decode(&self, var: Var) -> Result<(Location, Label), DecodeError> {
        let magnitude = var.magnitude();

        // the magnitude must have exactly 1 + col + row + label digits, leading digit 1
        let base = self.base();
        if !(base..2 * base).contains(&magnitude) {
            return Err(DecodeError::ForeignMagnitude(magnitude));
        }

        let fields = magnitude - base;
        let label = (fields % pow10(self.label_width)) as Label;
        let y = (fields / pow10(self.label_width) % pow10(self.row_width)) as usize;
        let x = (fields / pow10(self.label_width + self.row_width)) as usize;
        let location = Location(x, y);

        if x >= self.dims.0.get() || y >= self.dims.1.get() || label >= self.label_count {
            return Err(DecodeError::OutOfRange { location, label });
        }

        Ok((location, label))
    }
}

use std::collections::HashMap;
use std::num::NonZero;

use crate::board::{Board, Label};
use crate::location::{Dimension, Location};

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug)]
pub enum BuilderInvalidReason {
    /// A number was placed outside the bounds specified by `dims` on a builder.
    FeatureOutOfBounds,
}

/// A builder for rectangular [`Board`]s.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at
/// some point. Textual puzzle-instance parsing is a caller concern; callers feed the parsed
/// records through [`number`](Self::number).
#[derive(Clone)]
pub struct BoardBuilder {
    // width, height
    dims: (Dimension, Dimension),
    numbers: HashMap<Location, Label>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::new(5).unwrap(), NonZero::new(5).unwrap()))
    }
}

impl BoardBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(x, y)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            numbers: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    /// Fix the number `label` at `location`. Placing a second number on the same location
    /// replaces the first.
    ///
    /// May cause the builder to enter a
    /// [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if
    /// `location` is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn number(&mut self, location: Location, label: Label) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if location.0 >= self.dims.0.get() || location.1 >= self.dims.1.get() {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        self.numbers.insert(location, label);
        self
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has
    /// arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Board`].
    /// If the builder is invalid for any reason, a reference to a [`Vec`] of
    /// [`BuilderInvalidReason`] will indicate why.
    pub fn build(&self) -> Result<Board, &Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(&self.invalid_reasons);
        }

        Ok(Board {
            dims: self.dims,
            numbers: self.numbers.clone(),
        })
    }
}

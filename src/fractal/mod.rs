//! The fractal array
//!
//! A recursive, offset-addressed array of slots. Each level holds up to
//! [`MAX_SLOTS`] slots; a slot at the leaf level stores an element, a slot at
//! any higher level stores a child array covering `1 << shift` positions.
//! Large arrays have the same structure as small ones, one level up.
//!
//! Addressing resolves `(index + offset) & (capacity - 1)`, so moving the
//! offset rotates the whole array in O(1). Inserting or removing at an
//! arbitrary position shifts elements towards the closer end; whole children
//! crossed by a shift are rotated by adjusting their own offset instead of
//! moving their elements.

mod array;

pub use array::{FractalArray, MAX_SLOTS, MIN_CAPACITY, SHIFT};

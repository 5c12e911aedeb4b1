use std::{fmt, ops::Deref};

/// Errors that can occur while allocating or addressing wires and gates
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The wire store has no room for the requested allocation
    #[error("Wire store full: capacity is {capacity}, requested {requested} more")]
    WireCapacityExceeded { capacity: usize, requested: usize },
    /// The gate store has no room for another gate
    #[error("Gate store full: capacity is {capacity}")]
    GateCapacityExceeded { capacity: usize },
    /// Wire handle at or beyond the current wire count
    #[error("Invalid wire {wire}: only {wire_count} wires allocated")]
    InvalidWire { wire: WireId, wire_count: usize },
    /// Paired buses of different widths
    #[error("Bus width mismatch: expected {expected}, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    /// Integer view over more than 64 wires
    #[error("Wire range of {len} bits does not fit in a u64")]
    RangeTooWide { len: usize },
}
pub type CircuitError = Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(pub usize);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for WireId {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl WireId {
    pub fn offset(self, by: usize) -> WireId {
        WireId(self.0 + by)
    }
}

/// A contiguous span of wires carrying a multi-bit value.
///
/// Bit `i` of the value lives on `first + i`, least-significant bit first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WireRange {
    pub first: WireId,
    pub len: usize,
}

impl WireRange {
    pub fn new(first: WireId, len: usize) -> Self {
        Self { first, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wire carrying bit `index`. Panics when `index` is outside the range.
    pub fn bit(&self, index: usize) -> WireId {
        assert!(
            index < self.len,
            "bit {index} out of range for a {}-bit bus",
            self.len
        );
        self.first.offset(index)
    }

    pub fn iter(self) -> impl Iterator<Item = WireId> {
        let first = self.first;
        (0..self.len).map(move |index| first.offset(index))
    }

    /// Checks that `other` has the same width as `self`.
    pub fn check_width(&self, other: &WireRange) -> Result<(), Error> {
        if self.len == other.len {
            Ok(())
        } else {
            Err(Error::WidthMismatch {
                expected: self.len,
                actual: other.len,
            })
        }
    }
}

/// Mask covering the low `bits` bits of a u64.
pub fn mask(bits: usize) -> u64 {
    match bits {
        0 => 0,
        64.. => u64::MAX,
        _ => (1u64 << bits) - 1,
    }
}

//! Errors raised while building circuits, writing signals, and generating text.

use thiserror::Error;

use crate::bitarray::MismatchedBitsizes;

/// Errors raised while constructing signals or components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A bit index is negative or not below the bitsize of the signal it selects from.
    #[error("bit index {index} is out of range for a {bitsize}-bit signal")]
    IndexOutOfRange {
        /// The offending index.
        index: i64,
        /// Bitsize of the source signal.
        bitsize: u8
    },

    /// The combined width of a concatenation exceeds [`BitArray::MAX_BITSIZE`].
    ///
    /// [`BitArray::MAX_BITSIZE`]: crate::bitarray::BitArray::MAX_BITSIZE
    #[error("combined bitsize {bitsize} exceeds the maximum bitsize")]
    WidthOverflow {
        /// The total width that was requested.
        bitsize: u32
    },

    /// A signal was declared with a bitsize larger than [`BitArray::MAX_BITSIZE`].
    ///
    /// [`BitArray::MAX_BITSIZE`]: crate::bitarray::BitArray::MAX_BITSIZE
    #[error("bitsize {0} exceeds the maximum bitsize")]
    InvalidBitsize(u32),

    /// A signal key does not belong to the circuit.
    #[error("signal does not exist in this circuit")]
    UnknownSignal
}

/// Errors raised when writing a value into a signal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The signal is the output of a component and can only be written by it.
    #[error("signal `{0}` is driven by a component and cannot be assigned")]
    NotAssignable(String),

    /// The value does not have the signal's bitsize.
    #[error(transparent)]
    Bitsize(#[from] MismatchedBitsizes),

    /// The signal key does not belong to the circuit.
    #[error("signal does not exist in this circuit")]
    UnknownSignal
}

/// Errors raised while generating the textual form of a component.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextFormError {
    /// The provided text references do not match the component's input ports.
    #[error("malformed input references: {0}")]
    MalformedInputs(#[from] Malformed)
}

/// Ways a set of text references can fail to match a component's inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// The number of references differs from the number of input ports.
    #[error("expected {expected} reference(s), found {found}")]
    Count {
        /// Number of input ports.
        expected: usize,
        /// Number of references provided.
        found: usize
    },
    /// No reference was provided for the named input port.
    #[error("no reference for input port `{0}`")]
    MissingPort(String)
}

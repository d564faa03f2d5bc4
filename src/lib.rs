#![warn(missing_docs)]
//! Wiring components for CircuitSim-style signal graphs.
//!
//! This crate provides two combinational components which recompute their output
//! synchronously whenever one of their inputs is written:
//! - [`RangeExtractor`](func::RangeExtractor): selects a range of bits from one signal,
//!   reversing them if the range is given high-to-low.
//! - [`Concatenator`](func::Concatenator): joins several signals into one,
//!   the first signal occupying the most significant bits.
//!
//! Both can also be written out as hardware-description expressions
//! (see [`Component::to_text_form`](func::Component::to_text_form)).
//!
//! ```
//! use circuitsim_wiring::bitarray::BitArray;
//! use circuitsim_wiring::circuit::Circuit;
//!
//! let mut circuit = Circuit::new();
//! let a = circuit.add_input("a", BitArray::from_u64(0b10, 2));
//! let b = circuit.add_input("b", BitArray::from_u64(0b011, 3));
//! let swizzle = circuit.concatenate(&[a, b], None).unwrap();
//! assert_eq!(circuit.value(swizzle.output()), BitArray::from_u64(0b10011, 5));
//!
//! let refs = circuit.signal_refs(swizzle.key());
//! assert_eq!(circuit.text_form(swizzle.key(), &refs).unwrap(), "{a,b}");
//! ```

pub mod bitarray;
pub mod circuit;
pub mod config;
pub mod error;
pub mod func;

/// Initialize the tracing subscriber for logging.
///
/// The `RUST_LOG` environment variable takes precedence over `level`.
///
/// ```rust,ignore
/// circuitsim_wiring::init_logging(&config.log_level);
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}

//! Combinational wiring components.
//!
//! This module defines the components which can be placed in a [`Circuit`]
//! as well as the traits and structures needed to describe and run them.
//!
//! ## This module notably consists of:
//! - **[`Component`]**: The interface for all components, defining their ports,
//!   how their output is computed, and how they are written out as text.
//! - **[`PortType`] and [`PortProperties`]**: Descriptions of a component's ports.
//! - **[`RangeExtractor`] and [`Concatenator`]**: The bit-selection and bit-concatenation components.
//!
//! [`Circuit`]: crate::circuit::Circuit
use enum_dispatch::enum_dispatch;

use crate::bitarray::BitArray;
use crate::error::{Malformed, TextFormError};

pub use wiring::*;

mod wiring;
#[cfg(test)]
mod tests_text_form;

/// The type of ports available for a component.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
pub enum PortType {
    /// A port which reads a signal.
    Input,
    /// A port which drives a signal.
    Output
}

/// The properties of a port of a component.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Debug)]
pub struct PortProperties {
    /// Type of the port.
    pub ty: PortType,
    /// Size of the data the port works with in bits.
    pub bitsize: u8,
    /// Base name of the port.
    ///
    /// The node owning the component derives a unique port name from this.
    pub name: &'static str
}

/// The interface defining how a combinational component operates.
///
/// A component has a fixed list of input ports followed by exactly one output port.
/// Its output is a pure function of its current inputs.
#[enum_dispatch]
pub trait Component {
    /// Returns the properties of all ports of the component:
    /// every input port in registration order, then the output port.
    ///
    /// It is assumed that the result of this function will not change when called multiple times.
    fn ports(&self) -> Vec<PortProperties>;

    /// Computes the output value from the current value of every input port
    /// (in registration order).
    ///
    /// This may panic if `inputs` do not match the port properties
    /// specified by [`Component::ports`].
    #[must_use]
    fn run(&self, inputs: &[BitArray]) -> BitArray {
        self.validate_inputs(inputs);
        self.run_inner(inputs)
    }

    /// Inner run function, wrapped by [`Component::run`] to ensure input validation.
    fn run_inner(&self, inputs: &[BitArray]) -> BitArray;

    /// Writes the component out as a hardware-description expression.
    ///
    /// `refs` holds the textual reference for every input port, in registration order.
    fn to_text_form(&self, refs: &[&str]) -> Result<String, TextFormError>;

    /// Validates inputs to ensure all ports match port bitsize.
    fn validate_inputs(&self, inputs: &[BitArray]) {
        // Only run in debug mode
        if cfg!(debug_assertions) {
            let port_props: Vec<_> = self.ports().into_iter()
                .filter(|p| p.ty == PortType::Input)
                .collect();
            debug_assert_eq!(inputs.len(), port_props.len(), "Expected correct number of inputs");
            for (i, (value, port)) in std::iter::zip(inputs, port_props).enumerate() {
                debug_assert_eq!(
                    value.len(),
                    port.bitsize,
                    "Input {i} has incorrect bit width"
                );
            }
        }
    }
}

/// An enum that represents all supported components.
#[enum_dispatch(Component)]
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
#[allow(missing_docs)]
pub enum ComponentFn {
    RangeExtractor, Concatenator
}

/// Helper function to more easily define port lists (for [`Component::ports`]).
fn port_list(config: &[(PortProperties, u8)]) -> Vec<PortProperties> {
    config.iter()
        .flat_map(|&(props, ct)| std::iter::repeat_n(props, usize::from(ct)))
        .collect()
}

/// Checks that exactly `expected` text references were provided.
fn expect_refs(refs: &[&str], expected: usize) -> Result<(), TextFormError> {
    match refs.len() == expected {
        true => Ok(()),
        false => Err(Malformed::Count { expected, found: refs.len() }.into())
    }
}

/// Writes a concatenation literal, listing `parts` from most to least significant.
fn concat_literal<S: AsRef<str>>(parts: impl IntoIterator<Item = S>) -> String {
    let mut text = String::from("{");
    for (i, part) in parts.into_iter().enumerate() {
        if i != 0 {
            text.push(',');
        }
        text.push_str(part.as_ref());
    }
    text.push('}');
    text
}

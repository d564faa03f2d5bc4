//! Circuit module used to build signal graphs out of wiring components.

pub mod graph;
pub mod names;
pub mod state;

use std::collections::HashMap;

use crate::bitarray::BitArray;
use crate::circuit::graph::{CircuitGraph, FunctionKey, FunctionNode, SignalKey};
use crate::circuit::state::CircuitState;
use crate::config::SimConfig;
use crate::error::{BuildError, TextFormError, WriteError};
use crate::func::{Component, ComponentFn, Concatenator, RangeExtractor};

/// A circuit, which includes its structure ([`CircuitGraph`]) and its state ([`CircuitState`]).
///
/// Signals are created with [`Circuit::add_signal`] or [`Circuit::add_input`] and
/// combined with [`Circuit::extract_range`] and [`Circuit::concatenate`].
/// Writing a signal with [`Circuit::set`] synchronously recomputes everything downstream of it.
///
/// ```
/// use circuitsim_wiring::bitarray::BitArray;
/// use circuitsim_wiring::circuit::Circuit;
///
/// let mut circuit = Circuit::new();
/// let bus = circuit.add_input("bus", BitArray::from_u64(0b0011_0100, 8));
/// let subset = circuit.extract_range(bus, 5, 2, None).unwrap();
/// assert_eq!(circuit.value(subset.output()), BitArray::from_u64(0b1011, 4));
///
/// circuit.set(bus, BitArray::from_u64(0b0010_0000, 8)).unwrap();
/// assert_eq!(circuit.value(subset.output()), BitArray::from_u64(0b0001, 4));
/// ```
#[derive(Debug, Default)]
pub struct Circuit {
    graph: CircuitGraph,
    state: CircuitState,
    config: SimConfig
}

/// Handle to a [`RangeExtractor`] node in a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeNode {
    key: FunctionKey,
    input: SignalKey,
    output: SignalKey
}
impl RangeNode {
    /// The function node.
    pub fn key(&self) -> FunctionKey {
        self.key
    }
    /// The signal bits are selected from.
    pub fn input(&self) -> SignalKey {
        self.input
    }
    /// The signal holding the selected bits.
    pub fn output(&self) -> SignalKey {
        self.output
    }
}

/// Handle to a [`Concatenator`] node in a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcatNode {
    key: FunctionKey,
    inputs: Vec<SignalKey>,
    output: SignalKey
}
impl ConcatNode {
    /// The function node.
    pub fn key(&self) -> FunctionKey {
        self.key
    }
    /// The concatenated signals, from most to least significant.
    pub fn inputs(&self) -> &[SignalKey] {
        &self.inputs
    }
    /// The signal holding the concatenation.
    pub fn output(&self) -> SignalKey {
        self.output
    }
}

impl Circuit {
    /// Creates an empty circuit with the default configuration.
    pub fn new() -> Self {
        Default::default()
    }
    /// Creates an empty circuit with the given configuration.
    pub fn with_config(config: SimConfig) -> Self {
        Self { config, ..Default::default() }
    }

    /// Creates a floating signal with the specified name and bitsize.
    ///
    /// The name is made unique within the circuit (`a`, `a_1`, ...).
    pub fn add_signal(&mut self, name: &str, bitsize: u8) -> Result<SignalKey, BuildError> {
        if bitsize > BitArray::MAX_BITSIZE {
            return Err(BuildError::InvalidBitsize(u32::from(bitsize)));
        }
        let key = self.graph.add_signal(name, bitsize);
        self.state.init_value(key, BitArray::floating(bitsize));
        Ok(key)
    }

    /// Creates a signal initialized to the passed value.
    pub fn add_input(&mut self, name: &str, value: BitArray) -> SignalKey {
        let key = self.graph.add_signal(name, value.len());
        self.state.init_value(key, value);
        key
    }

    /// Creates a [`RangeExtractor`] selecting bits `start..=end` of `source`.
    ///
    /// If `start > end`, the selected bits are reversed.
    /// This fails with [`BuildError::IndexOutOfRange`] if either index
    /// is negative or not below the bitsize of `source`.
    pub fn extract_range(&mut self, source: SignalKey, start: i64, end: i64, name: Option<&str>) -> Result<RangeNode, BuildError> {
        let bitsize = self.bitsize_of(source)?;
        let func = RangeExtractor::new(bitsize, start, end)?;
        tracing::debug!(source = %self.graph[source].name, start, end, "creating range extractor");

        let (key, output) = self.add_function_node(name.unwrap_or("subset"), func.into(), &[source]);
        Ok(RangeNode { key, input: source, output })
    }

    /// Creates a [`Concatenator`] joining `sources`, with `sources[0]` in the most significant bits.
    ///
    /// This fails with [`BuildError::WidthOverflow`] if the combined bitsize
    /// exceeds [`BitArray::MAX_BITSIZE`].
    pub fn concatenate(&mut self, sources: &[SignalKey], name: Option<&str>) -> Result<ConcatNode, BuildError> {
        let bitsizes = sources.iter()
            .map(|&s| self.bitsize_of(s))
            .collect::<Result<Vec<_>, _>>()?;
        let func = Concatenator::new(&bitsizes)?;
        tracing::debug!(n_inputs = sources.len(), bitsize = func.get_bitsize(), "creating concatenator");

        // Ports are registered least significant first.
        let registered: Vec<_> = sources.iter().rev().copied().collect();
        let (key, output) = self.add_function_node(name.unwrap_or("swizzle"), func.into(), &registered);
        Ok(ConcatNode { key, inputs: sources.to_vec(), output })
    }

    fn bitsize_of(&self, key: SignalKey) -> Result<u8, BuildError> {
        self.graph.get_signal(key)
            .map(|s| s.bitsize)
            .ok_or(BuildError::UnknownSignal)
    }

    /// Adds a function node reading `inputs` (in registration order),
    /// creates its output signal, and computes its initial output.
    fn add_function_node(&mut self, name: &str, func: ComponentFn, inputs: &[SignalKey]) -> (FunctionKey, SignalKey) {
        let name = self.graph.allocate_function_name(name);
        let out_props = func.ports()
            .pop()
            .expect("component to have an output port");
        let output = self.graph.add_signal(&format!("{name}.{}", out_props.name), out_props.bitsize);
        self.state.init_value(output, BitArray::floating(out_props.bitsize));

        let links: Vec<_> = inputs.iter().copied().chain([output]).collect();
        let key = self.graph.add_function(FunctionNode::new(name, func, &links));

        self.state.recompute(&self.graph, key, self.config.notify_unchanged);
        self.propagate();
        (key, output)
    }

    /// Writes a value to a signal and propagates the change through the circuit.
    ///
    /// This raises `Err` if the signal is driven by a component
    /// or if the bitsizes do not match.
    pub fn set(&mut self, key: SignalKey, value: BitArray) -> Result<(), WriteError> {
        let signal = self.graph.get_signal(key).ok_or(WriteError::UnknownSignal)?;
        if signal.driver.is_some() {
            return Err(WriteError::NotAssignable(signal.name.clone()));
        }
        let mut current = self.state.value(key);
        current.replace(value)?;

        self.state.write(key, value, self.config.notify_unchanged);
        self.propagate();
        Ok(())
    }

    /// Delivers any pending change notifications.
    fn propagate(&mut self) {
        self.state.propagate(&self.graph, self.config.notify_unchanged);
        debug_assert!(self.state.transient.resolved(), "Expected all notifications to be delivered");
    }

    /// Gets the current value of a signal.
    ///
    /// Panics if the signal is not in this circuit.
    pub fn value(&self, key: SignalKey) -> BitArray {
        self.state.value(key)
    }
    /// Gets current circuit state.
    pub fn state(&self) -> &CircuitState {
        &self.state
    }
    /// Gets the circuit's structure.
    pub fn graph(&self) -> &CircuitGraph {
        &self.graph
    }
    /// Gets the circuit's configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
    /// Finds a signal by name.
    pub fn signal(&self, name: &str) -> Option<SignalKey> {
        self.graph.signal_by_name(name)
    }
    /// Finds a function node by name.
    pub fn function(&self, name: &str) -> Option<FunctionKey> {
        self.graph.function_by_name(name)
    }

    /// Writes a function node out as a hardware-description expression,
    /// using `refs` to map each input port name to its textual reference.
    ///
    /// Panics if the function node is not in this circuit.
    pub fn text_form(&self, key: FunctionKey, refs: &HashMap<String, String>) -> Result<String, TextFormError> {
        self.graph[key].to_text_form(refs)
    }
    /// Builds the reference map for a function node which refers to each input
    /// by the name of the signal bound to it.
    ///
    /// Panics if the function node is not in this circuit.
    pub fn signal_refs(&self, key: FunctionKey) -> HashMap<String, String> {
        self.graph[key].inputs()
            .map(|p| (p.name.clone(), self.graph[p.signal].name.clone()))
            .collect()
    }
}

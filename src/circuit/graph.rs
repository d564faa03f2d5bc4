//! Types for describing the structure of a circuit.
//!
//! This module notably includes:
//! - [`CircuitGraph`]: The main structure for a circuit
//! - [`SignalNode`]: Nodes which represent signals (wires)
//! - [`FunctionNode`]: Nodes which represent components

use std::collections::HashMap;
use std::ops::Index;

use slotmap::{SlotMap, new_key_type};

use crate::circuit::names::NameAllocator;
use crate::error::{Malformed, TextFormError};
use crate::func::{Component, ComponentFn, PortProperties, PortType};

new_key_type! {
    /// Key type for maps to signals.
    pub struct SignalKey;
    /// Key type for maps to functions.
    pub struct FunctionKey;
}

/// A node which represents a named, fixed-width signal.
#[derive(Debug)]
pub struct SignalNode {
    pub(crate) name: String,
    pub(crate) bitsize: u8,
    /// The function node which computes this signal, if any.
    ///
    /// Driven signals can only be written by their driver.
    pub(crate) driver: Option<FunctionKey>,
    /// Function nodes which are recomputed whenever this signal is written.
    pub(crate) subscribers: Vec<FunctionKey>
}
impl SignalNode {
    /// Creates a new undriven signal node.
    pub fn new(name: String, bitsize: u8) -> Self {
        Self { name, bitsize, driver: None, subscribers: vec![] }
    }

    /// The name of the signal.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The bitsize of the signal.
    pub fn bitsize(&self) -> u8 {
        self.bitsize
    }
    /// The function node driving this signal (or `None` if it can be assigned externally).
    pub fn driver(&self) -> Option<FunctionKey> {
        self.driver
    }
    /// Function nodes subscribed to changes of this signal.
    pub fn subscribers(&self) -> &[FunctionKey] {
        &self.subscribers
    }
}

/// A named port of a function node, bound to a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Name of the port, unique within its function node.
    pub name: String,
    /// The properties of the port.
    pub props: PortProperties,
    /// The signal the port reads or drives.
    pub signal: SignalKey
}

/// A node which represents a component.
///
/// Its port table is fixed at construction:
/// every input port in registration order, followed by the output port.
#[derive(Debug)]
pub struct FunctionNode {
    pub(crate) name: String,
    /// The actual function that is applied.
    pub(crate) func: ComponentFn,
    pub(crate) ports: Vec<Port>
}
impl FunctionNode {
    /// Creates a new function node, binding each of the component's ports
    /// (in [`Component::ports`] order) to the corresponding signal in `links`.
    pub fn new(name: String, func: ComponentFn, links: &[SignalKey]) -> Self {
        let props = func.ports();
        debug_assert_eq!(props.len(), links.len(), "Expected one signal per port");

        let mut names = NameAllocator::new();
        let ports = std::iter::zip(props, links)
            .map(|(props, &signal)| Port { name: names.allocate(props.name), props, signal })
            .collect();

        Self { name, func, ports }
    }

    /// The name of the function node.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The component function of this node.
    pub fn func(&self) -> &ComponentFn {
        &self.func
    }
    /// All ports of this node.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }
    /// The input ports of this node, in registration order.
    pub fn inputs(&self) -> impl DoubleEndedIterator<Item = &Port> + ExactSizeIterator {
        let n = self.ports.len().saturating_sub(1);
        self.ports[..n].iter()
    }
    /// The output port of this node.
    pub fn output(&self) -> &Port {
        let port = &self.ports[self.ports.len() - 1];
        debug_assert_eq!(port.props.ty, PortType::Output, "Expected output port last");
        port
    }
    /// Looks up a port by name.
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Writes the node's component out as a hardware-description expression.
    ///
    /// `refs` maps the name of every input port to its textual reference.
    /// This fails with [`TextFormError::MalformedInputs`] if `refs` has a different
    /// number of entries than there are input ports, or lacks an input port's name.
    pub fn to_text_form(&self, refs: &HashMap<String, String>) -> Result<String, TextFormError> {
        let expected = self.inputs().len();
        if refs.len() != expected {
            return Err(Malformed::Count { expected, found: refs.len() }.into());
        }

        let ordered = self.inputs()
            .map(|p| {
                refs.get(&p.name)
                    .map(String::as_str)
                    .ok_or_else(|| Malformed::MissingPort(p.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.func.to_text_form(&ordered)
    }
}

/// A circuit structure.
#[derive(Default, Debug)]
pub struct CircuitGraph {
    /// All signal nodes of the circuit.
    pub(crate) signals: SlotMap<SignalKey, SignalNode>,
    /// All function nodes of the circuit.
    pub(crate) functions: SlotMap<FunctionKey, FunctionNode>,
    signal_names: NameAllocator,
    function_names: NameAllocator
}
impl CircuitGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a new signal node to the graph and returns its key.
    ///
    /// The name is made unique within the circuit.
    pub fn add_signal(&mut self, name: &str, bitsize: u8) -> SignalKey {
        let name = self.signal_names.allocate(name);
        self.signals.insert(SignalNode::new(name, bitsize))
    }

    /// Allocates a unique name for a function node.
    pub(crate) fn allocate_function_name(&mut self, name: &str) -> String {
        self.function_names.allocate(name)
    }

    /// Adds a function node to the graph, marking it as the driver of its output signal
    /// and subscribing it to each of its distinct input signals.
    pub(crate) fn add_function(&mut self, node: FunctionNode) -> FunctionKey {
        let output = node.output().signal;
        let mut inputs: Vec<_> = node.inputs().map(|p| p.signal).collect();
        inputs.sort_unstable();
        inputs.dedup();

        let key = self.functions.insert(node);
        debug_assert!(self.signals[output].driver.is_none(), "Signal already has a driver");
        self.signals[output].driver = Some(key);
        for signal in inputs {
            self.signals[signal].subscribers.push(key);
        }
        key
    }

    /// Finds a signal by name.
    pub fn signal_by_name(&self, name: &str) -> Option<SignalKey> {
        self.signals.iter()
            .find(|(_, s)| s.name == name)
            .map(|(k, _)| k)
    }
    /// Finds a function node by name.
    pub fn function_by_name(&self, name: &str) -> Option<FunctionKey> {
        self.functions.iter()
            .find(|(_, f)| f.name == name)
            .map(|(k, _)| k)
    }

    /// Gets a signal node, or `None` if the key is not in this graph.
    pub fn get_signal(&self, key: SignalKey) -> Option<&SignalNode> {
        self.signals.get(key)
    }
}

impl Index<SignalKey> for CircuitGraph {
    type Output = SignalNode;

    fn index(&self, index: SignalKey) -> &Self::Output {
        &self.signals[index]
    }
}
impl Index<FunctionKey> for CircuitGraph {
    type Output = FunctionNode;

    fn index(&self, index: FunctionKey) -> &Self::Output {
        &self.functions[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::{Concatenator, RangeExtractor};

    fn refs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_port_names() {
        let mut graph = CircuitGraph::new();
        let sigs: Vec<_> = (0..4).map(|_| graph.add_signal("s", 1)).collect();
        let out = graph.add_signal("out", 3);

        let func = Concatenator::new(&[1, 1, 1]).unwrap().into();
        let node = FunctionNode::new("swizzle".to_string(), func, &[sigs[2], sigs[1], sigs[0], out]);
        let names: Vec<_> = node.ports().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["in", "in_1", "in_2", "swizzle"]);
        assert_eq!(node.port("in_1").map(|p| p.signal), Some(sigs[1]));
        assert_eq!(node.output().signal, out);
        assert!(node.port("missing").is_none());
    }

    #[test]
    fn test_signal_names_unique() {
        let mut graph = CircuitGraph::new();
        let a = graph.add_signal("a", 1);
        let a1 = graph.add_signal("a", 2);
        assert_eq!(graph[a].name(), "a");
        assert_eq!(graph[a1].name(), "a_1");
        assert_eq!(graph.signal_by_name("a_1"), Some(a1));
    }

    #[test]
    fn test_add_function_links() {
        let mut graph = CircuitGraph::new();
        let a = graph.add_signal("a", 2);
        let out = graph.add_signal("out", 4);

        let func = Concatenator::new(&[2, 2]).unwrap().into();
        let node = FunctionNode::new("swizzle".to_string(), func, &[a, a, out]);
        let key = graph.add_function(node);

        assert_eq!(graph[out].driver(), Some(key));
        assert_eq!(graph[a].subscribers(), &[key], "Duplicate inputs subscribe once");
        assert_eq!(graph[a].driver(), None);
    }

    #[test]
    fn test_text_form_refs() {
        let mut graph = CircuitGraph::new();
        let a = graph.add_signal("a", 8);
        let out = graph.add_signal("out", 4);
        let func = RangeExtractor::new(8, 5, 2).unwrap().into();
        let node = FunctionNode::new("subset".to_string(), func, &[a, out]);

        assert_eq!(node.to_text_form(&refs(&[("original", "a")])).unwrap(), "{a[2],a[3],a[4],a[5]}");
        assert_eq!(
            node.to_text_form(&refs(&[("source", "a")])),
            Err(TextFormError::MalformedInputs(Malformed::MissingPort("original".to_string())))
        );
        assert_eq!(
            node.to_text_form(&refs(&[("original", "a"), ("subset", "b")])),
            Err(TextFormError::MalformedInputs(Malformed::Count { expected: 1, found: 2 }))
        );
        assert_eq!(
            node.to_text_form(&refs(&[])),
            Err(TextFormError::MalformedInputs(Malformed::Count { expected: 1, found: 0 }))
        );
    }
}

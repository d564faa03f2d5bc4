//! Module which contains data about circuit state.
//!
//! This notably includes types which hold the state within a circuit, such as:
//! - [`CircuitState`]: The state in a circuit
//! - [`ValueState`]: The state of a signal

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use slotmap::SecondaryMap;
use slotmap::secondary::Entry;

use crate::bitarray::BitArray;
use crate::circuit::graph::{CircuitGraph, FunctionKey, SignalKey};
use crate::func::Component;

/// The state of the circuit.
///
/// This includes all signal values and any change notifications waiting to be delivered.
#[derive(Default, Debug)]
pub struct CircuitState {
    pub(crate) values: SecondaryMap<SignalKey, ValueState>,
    pub(crate) transient: TransientState
}
impl CircuitState {
    /// Creates a new empty CircuitState.
    pub fn new() -> Self {
        Default::default()
    }

    /// Initializes a signal's state in this CircuitState.
    pub(crate) fn init_value(&mut self, key: SignalKey, value: BitArray) {
        if let Some(Entry::Vacant(e)) = self.values.entry(key) {
            e.insert(ValueState::new(value));
        }
    }

    /// Gets the current value of a signal.
    ///
    /// Panics if the signal is not in this state.
    pub fn value(&self, key: SignalKey) -> BitArray {
        self[key].get_value()
    }
    /// Gets the number of writes a signal has received (including its initial computation, if derived).
    ///
    /// Panics if the signal is not in this state.
    pub fn writes(&self, key: SignalKey) -> u64 {
        self[key].get_writes()
    }

    /// Writes a value to a signal and queues a change notification for its subscribers.
    ///
    /// If `notify_unchanged` is false, writing a value equal to the current value
    /// does not queue a notification.
    ///
    /// This does **not** propagate the change; see [`CircuitState::propagate`].
    pub(crate) fn write(&mut self, key: SignalKey, value: BitArray, notify_unchanged: bool) {
        let state = &mut self[key];
        debug_assert_eq!(state.value.len(), value.len(), "Expected value to have matching bitsize");

        let changed = state.value != value;
        state.value = value;
        state.writes += 1;

        if changed || notify_unchanged {
            self.transient.pending.push_back(key);
        }
    }

    /// Recomputes a function node from the current values of its inputs and writes its output.
    pub(crate) fn recompute(&mut self, graph: &CircuitGraph, gate: FunctionKey, notify_unchanged: bool) {
        let node = &graph[gate];
        let inputs: Vec<_> = node.inputs()
            .map(|p| self.value(p.signal))
            .collect();
        let value = node.func.run(&inputs);

        tracing::trace!(node = %node.name, %value, "recomputed");
        self.write(node.output().signal, value, notify_unchanged);
    }

    /// Delivers queued change notifications, recomputing every subscriber of each changed signal,
    /// until no notifications remain.
    ///
    /// Notifications are delivered in the order they were queued, one recomputation per
    /// subscriber per notification. Since every function node's inputs exist before its output,
    /// the graph has no cycles and this always terminates.
    pub fn propagate(&mut self, graph: &CircuitGraph, notify_unchanged: bool) {
        while let Some(signal) = self.transient.pending.pop_front() {
            tracing::trace!(signal = %graph[signal].name, "delivering change notification");
            for &gate in &graph[signal].subscribers {
                self.recompute(graph, gate, notify_unchanged);
            }
        }
    }
}

impl Index<SignalKey> for CircuitState {
    type Output = ValueState;

    fn index(&self, index: SignalKey) -> &Self::Output {
        &self.values[index]
    }
}
impl IndexMut<SignalKey> for CircuitState {
    fn index_mut(&mut self, index: SignalKey) -> &mut Self::Output {
        &mut self.values[index]
    }
}

/// The state of a [`SignalNode`].
///
/// [`SignalNode`]: crate::circuit::graph::SignalNode
#[derive(Debug)]
pub struct ValueState {
    pub(crate) value: BitArray,
    writes: u64
}
impl ValueState {
    /// Creates a new ValueState from the given [`BitArray`].
    pub fn new(value: BitArray) -> Self {
        Self { value, writes: 0 }
    }

    /// Gets the bit value in the state.
    pub fn get_value(&self) -> BitArray {
        self.value
    }
    /// Gets the number of writes this state has received.
    pub fn get_writes(&self) -> u64 {
        self.writes
    }
}

#[derive(Default, Debug)]
pub(crate) struct TransientState {
    pub(crate) pending: VecDeque<SignalKey>
}
impl TransientState {
    pub fn resolved(&self) -> bool {
        self.pending.is_empty()
    }
}

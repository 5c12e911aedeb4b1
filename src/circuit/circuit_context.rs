use crate::{Circuit, Gate, WireId, WireRange};

/// A trait defining the context for circuit construction and wire management.
///
/// Every composition function in [`crate::gadgets`] is generic over this
/// trait. It provides the two operations a component needs to describe
/// itself:
///
/// - Wire allocation for intermediate signals
/// - Gate addition, in evaluation order
///
/// ## Ordering contract
///
/// Gates are evaluated in the order they are added. A component must add a
/// gate only after the gates that drive its inputs, otherwise a single
/// evaluation pass reads stale values. Feedback loops (latches) are the one
/// deliberate exception and need several passes to settle.
///
/// ## Usage Example
///
/// ```rust
/// use gate_sim::{Circuit, CircuitContext, Gate};
///
/// let mut circuit = Circuit::new();
///
/// let a = circuit.issue_wire();
/// let b = circuit.issue_wire();
/// let out = circuit.issue_wire();
/// circuit.add_gate(Gate::nand(a, b, out));
///
/// circuit.set_wire(a, true);
/// circuit.set_wire(b, true);
/// circuit.simulate();
/// assert!(!circuit.get_wire(out));
/// ```
pub trait CircuitContext {
    /// Allocates a new wire and returns its identifier.
    ///
    /// Each call returns a handle never returned before within the
    /// circuit's current lifetime.
    fn issue_wire(&mut self) -> WireId;

    /// Allocates `count` contiguous wires.
    fn issue_wires(&mut self, count: usize) -> WireRange;

    /// Appends a gate to the evaluation order.
    ///
    /// # Parameters
    ///
    /// * `gate` - The gate to add; all its wires must already be allocated
    fn add_gate(&mut self, gate: Gate);
}

impl CircuitContext for Circuit {
    fn issue_wire(&mut self) -> WireId {
        self.add_wire()
    }

    fn issue_wires(&mut self, count: usize) -> WireRange {
        self.add_wires(count)
    }

    fn add_gate(&mut self, gate: Gate) {
        Circuit::add_gate(self, gate)
    }
}

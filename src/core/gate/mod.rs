use crate::WireId;

/// The two primitive gate kinds every component is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// `wire_c := !(wire_a && wire_b)`
    Nand,
    /// `wire_c := wire_a` while `wire_b` is high, otherwise no write
    TriState,
}

/// A primitive gate referencing up to two input wires and one output wire.
///
/// For [`GateKind::TriState`] `wire_a` is the input, `wire_b` the enable
/// and `wire_c` the driven output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gate {
    pub wire_a: WireId,
    pub wire_b: WireId,
    pub wire_c: WireId,
    pub kind: GateKind,
}

impl Gate {
    pub fn new(kind: GateKind, wire_a: WireId, wire_b: WireId, wire_c: WireId) -> Self {
        Self {
            wire_a,
            wire_b,
            wire_c,
            kind,
        }
    }

    pub fn nand(wire_a: WireId, wire_b: WireId, wire_c: WireId) -> Self {
        Self::new(GateKind::Nand, wire_a, wire_b, wire_c)
    }

    pub fn tri_state(input: WireId, enable: WireId, output: WireId) -> Self {
        Self::new(GateKind::TriState, input, enable, output)
    }

    pub fn inputs(&self) -> [WireId; 2] {
        [self.wire_a, self.wire_b]
    }

    /// Output value for the given inputs, or `None` when the gate leaves
    /// its output undriven.
    pub fn execute(&self, a: bool, b: bool) -> Option<bool> {
        match self.kind {
            GateKind::Nand => Some(!(a && b)),
            GateKind::TriState => b.then_some(a),
        }
    }

    /// Recomputes this gate's output in place.
    ///
    /// Wire handles must already be validated against `wires`.
    pub(crate) fn evaluate(&self, wires: &mut [bool]) {
        let a = wires[self.wire_a.0];
        let b = wires[self.wire_b.0];
        if let Some(out) = self.execute(a, b) {
            wires[self.wire_c.0] = out;
        }
    }
}

/// Gate footprint of a circuit, by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateCount {
    pub nand: usize,
    pub tri_state: usize,
}

impl GateCount {
    pub fn total(&self) -> usize {
        self.nand + self.tri_state
    }
}

#[cfg(test)]
mod tests;

use log::{debug, error, trace};
use rand::Rng;

use crate::core::{
    gate::{Gate, GateCount, GateKind},
    wire::{CircuitError, WireId, WireRange, mask},
};

pub const DEFAULT_WIRE_CAPACITY: usize = 65536;
pub const DEFAULT_GATE_CAPACITY: usize = 65536;

/// Store limits for a [`Circuit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitConfig {
    pub wire_capacity: usize,
    pub gate_capacity: usize,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            wire_capacity: DEFAULT_WIRE_CAPACITY,
            gate_capacity: DEFAULT_GATE_CAPACITY,
        }
    }
}

/// Wire store plus gate store.
///
/// Wires hold all circuit state, gates hold all circuit structure. Gates are
/// evaluated strictly in the order they were added, so a combinational
/// network settles in one [`Circuit::simulate`] pass only when every gate is
/// added after the gates driving its inputs. Feedback loops need repeated
/// passes.
///
/// Misuse (full stores, stale handles, oversized integer views) is fatal on
/// the plain API. The `try_*` methods report the same conditions as
/// [`CircuitError`].
#[derive(Debug)]
pub struct Circuit {
    config: CircuitConfig,
    wires: Vec<bool>,
    gates: Vec<Gate>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

#[track_caller]
fn or_fatal<T>(result: Result<T, CircuitError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!("fatal circuit error: {err}");
            panic!("{err}")
        }
    }
}

impl Circuit {
    pub fn new() -> Self {
        Self::with_config(CircuitConfig::default())
    }

    pub fn with_config(config: CircuitConfig) -> Self {
        Self {
            config,
            wires: Vec::with_capacity(config.wire_capacity),
            gates: Vec::with_capacity(config.gate_capacity),
        }
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    // ――― Reset ―――

    /// Drops every wire and gate. Previously issued handles become invalid.
    pub fn reset(&mut self) {
        debug!(
            "reset circuit: dropping {} wires, {} gates",
            self.wires.len(),
            self.gates.len()
        );
        self.wires.clear();
        self.gates.clear();
    }

    /// Drops every gate but keeps the allocated wires, so the same inputs and
    /// outputs can be rewired with a different network.
    pub fn reset_gates(&mut self) {
        debug!("reset gates: dropping {} gates", self.gates.len());
        self.gates.clear();
    }

    // ――― Wires ―――

    pub fn try_add_wire(&mut self) -> Result<WireId, CircuitError> {
        self.try_add_wires(1).map(|range| range.first)
    }

    pub fn add_wire(&mut self) -> WireId {
        or_fatal(self.try_add_wire())
    }

    pub fn try_add_wires(&mut self, count: usize) -> Result<WireRange, CircuitError> {
        let first = self.wires.len();
        if count > self.config.wire_capacity - first {
            return Err(CircuitError::WireCapacityExceeded {
                capacity: self.config.wire_capacity,
                requested: count,
            });
        }
        self.wires.resize(first + count, false);
        Ok(WireRange::new(WireId(first), count))
    }

    pub fn add_wires(&mut self, count: usize) -> WireRange {
        or_fatal(self.try_add_wires(count))
    }

    pub fn check_wire(&self, wire: WireId) -> Result<(), CircuitError> {
        if wire.0 < self.wires.len() {
            Ok(())
        } else {
            Err(CircuitError::InvalidWire {
                wire,
                wire_count: self.wires.len(),
            })
        }
    }

    fn check_range(&self, range: WireRange) -> Result<(), CircuitError> {
        if range.is_empty() {
            return Ok(());
        }
        self.check_wire(range.bit(range.len() - 1))
    }

    pub fn try_get_wire(&self, wire: WireId) -> Result<bool, CircuitError> {
        self.check_wire(wire)?;
        Ok(self.wires[wire.0])
    }

    pub fn get_wire(&self, wire: WireId) -> bool {
        or_fatal(self.try_get_wire(wire))
    }

    pub fn try_set_wire(&mut self, wire: WireId, bit: bool) -> Result<(), CircuitError> {
        self.check_wire(wire)?;
        self.wires[wire.0] = bit;
        Ok(())
    }

    pub fn set_wire(&mut self, wire: WireId, bit: bool) {
        or_fatal(self.try_set_wire(wire, bit))
    }

    pub fn expect_wire(&self, wire: WireId, expected: bool) -> bool {
        self.get_wire(wire) == expected
    }

    pub fn try_get_wires(&self, range: WireRange) -> Result<u64, CircuitError> {
        if range.len() > 64 {
            return Err(CircuitError::RangeTooWide { len: range.len() });
        }
        self.check_range(range)?;
        Ok(range
            .iter()
            .enumerate()
            .fold(0u64, |acc, (index, wire)| {
                acc | (u64::from(self.wires[wire.0]) << index)
            }))
    }

    /// Reads a bus as an integer, bit 0 from `range.first`.
    pub fn get_wires(&self, range: WireRange) -> u64 {
        or_fatal(self.try_get_wires(range))
    }

    pub fn try_set_wires(&mut self, range: WireRange, bits: u64) -> Result<(), CircuitError> {
        if range.len() > 64 {
            return Err(CircuitError::RangeTooWide { len: range.len() });
        }
        self.check_range(range)?;
        for (index, wire) in range.iter().enumerate() {
            self.wires[wire.0] = (bits >> index) & 1 == 1;
        }
        Ok(())
    }

    /// Drives a bus from an integer. Bits above the bus width are ignored.
    pub fn set_wires(&mut self, range: WireRange, bits: u64) {
        or_fatal(self.try_set_wires(range, bits))
    }

    pub fn expect_wires(&self, range: WireRange, expected: u64) -> bool {
        self.get_wires(range) == expected & mask(range.len())
    }

    // ――― Randomization ―――

    pub fn random_wire(&mut self, wire: WireId, rng: &mut impl Rng) {
        self.set_wire(wire, rng.random());
    }

    pub fn random_wires(&mut self, range: WireRange, rng: &mut impl Rng) {
        or_fatal(self.check_range(range));
        for wire in range.iter() {
            self.wires[wire.0] = rng.random();
        }
    }

    /// Overwrites every allocated wire with a random bit.
    pub fn randomize_wire_state(&mut self, rng: &mut impl Rng) {
        self.wires.iter_mut().for_each(|bit| *bit = rng.random());
    }

    // ――― Gates ―――

    pub fn try_add_gate(&mut self, gate: Gate) -> Result<(), CircuitError> {
        for wire in [gate.wire_a, gate.wire_b, gate.wire_c] {
            self.check_wire(wire)?;
        }
        if self.gates.len() >= self.config.gate_capacity {
            return Err(CircuitError::GateCapacityExceeded {
                capacity: self.config.gate_capacity,
            });
        }
        self.gates.push(gate);
        Ok(())
    }

    pub fn add_gate(&mut self, gate: Gate) {
        or_fatal(self.try_add_gate(gate))
    }

    pub fn gate_counts(&self) -> GateCount {
        self.gates
            .iter()
            .fold(GateCount::default(), |mut count, gate| {
                match gate.kind {
                    GateKind::Nand => count.nand += 1,
                    GateKind::TriState => count.tri_state += 1,
                }
                count
            })
    }

    /// Indices of gates that read a wire driven by a gate at the same or a
    /// later index.
    ///
    /// Empty for a network that settles in a single pass. Feedback
    /// components (latches and everything built on them) always show up.
    pub fn forward_references(&self) -> Vec<usize> {
        let mut last_driver: Vec<Option<usize>> = vec![None; self.wires.len()];
        for (index, gate) in self.gates.iter().enumerate() {
            last_driver[gate.wire_c.0] = Some(index);
        }

        self.gates
            .iter()
            .enumerate()
            .filter(|(index, gate)| {
                gate.inputs()
                    .iter()
                    .any(|wire| last_driver[wire.0].is_some_and(|driver| driver >= *index))
            })
            .map(|(index, _)| index)
            .collect()
    }

    // ――― Evaluation ―――

    /// One pass over every gate, in insertion order.
    ///
    /// Each gate sees the writes of the gates before it in the same pass.
    pub fn simulate(&mut self) {
        for gate in &self.gates {
            gate.evaluate(&mut self.wires);
        }
    }

    /// Runs [`Circuit::simulate`] `passes` times.
    pub fn settle(&mut self, passes: u32) {
        trace!("settle: {passes} passes over {} gates", self.gates.len());
        for _ in 0..passes {
            self.simulate();
        }
    }

    /// Toggles `clock`, then runs `pulse_time` passes.
    pub fn simulate_clock_pulse(&mut self, clock: WireId, pulse_time: u32) {
        let level = self.get_wire(clock);
        self.set_wire(clock, !level);
        self.settle(pulse_time);
    }

    /// Two pulses: one with the clock at each level.
    pub fn simulate_clock_cycle(&mut self, clock: WireId, pulse_time: u32) {
        self.simulate_clock_pulse(clock, pulse_time);
        self.simulate_clock_pulse(clock, pulse_time);
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::test_utils::trng;

    fn small_circuit() -> Circuit {
        Circuit::with_config(CircuitConfig {
            wire_capacity: 4,
            gate_capacity: 2,
        })
    }

    #[test]
    fn wire_handles_are_dense() {
        let mut circuit = Circuit::new();
        assert_eq!(circuit.add_wire(), WireId(0));
        let range = circuit.add_wires(3);
        assert_eq!(range, WireRange::new(WireId(1), 3));
        assert_eq!(circuit.add_wire(), WireId(4));
        assert_eq!(circuit.wire_count(), 5);
    }

    #[test]
    fn wire_capacity_is_reported() {
        let mut circuit = small_circuit();
        circuit.add_wires(3);
        assert_eq!(
            circuit.try_add_wires(2),
            Err(CircuitError::WireCapacityExceeded {
                capacity: 4,
                requested: 2
            })
        );
        assert_eq!(circuit.wire_count(), 3);
        assert_eq!(circuit.try_add_wire(), Ok(WireId(3)));
        assert!(circuit.try_add_wire().is_err());
    }

    #[test]
    #[should_panic(expected = "Wire store full")]
    fn wire_capacity_is_fatal() {
        let mut circuit = small_circuit();
        circuit.add_wires(5);
    }

    #[test]
    #[should_panic(expected = "Gate store full")]
    fn gate_capacity_is_fatal() {
        let mut circuit = small_circuit();
        let a = circuit.add_wire();
        for _ in 0..3 {
            circuit.add_gate(Gate::nand(a, a, a));
        }
    }

    #[test]
    fn stale_handle_after_reset_is_rejected() {
        let mut circuit = Circuit::new();
        let wire = circuit.add_wire();
        circuit.reset();
        assert_eq!(
            circuit.try_get_wire(wire),
            Err(CircuitError::InvalidWire {
                wire,
                wire_count: 0
            })
        );
        assert!(circuit.try_set_wire(wire, true).is_err());
        assert!(circuit.try_add_gate(Gate::nand(wire, wire, wire)).is_err());
    }

    #[test]
    #[should_panic(expected = "Invalid wire 7")]
    fn invalid_handle_is_fatal() {
        let mut circuit = Circuit::new();
        circuit.add_wires(2);
        circuit.get_wire(WireId(7));
    }

    #[test]
    fn reset_gates_keeps_wires() {
        let mut circuit = Circuit::new();
        let a = circuit.add_wire();
        let out = circuit.add_wire();
        circuit.add_gate(Gate::nand(a, a, out));
        circuit.reset_gates();
        assert_eq!(circuit.gate_count(), 0);
        assert_eq!(circuit.wire_count(), 2);
        circuit.set_wire(a, true);
        assert!(circuit.get_wire(a));
    }

    #[test]
    fn integer_views_round_trip() {
        let mut circuit = Circuit::new();
        let bus = circuit.add_wires(12);
        circuit.set_wires(bus, 0xABC);
        assert_eq!(circuit.get_wires(bus), 0xABC);
        assert!(circuit.get_wire(bus.bit(2)));
        assert!(!circuit.get_wire(bus.bit(0)));
        assert!(circuit.expect_wires(bus, 0xFABC));

        let wide = circuit.add_wires(64);
        circuit.set_wires(wide, u64::MAX);
        assert_eq!(circuit.get_wires(wide), u64::MAX);
    }

    #[test]
    fn integer_view_rejects_wide_range() {
        let mut circuit = Circuit::new();
        let bus = circuit.add_wires(65);
        assert_eq!(
            circuit.try_get_wires(bus),
            Err(CircuitError::RangeTooWide { len: 65 })
        );
    }

    #[test]
    fn randomize_only_touches_live_wires() {
        let mut circuit = Circuit::new();
        let bus = circuit.add_wires(64);
        let mut rng = trng();
        circuit.randomize_wire_state(&mut rng);
        let first = circuit.get_wires(bus);
        circuit.randomize_wire_state(&mut rng);
        assert_ne!(first, circuit.get_wires(bus));
        assert_eq!(circuit.wire_count(), 64);
    }

    #[test]
    fn simulate_ripples_in_insertion_order() {
        let mut circuit = Circuit::new();
        let input = circuit.add_wire();
        let chain = circuit.add_wires(4);
        circuit.add_gate(Gate::nand(input, input, chain.bit(0)));
        for index in 1..chain.len() {
            let prev = chain.bit(index - 1);
            circuit.add_gate(Gate::nand(prev, prev, chain.bit(index)));
        }

        circuit.set_wire(input, true);
        circuit.simulate();
        assert_eq!(circuit.get_wires(chain), 0b1010);
        assert!(circuit.forward_references().is_empty());
    }

    #[test]
    fn reversed_order_needs_more_passes() {
        let mut circuit = Circuit::new();
        let input = circuit.add_wire();
        let mid = circuit.add_wire();
        let out = circuit.add_wire();
        // out := !mid appended before mid := !input
        circuit.add_gate(Gate::nand(mid, mid, out));
        circuit.add_gate(Gate::nand(input, input, mid));
        assert_eq!(circuit.forward_references(), vec![0]);

        circuit.set_wire(input, false);
        circuit.set_wire(mid, false);
        circuit.set_wire(out, false);
        circuit.simulate();
        assert!(circuit.get_wire(mid));
        assert!(circuit.get_wire(out), "stale read of mid");
        circuit.simulate();
        assert!(!circuit.get_wire(out));
    }

    #[test]
    fn clock_pulse_toggles_and_cycle_restores() {
        let mut circuit = Circuit::new();
        let clock = circuit.add_wire();
        circuit.set_wire(clock, false);
        circuit.simulate_clock_pulse(clock, 1);
        assert!(circuit.get_wire(clock));
        circuit.simulate_clock_cycle(clock, 3);
        assert!(circuit.get_wire(clock));
    }

    #[test]
    fn gate_counts_by_kind() {
        let mut circuit = Circuit::new();
        let wires = circuit.add_wires(3);
        circuit.add_gate(Gate::nand(wires.bit(0), wires.bit(1), wires.bit(2)));
        circuit.add_gate(Gate::tri_state(wires.bit(0), wires.bit(1), wires.bit(2)));
        circuit.add_gate(Gate::nand(wires.bit(0), wires.bit(0), wires.bit(1)));
        assert_eq!(
            circuit.gate_counts(),
            GateCount {
                nand: 2,
                tri_state: 1
            }
        );
    }
}

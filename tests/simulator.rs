use gate_sim::{
    Circuit, CircuitConfig, CircuitContext, CircuitError, Gate, GateCount, WireId, WireRange,
    gadgets::{
        alu, d_flip_flop, d_latch, full_adder, half_adder,
        memory::{RAM_MIN_READ_PASSES, RAM_MIN_WRITE_PASSES},
        ram256, register,
    },
    harness::{Console, HarnessConfig, run_suite},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use test_log::test;

fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Records the gates a component adds instead of owning storage itself.
#[derive(Default)]
struct Recorder {
    next_wire: usize,
    gates: Vec<Gate>,
}

impl CircuitContext for Recorder {
    fn issue_wire(&mut self) -> WireId {
        self.next_wire += 1;
        WireId(self.next_wire - 1)
    }

    fn issue_wires(&mut self, count: usize) -> WireRange {
        let first = WireId(self.next_wire);
        self.next_wire += count;
        WireRange::new(first, count)
    }

    fn add_gate(&mut self, gate: Gate) {
        self.gates.push(gate);
    }
}

#[test]
fn gadgets_build_the_same_network_on_any_context() {
    let mut recorder = Recorder::default();
    let mut circuit = Circuit::new();

    let a = recorder.issue_wires(16);
    let b = recorder.issue_wires(16);
    let sum = recorder.issue_wires(16);
    let carry = recorder.issue_wire();
    half_adder(&mut recorder, a, b, sum, carry);

    let a = circuit.issue_wires(16);
    let b = circuit.issue_wires(16);
    let sum = circuit.issue_wires(16);
    let carry = circuit.issue_wire();
    half_adder(&mut circuit, a, b, sum, carry);

    assert_eq!(recorder.gates.as_slice(), circuit.gates());
    assert_eq!(recorder.next_wire, circuit.wire_count());
}

#[test]
fn combinational_gadgets_are_ordered_latches_are_not() {
    let mut circuit = Circuit::new();
    let a = circuit.add_wires(8);
    let b = circuit.add_wires(8);
    let subtract_op = circuit.add_wire();
    let out = circuit.add_wires(8);
    let carry = circuit.add_wire();
    alu(&mut circuit, a, b, subtract_op, out, carry);
    assert!(circuit.forward_references().is_empty());

    let mut circuit = Circuit::new();
    let [data, enable, out, not_out] = [(); 4].map(|_| circuit.add_wire());
    d_latch(&mut circuit, data, enable, out, not_out);
    assert!(!circuit.forward_references().is_empty());

    let mut circuit = Circuit::new();
    let [data, clock, out, not_out] = [(); 4].map(|_| circuit.add_wire());
    d_flip_flop(&mut circuit, data, clock, out, not_out);
    assert!(!circuit.forward_references().is_empty());
}

#[test]
fn try_api_reports_typed_errors() {
    let mut circuit = Circuit::with_config(CircuitConfig {
        wire_capacity: 3,
        gate_capacity: 1,
    });

    let wires = circuit.try_add_wires(3).unwrap();
    assert_eq!(
        circuit.try_add_wire(),
        Err(CircuitError::WireCapacityExceeded {
            capacity: 3,
            requested: 1
        })
    );

    let [a, b, out] = [0, 1, 2].map(|index| wires.bit(index));
    circuit.try_add_gate(Gate::nand(a, b, out)).unwrap();
    assert_eq!(
        circuit.try_add_gate(Gate::nand(a, b, out)),
        Err(CircuitError::GateCapacityExceeded { capacity: 1 })
    );

    assert_eq!(
        circuit.try_get_wire(WireId(3)),
        Err(CircuitError::InvalidWire {
            wire: WireId(3),
            wire_count: 3
        })
    );

    circuit.reset();
    assert_eq!(
        circuit.try_set_wire(a, true),
        Err(CircuitError::InvalidWire {
            wire: a,
            wire_count: 0
        })
    );
}

#[test]
#[should_panic(expected = "Wire store full")]
fn plain_api_is_fatal_on_capacity() {
    let mut circuit = Circuit::with_config(CircuitConfig {
        wire_capacity: 2,
        gate_capacity: 2,
    });
    circuit.add_wires(3);
}

#[test]
fn ram_keeps_every_cell_independent() {
    let mut rng = rng(7);
    let mut circuit = Circuit::new();
    let address = circuit.add_wires(8);
    let data = circuit.add_wires(8);
    let write_enable = circuit.add_wire();
    let chip_enable = circuit.add_wire();
    ram256(&mut circuit, address, data, write_enable, chip_enable);
    circuit.randomize_wire_state(&mut rng);

    let contents: Vec<u64> = (0..256).map(|_| rng.random_range(0..256)).collect();

    circuit.set_wire(chip_enable, true);
    circuit.set_wire(write_enable, true);
    for (cell, &byte) in contents.iter().enumerate() {
        circuit.set_wires(address, cell as u64);
        circuit.set_wires(data, byte);
        circuit.settle(RAM_MIN_WRITE_PASSES);
    }

    circuit.set_wire(write_enable, false);
    for cell in (0..256).rev() {
        circuit.set_wires(address, cell as u64);
        circuit.random_wires(data, &mut rng);
        circuit.settle(RAM_MIN_READ_PASSES);
        assert_eq!(circuit.get_wires(data), contents[cell], "cell {cell}");
    }
}

#[test]
fn register_and_adder_share_a_circuit() {
    let mut rng = rng(11);
    let mut circuit = Circuit::new();

    let a = circuit.add_wires(16);
    let b = circuit.add_wires(16);
    let carry_in = circuit.add_wire();
    let sum = circuit.add_wires(16);
    let carry = circuit.add_wire();
    let write_enable = circuit.add_wire();
    let clock = circuit.add_wire();
    let stored = circuit.add_wires(16);

    full_adder(&mut circuit, a, b, carry_in, sum, carry);
    register(&mut circuit, sum, write_enable, clock, stored);

    let GateCount { nand, tri_state } = circuit.gate_counts();
    assert_eq!(tri_state, 32);
    assert_eq!(nand + tri_state, circuit.gate_count());

    for _ in 0..16 {
        circuit.randomize_wire_state(&mut rng);
        circuit.set_wire(write_enable, true);
        for _ in 0..2 {
            circuit.simulate_clock_cycle(clock, 2);
        }

        let expected = (circuit.get_wires(a) + circuit.get_wires(b)
            + u64::from(circuit.get_wire(carry_in)))
            & 0xFFFF;
        assert_eq!(circuit.get_wires(stored), expected);

        circuit.set_wire(write_enable, false);
        circuit.random_wires(a, &mut rng);
        circuit.simulate_clock_cycle(clock, 2);
        assert_eq!(circuit.get_wires(stored), expected);
    }
}

#[test]
fn smoke_suite_passes_for_several_seeds() {
    for seed in [1, 2, 3] {
        let mut console = Console::new(Vec::new());
        let summary = run_suite(&mut console, &HarnessConfig::smoke(), &mut rng(seed)).unwrap();
        assert!(
            summary.all_passed(),
            "seed {seed}: {:?}",
            summary.failures().collect::<Vec<_>>()
        );
    }
}

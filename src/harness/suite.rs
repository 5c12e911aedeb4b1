use std::io::Write;

use log::{debug, info, warn};
use rand::Rng;

use super::{
    HarnessConfig, HarnessError,
    console::Console,
    truth_table::{TruthTable, output_test_result, verify_truth_table},
};
use crate::{
    Circuit, WireId, mask,
    gadgets::{
        alu, and, d_flip_flop, d_latch, demux, full_adder, full_adder1, half_adder, half_adder1,
        memory::{
            DFLIPFLOP_MIN_CYCLES, RAM_ADDRESS_BITS, RAM_MIN_READ_PASSES, RAM_MIN_WRITE_PASSES,
            RAM_WORD_BITS, REGISTER_MIN_WRITE_CYCLES,
        },
        mux, nand, nor, not, or, ram256, register, tri_state, tri_state_not, xor,
    },
};

const MAX_WIDTH: usize = 64;
const MAX_MUX_SELECT_BITS: usize = 4;

#[rustfmt::skip]
const TRUTH_TRI_STATE: [u8; 6] = [
    0, 1,    0,
    1, 1,    1,
];

#[rustfmt::skip]
const TRUTH_TRI_STATE_NOT: [u8; 6] = [
    0, 1,    1,
    1, 1,    0,
];

#[rustfmt::skip]
const TRUTH_HALF_ADDER: [u8; 16] = [
    0, 0,    0, 0,
    0, 1,    1, 0,
    1, 0,    1, 0,
    1, 1,    0, 1,
];

#[rustfmt::skip]
const TRUTH_FULL_ADDER: [u8; 40] = [
    0, 0, 0,    0, 0,
    0, 0, 1,    1, 0,
    0, 1, 0,    1, 0,
    0, 1, 1,    0, 1,
    1, 0, 0,    1, 0,
    1, 0, 1,    0, 1,
    1, 1, 0,    0, 1,
    1, 1, 1,    1, 1,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub results: Vec<CheckResult>,
}

impl SuiteSummary {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.results
            .iter()
            .filter(|result| !result.passed)
            .map(|result| result.name)
    }
}

/// Runs every component check in a fixed order, printing one result line
/// each.
pub fn run_suite<W: Write, R: Rng>(
    console: &mut Console<W>,
    config: &HarnessConfig,
    rng: &mut R,
) -> Result<SuiteSummary, HarnessError> {
    let mut runner = Runner {
        circuit: Circuit::new(),
        config,
        rng,
        console,
        summary: SuiteSummary::default(),
    };

    runner.tri_state()?;
    runner.logic_gates()?;
    runner.half_adder1()?;
    runner.full_adder1()?;
    runner.ripple_adder("HalfAdder", false)?;
    runner.ripple_adder("FullAdder", true)?;
    runner.d_latch()?;
    runner.d_flip_flop()?;
    runner.register()?;
    runner.alu()?;
    runner.mux()?;
    runner.demux()?;
    runner.ram256()?;

    let summary = runner.summary;
    info!(
        "suite finished: {} passed, {} failed",
        summary.passed(),
        summary.failed()
    );
    Ok(summary)
}

type BinaryGate = fn(&mut Circuit, WireId, WireId, WireId);

struct Runner<'a, W: Write, R: Rng> {
    circuit: Circuit,
    config: &'a HarnessConfig,
    rng: &'a mut R,
    console: &'a mut Console<W>,
    summary: SuiteSummary,
}

impl<W: Write, R: Rng> Runner<'_, W, R> {
    fn report(&mut self, name: &'static str, passed: bool) -> Result<(), HarnessError> {
        if !passed {
            warn!("check {name} failed");
        }
        output_test_result(self.console, name, passed)?;
        self.summary.results.push(CheckResult { name, passed });
        Ok(())
    }

    fn random_width(&mut self, min: usize) -> usize {
        self.rng.random_range(min..=MAX_WIDTH)
    }

    fn pulse_time(&mut self) -> u32 {
        let spread = self.config.pulse_time_spread.max(1);
        self.config.min_pulse_time + self.rng.random_range(0..spread)
    }

    fn extra_cycles(&mut self) -> u32 {
        self.rng.random_range(0..self.config.max_extra_cycles.max(1))
    }

    fn tri_state(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let inputs = self.circuit.add_wires(2);
        let outputs = self.circuit.add_wires(1);

        let checks: [(&'static str, BinaryGate, &[u8]); 2] = [
            ("TriState", tri_state, &TRUTH_TRI_STATE),
            ("TriStateNOT", tri_state_not, &TRUTH_TRI_STATE_NOT),
        ];
        for (name, build, cells) in checks {
            self.circuit.reset_gates();
            build(&mut self.circuit, inputs.bit(0), inputs.bit(1), outputs.bit(0));

            let table = TruthTable::new(2, 1, cells);
            let passed = verify_truth_table(&mut self.circuit, &table, inputs, outputs, self.rng);
            self.report(name, passed)?;
        }

        Ok(())
    }

    fn logic_gates(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let inputs = self.circuit.add_wires(2);
        let outputs = self.circuit.add_wires(1);

        let gates: [(&'static str, BinaryGate, fn(bool, bool) -> bool); 5] = [
            ("NAND", nand, |a, b| !(a && b)),
            ("AND", and, |a, b| a && b),
            ("OR", or, |a, b| a || b),
            ("NOR", nor, |a, b| !(a || b)),
            ("XOR", xor, |a, b| a ^ b),
        ];
        for (name, build, expected) in gates {
            self.circuit.reset_gates();
            build(&mut self.circuit, inputs.bit(0), inputs.bit(1), outputs.bit(0));

            let table = TruthTable::from_fn(2, 1, |row| vec![expected(row[0], row[1])]);
            let passed = verify_truth_table(&mut self.circuit, &table, inputs, outputs, self.rng);
            self.report(name, passed)?;
        }

        self.circuit.reset();

        let inputs = self.circuit.add_wires(1);
        let outputs = self.circuit.add_wires(1);

        not(&mut self.circuit, inputs.bit(0), outputs.bit(0));

        let table = TruthTable::from_fn(1, 1, |row| vec![!row[0]]);
        let passed = verify_truth_table(&mut self.circuit, &table, inputs, outputs, self.rng);
        self.report("NOT", passed)
    }

    fn half_adder1(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let inputs = self.circuit.add_wires(2);
        let outputs = self.circuit.add_wires(2);

        half_adder1(
            &mut self.circuit,
            inputs.bit(0),
            inputs.bit(1),
            outputs.bit(0),
            outputs.bit(1),
        );

        let table = TruthTable::new(2, 2, &TRUTH_HALF_ADDER);
        let passed = verify_truth_table(&mut self.circuit, &table, inputs, outputs, self.rng);
        self.report("HalfAdder1", passed)
    }

    fn full_adder1(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let inputs = self.circuit.add_wires(3);
        let outputs = self.circuit.add_wires(2);

        full_adder1(
            &mut self.circuit,
            inputs.bit(0),
            inputs.bit(1),
            inputs.bit(2),
            outputs.bit(0),
            outputs.bit(1),
        );

        let table = TruthTable::new(3, 2, &TRUTH_FULL_ADDER);
        let passed = verify_truth_table(&mut self.circuit, &table, inputs, outputs, self.rng);
        self.report("FullAdder1", passed)
    }

    fn ripple_adder(&mut self, name: &'static str, with_carry_in: bool) -> Result<(), HarnessError> {
        let mut passed = true;

        for _ in 0..self.config.rounds {
            let bit_count = self.random_width(1);
            debug!("{name}: {bit_count} bits");

            self.circuit.reset();

            let a = self.circuit.add_wires(bit_count);
            let b = self.circuit.add_wires(bit_count);
            let c = self.circuit.add_wire();
            let sum = self.circuit.add_wires(bit_count);
            let carry = self.circuit.add_wire();

            if with_carry_in {
                full_adder(&mut self.circuit, a, b, c, sum, carry);
            } else {
                half_adder(&mut self.circuit, a, b, sum, carry);
            }

            for _ in 0..self.config.adder_samples {
                self.circuit.randomize_wire_state(self.rng);
                if !with_carry_in {
                    self.circuit.set_wire(c, false);
                }
                self.circuit.simulate();

                let total = u128::from(self.circuit.get_wires(a))
                    + u128::from(self.circuit.get_wires(b))
                    + u128::from(self.circuit.get_wire(c));

                passed &= self.circuit.expect_wires(sum, total as u64);
                passed &= self
                    .circuit
                    .expect_wire(carry, (total >> bit_count) & 1 == 1);
            }
        }

        self.report(name, passed)
    }

    fn d_latch(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let [data, clock, out, not_out] = [(); 4].map(|_| self.circuit.add_wire());

        d_latch(&mut self.circuit, data, clock, out, not_out);

        let pulse_time = self.pulse_time();
        let hold_pulses = self.config.hold_pulses;
        let circuit = &mut self.circuit;

        circuit.randomize_wire_state(self.rng);
        circuit.simulate_clock_cycle(clock, pulse_time);

        circuit.set_wire(clock, false);

        let mut passed = true;
        for bit in [true, false] {
            circuit.set_wire(data, bit);
            circuit.simulate_clock_pulse(clock, pulse_time);

            passed &= circuit.expect_wire(out, bit);
            passed &= circuit.expect_wire(not_out, !bit);

            for _ in 0..hold_pulses {
                circuit.simulate_clock_pulse(clock, pulse_time);

                passed &= circuit.expect_wire(out, bit);
                passed &= circuit.expect_wire(not_out, !bit);
            }

            // the next pulse must raise the clock
            if hold_pulses % 2 == 0 {
                circuit.simulate_clock_pulse(clock, pulse_time);
            }
        }

        self.report("DLatch", passed)
    }

    fn d_flip_flop(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let [data, clock, out, not_out] = [(); 4].map(|_| self.circuit.add_wire());

        d_flip_flop(&mut self.circuit, data, clock, out, not_out);

        let pulse_time = self.pulse_time();
        let hold_pulses = self.config.hold_pulses;
        let circuit = &mut self.circuit;

        circuit.randomize_wire_state(self.rng);
        circuit.simulate_clock_cycle(clock, pulse_time);

        circuit.set_wire(clock, false);

        let mut passed = true;

        circuit.set_wire(data, true);
        for _ in 0..DFLIPFLOP_MIN_CYCLES {
            circuit.simulate_clock_cycle(clock, pulse_time);
        }

        passed &= circuit.expect_wire(out, true);
        passed &= circuit.expect_wire(not_out, false);

        // rising edge: only the master follows
        circuit.set_wire(data, false);
        circuit.simulate_clock_pulse(clock, pulse_time);

        passed &= circuit.expect_wire(out, true);
        passed &= circuit.expect_wire(not_out, false);

        // falling edge: the slave takes the master's 0, the new 1 is ignored
        circuit.set_wire(data, true);
        circuit.simulate_clock_pulse(clock, pulse_time);

        passed &= circuit.expect_wire(out, false);
        passed &= circuit.expect_wire(not_out, true);

        for _ in 0..hold_pulses {
            circuit.simulate_clock_cycle(clock, pulse_time);

            passed &= circuit.expect_wire(out, true);
            passed &= circuit.expect_wire(not_out, false);
        }

        self.report("DFlipFlop", passed)
    }

    fn register(&mut self) -> Result<(), HarnessError> {
        let mut passed = true;

        for _ in 0..self.config.rounds {
            let bit_count = self.random_width(1);
            debug!("Register: {bit_count} bits");

            self.circuit.reset();

            let data = self.circuit.add_wires(bit_count);
            let out = self.circuit.add_wires(bit_count);
            let clock = self.circuit.add_wire();
            let write_enable = self.circuit.add_wire();

            register(&mut self.circuit, data, write_enable, clock, out);

            let pulse_time = self.pulse_time();

            for _ in 0..self.config.register_samples {
                self.circuit.randomize_wire_state(self.rng);

                self.circuit.random_wires(data, self.rng);
                self.circuit.set_wire(write_enable, true);

                let expected = self.circuit.get_wires(data);

                let write_cycles = REGISTER_MIN_WRITE_CYCLES + self.extra_cycles();
                for _ in 0..write_cycles {
                    self.circuit.simulate_clock_cycle(clock, pulse_time);
                }

                passed &= self.circuit.expect_wires(out, expected);

                self.circuit.set_wire(write_enable, false);

                let hold_cycles = 1 + self.extra_cycles();
                for _ in 0..hold_cycles {
                    self.circuit.random_wires(data, self.rng);
                    self.circuit.simulate_clock_cycle(clock, pulse_time);

                    passed &= self.circuit.expect_wires(out, expected);
                }
            }
        }

        self.report("Register", passed)
    }

    fn alu(&mut self) -> Result<(), HarnessError> {
        let mut passed = true;

        for _ in 0..self.config.rounds {
            let bit_count = self.random_width(2);
            debug!("ALU: {bit_count} bits");

            self.circuit.reset();

            let a = self.circuit.add_wires(bit_count);
            let b = self.circuit.add_wires(bit_count);
            let subtract_op = self.circuit.add_wire();
            let out = self.circuit.add_wires(bit_count);
            let carry = self.circuit.add_wire();

            alu(&mut self.circuit, a, b, subtract_op, out, carry);

            for _ in 0..self.config.alu_samples {
                self.circuit.randomize_wire_state(self.rng);
                self.circuit.simulate();

                let value_a = self.circuit.get_wires(a);
                let value_b = self.circuit.get_wires(b);

                let (expected, expected_carry) = if self.circuit.get_wire(subtract_op) {
                    (value_a.wrapping_sub(value_b), value_a < value_b)
                } else {
                    let total = u128::from(value_a) + u128::from(value_b);
                    (total as u64, (total >> bit_count) & 1 == 1)
                };

                passed &= self.circuit.expect_wires(out, expected & mask(bit_count));
                passed &= self.circuit.expect_wire(carry, expected_carry);
            }
        }

        self.report("ALU", passed)
    }

    fn mux(&mut self) -> Result<(), HarnessError> {
        let mut passed = true;

        for _ in 0..self.config.rounds {
            let select_bits = self.rng.random_range(1..=MAX_MUX_SELECT_BITS);

            self.circuit.reset();

            let input = self.circuit.add_wires(1 << select_bits);
            let select = self.circuit.add_wires(select_bits);
            let out = self.circuit.add_wire();

            mux(&mut self.circuit, input, select, out);

            for _ in 0..self.config.alu_samples {
                self.circuit.randomize_wire_state(self.rng);
                self.circuit.simulate();

                let index = self.circuit.get_wires(select) as usize;
                let expected = self.circuit.get_wire(input.bit(index));
                passed &= self.circuit.expect_wire(out, expected);
            }
        }

        self.report("Mux", passed)
    }

    fn demux(&mut self) -> Result<(), HarnessError> {
        let mut passed = true;

        for _ in 0..self.config.rounds {
            let select_bits = self.rng.random_range(1..=MAX_MUX_SELECT_BITS);

            self.circuit.reset();

            let input = self.circuit.add_wire();
            let select = self.circuit.add_wires(select_bits);
            let out = self.circuit.add_wires(1 << select_bits);

            demux(&mut self.circuit, input, select, out);

            for _ in 0..self.config.alu_samples {
                self.circuit.randomize_wire_state(self.rng);

                let before = self.circuit.get_wires(out);
                let index = self.circuit.get_wires(select) as usize;
                let bit = self.circuit.get_wire(input);

                self.circuit.simulate();

                let expected = (before & !(1 << index)) | (u64::from(bit) << index);
                passed &= self.circuit.expect_wires(out, expected);
            }
        }

        self.report("Demux", passed)
    }

    fn ram256(&mut self) -> Result<(), HarnessError> {
        self.circuit.reset();

        let address = self.circuit.add_wires(RAM_ADDRESS_BITS);
        let data = self.circuit.add_wires(RAM_WORD_BITS);
        let write_enable = self.circuit.add_wire();
        let chip_enable = self.circuit.add_wire();

        ram256(&mut self.circuit, address, data, write_enable, chip_enable);
        debug!(
            "RAM256: {} wires, {} gates",
            self.circuit.wire_count(),
            self.circuit.gate_count()
        );

        self.circuit.randomize_wire_state(self.rng);

        let mut shadow: [Option<u64>; 1 << RAM_ADDRESS_BITS] = [None; 1 << RAM_ADDRESS_BITS];
        let mut passed = true;

        for _ in 0..self.config.ram_operations {
            let cell = self.rng.random_range(0..shadow.len());
            self.circuit.set_wires(address, cell as u64);
            self.circuit.random_wires(data, self.rng);

            match (shadow[cell], self.rng.random_range(0..3)) {
                (Some(stored), 0) => {
                    self.circuit.set_wire(write_enable, false);
                    self.circuit.set_wire(chip_enable, true);
                    self.circuit.settle(RAM_MIN_READ_PASSES);

                    passed &= self.circuit.expect_wires(data, stored);
                }
                (_, 1) => {
                    let idle_bus = self.circuit.get_wires(data);
                    self.circuit.random_wire(write_enable, self.rng);
                    self.circuit.set_wire(chip_enable, false);
                    self.circuit.settle(RAM_MIN_WRITE_PASSES);

                    passed &= self.circuit.expect_wires(data, idle_bus);
                }
                _ => {
                    self.circuit.set_wire(write_enable, true);
                    self.circuit.set_wire(chip_enable, true);
                    self.circuit.settle(RAM_MIN_WRITE_PASSES);

                    shadow[cell] = Some(self.circuit.get_wires(data));
                }
            }
        }

        self.report("RAM256", passed)
    }
}

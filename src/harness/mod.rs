//! Self-checking verification harness.
//!
//! Builds each component on a fresh [`Circuit`](crate::Circuit), drives it
//! with random stimulus and reports one result line per check.

use std::io;

use thiserror::Error;

use crate::gadgets::memory::DLATCH_MIN_PULSE_TIME;

pub mod console;
pub mod suite;
pub mod truth_table;

pub use console::Console;
pub use suite::{CheckResult, SuiteSummary, run_suite};
pub use truth_table::{TruthTable, output_test_result, print_truth_table, verify_truth_table};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("console write failed: {0}")]
    Io(#[from] io::Error),
}

/// Stimulus sizes for [`run_suite`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Circuits built per randomized check, each with a fresh random width.
    pub rounds: usize,
    pub adder_samples: usize,
    pub register_samples: usize,
    /// Samples per ALU, mux and demux circuit.
    pub alu_samples: usize,
    pub ram_operations: usize,
    /// Pulse time is `min_pulse_time + rand(0..pulse_time_spread)`.
    pub min_pulse_time: u32,
    pub pulse_time_spread: u32,
    /// Upper bound (exclusive) on extra clock cycles added to the minimum
    /// write and hold phases of the register check.
    pub max_extra_cycles: u32,
    /// Pulses a latch or flip-flop must hold its value for.
    pub hold_pulses: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            adder_samples: 1024,
            register_samples: 128,
            alu_samples: 128,
            ram_operations: 256,
            min_pulse_time: DLATCH_MIN_PULSE_TIME,
            pulse_time_spread: 16,
            max_extra_cycles: 8,
            hold_pulses: 15,
        }
    }
}

impl HarnessConfig {
    /// A small configuration for quick runs.
    pub fn smoke() -> Self {
        Self {
            rounds: 2,
            adder_samples: 64,
            register_samples: 8,
            alu_samples: 32,
            ram_operations: 32,
            ..Self::default()
        }
    }
}

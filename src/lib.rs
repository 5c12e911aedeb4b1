pub mod circuit;
mod core;
pub mod gadgets;
pub mod harness;

pub use crate::core::{
    circuit::{Circuit, CircuitConfig, DEFAULT_GATE_CAPACITY, DEFAULT_WIRE_CAPACITY},
    gate::{Gate, GateCount, GateKind},
    wire::{CircuitError, WireId, WireRange, mask},
};

pub use circuit::CircuitContext;

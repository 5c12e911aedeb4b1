pub mod adder;
pub mod basic;
pub mod datapath;
pub mod memory;

pub use adder::{full_adder, full_adder1, half_adder, half_adder1};
pub use basic::{
    and, and_x1, and_xn, nand, nor, not, not_xn, or, or_x1, or_xn, tri_state, tri_state_not, xor,
    xor_xn,
};
pub use datapath::{alu, decoder, demux, mux};
pub use memory::{d_flip_flop, d_latch, ram256, register};

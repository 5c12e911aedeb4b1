//! Sequential components.
//!
//! All of these contain combinational feedback, so one evaluation pass does
//! not settle them. Callers drive them with a pulse time (passes per clock
//! phase) of at least [`DLATCH_MIN_PULSE_TIME`].

use log::debug;

use super::{
    basic::{and, nand, not, tri_state},
    datapath::decoder,
};
use crate::{CircuitContext, WireId, WireRange};

/// Passes needed for a D latch to follow its data input.
pub const DLATCH_MIN_PULSE_TIME: u32 = 2;
/// Full clock cycles for a D flip-flop to present a captured bit.
pub const DFLIPFLOP_MIN_CYCLES: u32 = 1;
/// Clock cycles with `write_enable` high for a register to hold a new value.
pub const REGISTER_MIN_WRITE_CYCLES: u32 = 2;
/// Passes for [`ram256`] to drive a stored byte onto its data bus.
pub const RAM_MIN_READ_PASSES: u32 = 1;
/// Passes for [`ram256`] to latch a byte from its data bus.
pub const RAM_MIN_WRITE_PASSES: u32 = 2;

pub const RAM_ADDRESS_BITS: usize = 8;
pub const RAM_WORD_BITS: usize = 8;

/// Stores `data` while `enable` is high and holds it while `enable` is low.
///
/// Minimum pulse time: [`DLATCH_MIN_PULSE_TIME`].
pub fn d_latch<C: CircuitContext>(
    circuit: &mut C,
    data: WireId,
    enable: WireId,
    out: WireId,
    not_out: WireId,
) {
    let not_data = circuit.issue_wire();
    let set = circuit.issue_wire();
    let reset = circuit.issue_wire();

    not(circuit, data, not_data);

    nand(circuit, data, enable, set);
    nand(circuit, not_data, enable, reset);

    nand(circuit, set, not_out, out);
    nand(circuit, reset, out, not_out);
}

/// Master-slave flip-flop: the master follows `data` while `clock` is high,
/// the slave copies the master while `clock` is low.
///
/// Minimum pulse time: [`DLATCH_MIN_PULSE_TIME`].
/// Minimum cycles: [`DFLIPFLOP_MIN_CYCLES`].
pub fn d_flip_flop<C: CircuitContext>(
    circuit: &mut C,
    data: WireId,
    clock: WireId,
    out: WireId,
    not_out: WireId,
) {
    let not_clock = circuit.issue_wire();
    let master = circuit.issue_wire();
    let not_master = circuit.issue_wire();

    not(circuit, clock, not_clock);

    d_latch(circuit, data, clock, master, not_master);
    d_latch(circuit, master, not_clock, out, not_out);
}

/// Loads `data` into `out` over a clock cycle while `write_enable` is high,
/// and recirculates `out` while it is low.
///
/// Minimum pulse time: [`DLATCH_MIN_PULSE_TIME`].
/// Minimum write cycles: [`REGISTER_MIN_WRITE_CYCLES`].
pub fn register<C: CircuitContext>(
    circuit: &mut C,
    data: WireRange,
    write_enable: WireId,
    clock: WireId,
    out: WireRange,
) {
    let bit_count = out.len();
    assert!(bit_count >= 1, "register needs at least one bit");
    if let Err(err) = out.check_width(&data) {
        panic!("{err}");
    }
    debug!("register: {bit_count} bits");

    let not_write = circuit.issue_wire();

    not(circuit, write_enable, not_write);

    for (data_bit, out_bit) in data.iter().zip(out.iter()) {
        let next = circuit.issue_wire();
        let not_out = circuit.issue_wire();

        tri_state(circuit, data_bit, write_enable, next);
        tri_state(circuit, out_bit, not_write, next);

        d_flip_flop(circuit, next, clock, out_bit, not_out);
    }
}

/// 256 bytes of level-sensitive memory sharing one bidirectional data bus.
///
/// With `chip_enable` low nothing is latched or driven. With `chip_enable`
/// high:
/// - `write_enable` low drives the addressed byte onto `data`
///   (at least [`RAM_MIN_READ_PASSES`] passes),
/// - `write_enable` high latches `data` into the addressed byte
///   (at least [`RAM_MIN_WRITE_PASSES`] passes).
pub fn ram256<C: CircuitContext>(
    circuit: &mut C,
    address: WireRange,
    data: WireRange,
    write_enable: WireId,
    chip_enable: WireId,
) {
    assert_eq!(address.len(), RAM_ADDRESS_BITS, "ram256 address width");
    assert_eq!(data.len(), RAM_WORD_BITS, "ram256 data width");
    debug!("ram256: building {} cells", 1 << RAM_ADDRESS_BITS);

    let not_write = circuit.issue_wire();
    let write_strobe = circuit.issue_wire();
    let read_strobe = circuit.issue_wire();

    not(circuit, write_enable, not_write);
    and(circuit, write_enable, chip_enable, write_strobe);
    and(circuit, not_write, chip_enable, read_strobe);

    let selects = decoder(circuit, address);

    for select in selects.iter() {
        let write_cell = circuit.issue_wire();
        let read_cell = circuit.issue_wire();

        and(circuit, select, write_strobe, write_cell);
        and(circuit, select, read_strobe, read_cell);

        for data_bit in data.iter() {
            let stored = circuit.issue_wire();
            let not_stored = circuit.issue_wire();

            d_latch(circuit, data_bit, write_cell, stored, not_stored);
            tri_state(circuit, stored, read_cell, data_bit);
        }
    }
}

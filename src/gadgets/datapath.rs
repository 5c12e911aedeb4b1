use log::debug;

use super::{
    adder::full_adder,
    basic::{and_reduce, not, tri_state, tri_state_not, xor},
};
use crate::{CircuitContext, WireId, WireRange};

pub const MAX_SELECT_BITS: usize = 16;

/// One-hot decoder: line `i` of the result is high iff `select == i`.
///
/// Each line is the AND of one literal per select bit, either the bit or its
/// complement.
pub fn decoder<C: CircuitContext>(circuit: &mut C, select: WireRange) -> WireRange {
    let select_bits = select.len();
    assert!(
        (1..=MAX_SELECT_BITS).contains(&select_bits),
        "decoder needs 1..={MAX_SELECT_BITS} select bits, got {select_bits}"
    );

    let not_select = circuit.issue_wires(select_bits);
    for (bit, not_bit) in select.iter().zip(not_select.iter()) {
        not(circuit, bit, not_bit);
    }

    let lines = circuit.issue_wires(1 << select_bits);
    for (index, line) in lines.iter().enumerate() {
        let literals: Vec<WireId> = (0..select_bits)
            .map(|bit| match (index >> bit) & 1 {
                1 => select.bit(bit),
                _ => not_select.bit(bit),
            })
            .collect();
        and_reduce(circuit, &literals, line);
    }

    lines
}

/// Drives `input[select]` onto `out`.
pub fn mux<C: CircuitContext>(circuit: &mut C, input: WireRange, select: WireRange, out: WireId) {
    assert!(!select.is_empty(), "mux needs at least one select bit");
    assert_eq!(
        input.len(),
        1 << select.len(),
        "mux over {} inputs needs {} select bits",
        input.len(),
        select.len()
    );

    let enables = decoder(circuit, select);
    for (input, enable) in input.iter().zip(enables.iter()) {
        tri_state(circuit, input, enable, out);
    }
}

/// Drives `input` onto `out[select]`; every other output line is left as is.
pub fn demux<C: CircuitContext>(circuit: &mut C, input: WireId, select: WireRange, out: WireRange) {
    assert!(!select.is_empty(), "demux needs at least one select bit");
    assert_eq!(
        out.len(),
        1 << select.len(),
        "demux onto {} outputs needs {} select bits",
        out.len(),
        select.len()
    );

    let enables = decoder(circuit, select);
    for (out, enable) in out.iter().zip(enables.iter()) {
        tri_state(circuit, input, enable, out);
    }
}

/// `out = a + b` or, with `subtract_op` high, `out = a - b` in two's
/// complement.
///
/// `carry` is the overflow bit of the addition, or the borrow (`a < b`) of
/// the subtraction.
pub fn alu<C: CircuitContext>(
    circuit: &mut C,
    a: WireRange,
    b: WireRange,
    subtract_op: WireId,
    out: WireRange,
    carry: WireId,
) {
    let bit_count = out.len();
    // one bit is taken by the sign
    assert!(bit_count >= 2, "alu needs at least 2 bits, got {bit_count}");
    for bus in [&a, &b] {
        if let Err(err) = out.check_width(bus) {
            panic!("{err}");
        }
    }
    debug!("alu: {bit_count} bits");

    let add_op = circuit.issue_wire();
    let operand_b = circuit.issue_wires(bit_count);

    not(circuit, subtract_op, add_op);

    for (b_bit, operand_bit) in b.iter().zip(operand_b.iter()) {
        tri_state(circuit, b_bit, add_op, operand_bit);
        tri_state_not(circuit, b_bit, subtract_op, operand_bit);
    }

    let raw_carry = circuit.issue_wire();

    full_adder(circuit, a, operand_b, subtract_op, out, raw_carry);
    xor(circuit, subtract_op, raw_carry, carry);
}

use log::debug;

use super::basic::{and, or, xor};
use crate::{CircuitContext, WireId, WireRange};

/// `(sum, carry) = a + b`
pub fn half_adder1<C: CircuitContext>(
    circuit: &mut C,
    a: WireId,
    b: WireId,
    sum: WireId,
    carry: WireId,
) {
    xor(circuit, a, b, sum);
    and(circuit, a, b, carry);
}

/// `(sum, carry) = a + b + c`
pub fn full_adder1<C: CircuitContext>(
    circuit: &mut C,
    a: WireId,
    b: WireId,
    c: WireId,
    sum: WireId,
    carry: WireId,
) {
    let sum_ab = circuit.issue_wire();

    xor(circuit, a, b, sum_ab);
    xor(circuit, c, sum_ab, sum);

    let and_ab = circuit.issue_wire();
    let and_ac = circuit.issue_wire();
    let and_bc = circuit.issue_wire();

    and(circuit, a, b, and_ab);
    and(circuit, a, c, and_ac);
    and(circuit, b, c, and_bc);

    let any_ab_ac = circuit.issue_wire();

    or(circuit, and_ab, and_ac, any_ab_ac);
    or(circuit, any_ab_ac, and_bc, carry);
}

fn check_adder_widths(a: &WireRange, b: &WireRange, sum: &WireRange) -> usize {
    let bit_count = sum.len();
    assert!(bit_count >= 1, "adder needs at least one bit");
    for bus in [a, b] {
        if let Err(err) = sum.check_width(bus) {
            panic!("{err}");
        }
    }
    bit_count
}

/// Ripple-carry chain: bit 0 enters through `first_stage`, every later bit
/// through a full adder fed by the previous stage's carry.
fn ripple<C: CircuitContext>(
    circuit: &mut C,
    a: WireRange,
    b: WireRange,
    sum: WireRange,
    carry: WireId,
    first_stage: impl FnOnce(&mut C, WireId),
) {
    let bit_count = sum.len();
    let carries = circuit.issue_wires(bit_count - 1);
    let stage_carry = |index: usize| {
        if index + 1 < bit_count {
            carries.bit(index)
        } else {
            carry
        }
    };

    first_stage(circuit, stage_carry(0));

    for index in 1..bit_count {
        full_adder1(
            circuit,
            a.bit(index),
            b.bit(index),
            stage_carry(index - 1),
            sum.bit(index),
            stage_carry(index),
        );
    }
}

/// N-bit `(sum, carry) = a + b`.
pub fn half_adder<C: CircuitContext>(
    circuit: &mut C,
    a: WireRange,
    b: WireRange,
    sum: WireRange,
    carry: WireId,
) {
    let bit_count = check_adder_widths(&a, &b, &sum);
    debug!("half_adder: {bit_count} bits");

    ripple(circuit, a, b, sum, carry, |circuit, next_carry| {
        half_adder1(circuit, a.bit(0), b.bit(0), sum.bit(0), next_carry)
    });
}

/// N-bit `(sum, carry) = a + b + c`.
pub fn full_adder<C: CircuitContext>(
    circuit: &mut C,
    a: WireRange,
    b: WireRange,
    c: WireId,
    sum: WireRange,
    carry: WireId,
) {
    let bit_count = check_adder_widths(&a, &b, &sum);
    debug!("full_adder: {bit_count} bits");

    ripple(circuit, a, b, sum, carry, |circuit, next_carry| {
        full_adder1(circuit, a.bit(0), b.bit(0), c, sum.bit(0), next_carry)
    });
}

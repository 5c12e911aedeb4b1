//! Logic gates derived from NAND, plus their bus forms.
//!
//! Every function writes into caller-supplied output wires and allocates its
//! own intermediate wires. Gates are appended in dependency order, so each
//! network settles in one evaluation pass.

use crate::{CircuitContext, Gate, WireId, WireRange};

pub fn nand<C: CircuitContext>(circuit: &mut C, a: WireId, b: WireId, out: WireId) {
    circuit.add_gate(Gate::nand(a, b, out));
}

pub fn tri_state<C: CircuitContext>(
    circuit: &mut C,
    input: WireId,
    enable: WireId,
    output: WireId,
) {
    circuit.add_gate(Gate::tri_state(input, enable, output));
}

/// Drives `!input` onto `output` while `enable` is high.
pub fn tri_state_not<C: CircuitContext>(
    circuit: &mut C,
    input: WireId,
    enable: WireId,
    output: WireId,
) {
    let inverted = circuit.issue_wire();

    not(circuit, input, inverted);
    tri_state(circuit, inverted, enable, output);
}

pub fn not<C: CircuitContext>(circuit: &mut C, input: WireId, out: WireId) {
    nand(circuit, input, input, out);
}

pub fn and<C: CircuitContext>(circuit: &mut C, a: WireId, b: WireId, out: WireId) {
    let not_out = circuit.issue_wire();

    nand(circuit, a, b, not_out);
    not(circuit, not_out, out);
}

pub fn or<C: CircuitContext>(circuit: &mut C, a: WireId, b: WireId, out: WireId) {
    let not_a = circuit.issue_wire();
    let not_b = circuit.issue_wire();

    not(circuit, a, not_a);
    not(circuit, b, not_b);
    nand(circuit, not_a, not_b, out);
}

pub fn nor<C: CircuitContext>(circuit: &mut C, a: WireId, b: WireId, out: WireId) {
    let not_out = circuit.issue_wire();

    or(circuit, a, b, not_out);
    not(circuit, not_out, out);
}

pub fn xor<C: CircuitContext>(circuit: &mut C, a: WireId, b: WireId, out: WireId) {
    let both = circuit.issue_wire();
    let only_b = circuit.issue_wire();
    let only_a = circuit.issue_wire();

    nand(circuit, a, b, both);
    nand(circuit, a, both, only_b);
    nand(circuit, b, both, only_a);
    nand(circuit, only_b, only_a, out);
}

// ――― Bus forms ―――

fn assert_same_width(expected: &WireRange, actual: &WireRange) {
    if let Err(err) = expected.check_width(actual) {
        panic!("{err}");
    }
}

pub fn not_xn<C: CircuitContext>(circuit: &mut C, input: WireRange, out: WireRange) {
    assert_same_width(&input, &out);

    for (input, out) in input.iter().zip(out.iter()) {
        not(circuit, input, out);
    }
}

pub fn and_xn<C: CircuitContext>(circuit: &mut C, a: WireRange, b: WireRange, out: WireRange) {
    assert_same_width(&out, &a);
    assert_same_width(&out, &b);

    for ((a, b), out) in a.iter().zip(b.iter()).zip(out.iter()) {
        and(circuit, a, b, out);
    }
}

pub fn or_xn<C: CircuitContext>(circuit: &mut C, a: WireRange, b: WireRange, out: WireRange) {
    assert_same_width(&out, &a);
    assert_same_width(&out, &b);

    for ((a, b), out) in a.iter().zip(b.iter()).zip(out.iter()) {
        or(circuit, a, b, out);
    }
}

pub fn xor_xn<C: CircuitContext>(circuit: &mut C, a: WireRange, b: WireRange, out: WireRange) {
    assert_same_width(&out, &a);
    assert_same_width(&out, &b);

    for ((a, b), out) in a.iter().zip(b.iter()).zip(out.iter()) {
        xor(circuit, a, b, out);
    }
}

/// Balanced reduction of `inputs` through `gate`, landing on `out`.
///
/// A single input is copied through `gate(x, x)`, which is the identity for
/// AND and OR.
fn reduce<C: CircuitContext>(
    circuit: &mut C,
    inputs: &[WireId],
    out: WireId,
    gate: fn(&mut C, WireId, WireId, WireId),
) {
    assert!(!inputs.is_empty(), "reduction over an empty bus");

    let mut level = inputs.to_vec();
    while level.len() > 2 {
        level = level
            .chunks(2)
            .map(|pair| match *pair {
                [a, b] => {
                    let wire = circuit.issue_wire();
                    gate(circuit, a, b, wire);
                    wire
                }
                [single] => single,
                _ => unreachable!("chunks(2) yields one or two wires"),
            })
            .collect();
    }

    match *level.as_slice() {
        [single] => gate(circuit, single, single, out),
        [a, b] => gate(circuit, a, b, out),
        _ => unreachable!("reduction stops at one or two wires"),
    }
}

pub(crate) fn and_reduce<C: CircuitContext>(circuit: &mut C, inputs: &[WireId], out: WireId) {
    reduce(circuit, inputs, out, and::<C>);
}

pub(crate) fn or_reduce<C: CircuitContext>(circuit: &mut C, inputs: &[WireId], out: WireId) {
    reduce(circuit, inputs, out, or::<C>);
}

/// `out := input[0] && input[1] && ...`
pub fn and_x1<C: CircuitContext>(circuit: &mut C, input: WireRange, out: WireId) {
    let inputs: Vec<_> = input.iter().collect();
    and_reduce(circuit, &inputs, out);
}

/// `out := input[0] || input[1] || ...`
pub fn or_x1<C: CircuitContext>(circuit: &mut C, input: WireRange, out: WireId) {
    let inputs: Vec<_> = input.iter().collect();
    or_reduce(circuit, &inputs, out);
}

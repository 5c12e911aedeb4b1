use super::*;

const TEST_CASES: [(bool, bool); 4] =
    [(false, false), (false, true), (true, false), (true, true)];

fn create_test_wire_ids() -> (WireId, WireId, WireId) {
    (WireId(0), WireId(1), WireId(2))
}

fn test_gate_e2e(gate: Gate, expected_fn: fn(bool, bool) -> Option<bool>, gate_name: &str) {
    for (input_a, input_b) in TEST_CASES {
        for previous in [false, true] {
            let mut wires = [input_a, input_b, previous];
            gate.evaluate(&mut wires);

            let expected = expected_fn(input_a, input_b).unwrap_or(previous);
            assert_eq!(
                wires[2], expected,
                "Evaluation should be correct for {gate_name}({input_a}, {input_b}) with output previously {previous}"
            );
            assert_eq!(
                (wires[0], wires[1]),
                (input_a, input_b),
                "{gate_name} must not write its inputs"
            );
        }
    }
}

#[test]
fn test_nand_gate() {
    let (wire_a, wire_b, wire_c) = create_test_wire_ids();
    let gate = Gate::nand(wire_a, wire_b, wire_c);
    test_gate_e2e(gate, |a, b| Some(!(a && b)), "NAND");
}

#[test]
fn test_tri_state_gate() {
    let (wire_a, wire_b, wire_c) = create_test_wire_ids();
    let gate = Gate::tri_state(wire_a, wire_b, wire_c);
    test_gate_e2e(gate, |input, enable| enable.then_some(input), "TriState");
}

#[test]
fn test_nand_with_shared_input_is_not() {
    let gate = Gate::nand(WireId(0), WireId(0), WireId(1));
    for input in [false, true] {
        let mut wires = [input, input];
        gate.evaluate(&mut wires);
        assert_eq!(wires[1], !input, "NOT({input})");
    }
}

#[test]
fn test_tri_state_disabled_leaves_output() {
    let gate = Gate::tri_state(WireId(0), WireId(1), WireId(2));
    assert_eq!(gate.execute(true, false), None);
    assert_eq!(gate.execute(false, false), None);
    assert_eq!(gate.execute(true, true), Some(true));
}

#[test]
fn test_gate_count_total() {
    let count = GateCount {
        nand: 5,
        tri_state: 2,
    };
    assert_eq!(count.total(), 7);
}

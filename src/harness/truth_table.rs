use std::io::{self, Write};

use itertools::Itertools;
use log::debug;
use rand::Rng;

use super::console::Console;
use crate::{Circuit, WireId, WireRange};

/// Width of the `[Name]:` column in result lines.
pub const TEST_RESULT_PRINT_PADDING: usize = 20;

/// Rows of input bits followed by the output bits they must produce.
///
/// Rows are checked in order against one circuit, so sequential state from
/// one row carries into the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TruthTable {
    input_count: usize,
    output_count: usize,
    cells: Vec<bool>,
}

impl TruthTable {
    /// `cells` is row-major, each row holding `input_count` inputs then
    /// `output_count` outputs, as `0`/`1`.
    pub fn new(input_count: usize, output_count: usize, cells: &[u8]) -> Self {
        let columns = input_count + output_count;
        assert!(columns > 0, "truth table without columns");
        assert_eq!(
            cells.len() % columns,
            0,
            "truth table cells must fill whole rows of {columns}"
        );

        Self {
            input_count,
            output_count,
            cells: cells.iter().map(|&cell| cell != 0).collect(),
        }
    }

    /// Exhaustive table over every input combination, first input most
    /// significant.
    pub fn from_fn(
        input_count: usize,
        output_count: usize,
        f: impl Fn(&[bool]) -> Vec<bool>,
    ) -> Self {
        let mut cells = Vec::with_capacity((input_count + output_count) << input_count);
        for state in 0..1usize << input_count {
            let inputs = state_bits(state, input_count);
            let outputs = f(&inputs);
            assert_eq!(outputs.len(), output_count, "row {state} output width");
            cells.extend(inputs);
            cells.extend(outputs);
        }

        Self {
            input_count,
            output_count,
            cells,
        }
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn row_count(&self) -> usize {
        self.cells.len() / (self.input_count + self.output_count)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&[bool], &[bool])> {
        self.cells
            .chunks(self.input_count + self.output_count)
            .map(|row| row.split_at(self.input_count))
    }
}

fn state_bits(state: usize, count: usize) -> Vec<bool> {
    (0..count)
        .map(|index| (state >> (count - 1 - index)) & 1 == 1)
        .collect()
}

/// Randomizes the wire state once, then applies each row and simulates one
/// pass. Fails on the first output that disagrees.
pub fn verify_truth_table(
    circuit: &mut Circuit,
    table: &TruthTable,
    inputs: WireRange,
    outputs: WireRange,
    rng: &mut impl Rng,
) -> bool {
    assert_eq!(inputs.len(), table.input_count(), "truth table input width");
    assert_eq!(outputs.len(), table.output_count(), "truth table output width");

    circuit.randomize_wire_state(rng);

    for (row_index, (input_values, output_values)) in table.rows().enumerate() {
        for (wire, &bit) in inputs.iter().zip(input_values) {
            circuit.set_wire(wire, bit);
        }

        circuit.simulate();

        let mismatch = outputs
            .iter()
            .zip(output_values)
            .find(|&(wire, &bit)| !circuit.expect_wire(wire, bit));
        if let Some((wire, expected)) = mismatch {
            debug!(
                "truth table row {row_index} of {}: wire {wire} expected {expected}",
                table.row_count()
            );
            return false;
        }
    }

    true
}

/// Prints `[name]:`, pads to [`TEST_RESULT_PRINT_PADDING`], then the verdict.
pub fn output_test_result<W: Write>(
    console: &mut Console<W>,
    name: &str,
    successful: bool,
) -> io::Result<usize> {
    let mut so_far = console.print(&format!("[{name}]:"))?;
    if so_far < TEST_RESULT_PRINT_PADDING {
        so_far += console.print_repeat(" ", TEST_RESULT_PRINT_PADDING - so_far)?;
    }

    let verdict = if successful { "[SUCCESS]" } else { "[FAILED]" };
    Ok(so_far + console.println(verdict)?)
}

fn cell(label: &str, value: &str) -> String {
    format!("{value:^width$}", width = label.len() + 4)
}

fn bit(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Drives every combination of `inputs` (first input most significant) and
/// prints the observed `output` under a labelled header.
pub fn print_truth_table<W: Write>(
    console: &mut Console<W>,
    name: &str,
    circuit: &mut Circuit,
    inputs: &[(&str, WireId)],
    output: WireId,
) -> io::Result<usize> {
    const OUTPUT_LABEL: &str = "Out";

    let mut written = console.println(&format!("Truth table ({name}):"))?;

    let header = inputs
        .iter()
        .map(|(label, _)| cell(label, label))
        .chain([cell(OUTPUT_LABEL, OUTPUT_LABEL)])
        .join("|");
    written += console.println(&header)?;

    for state in 0..1usize << inputs.len() {
        for ((_, wire), value) in inputs.iter().zip(state_bits(state, inputs.len())) {
            circuit.set_wire(*wire, value);
        }

        circuit.simulate();

        let row = inputs
            .iter()
            .map(|(label, wire)| cell(label, bit(circuit.get_wire(*wire))))
            .chain([cell(OUTPUT_LABEL, bit(circuit.get_wire(output)))])
            .join("|");
        written += console.println(&row)?;
    }

    Ok(written)
}

use std::{
    env,
    io::Write,
    process::ExitCode,
    time::{SystemTime, UNIX_EPOCH},
};

use gate_sim::{
    Circuit, WireId,
    gadgets::{and, nand, not, or, xor},
    harness::{Console, HarnessConfig, HarnessError, SuiteSummary, print_truth_table, run_suite},
};
use itertools::Itertools;
use log::{error, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const SEED_VAR: &str = "GATE_SIM_SEED";

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn seed() -> u64 {
    match env::var(SEED_VAR) {
        Ok(value) => value.trim().parse().unwrap_or_else(|err| {
            warn!("ignoring {SEED_VAR}={value:?}: {err}");
            clock_seed()
        }),
        Err(_) => clock_seed(),
    }
}

fn print_primitives<W: Write>(console: &mut Console<W>) -> Result<(), HarnessError> {
    let mut circuit = Circuit::new();

    let binary: [(&str, fn(&mut Circuit, WireId, WireId, WireId)); 4] =
        [("NAND", nand), ("AND", and), ("OR", or), ("XOR", xor)];

    for (index, (name, build)) in binary.into_iter().enumerate() {
        circuit.reset();
        let [a, b, out] = [(); 3].map(|_| circuit.add_wire());
        build(&mut circuit, a, b, out);
        print_truth_table(console, name, &mut circuit, &[("A", a), ("B", b)], out)?;
        console.print_new_line()?;

        if index == 0 {
            circuit.reset();
            let [input, out] = [(); 2].map(|_| circuit.add_wire());
            not(&mut circuit, input, out);
            print_truth_table(console, "NOT", &mut circuit, &[("In", input)], out)?;
            console.print_new_line()?;
        }
    }

    Ok(())
}

fn run<W: Write>(
    console: &mut Console<W>,
    rng: &mut ChaCha20Rng,
) -> Result<SuiteSummary, HarnessError> {
    print_primitives(console)?;
    run_suite(console, &HarnessConfig::default(), rng)
}

fn main() -> ExitCode {
    // Initialize logging (default to info if RUST_LOG not set)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let seed = seed();
    info!("seed {seed} (set {SEED_VAR} to reproduce)");
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let mut console = Console::stdout();
    match run(&mut console, &mut rng) {
        Ok(summary) if summary.all_passed() => ExitCode::SUCCESS,
        Ok(summary) => {
            error!("failed checks: {}", summary.failures().join(", "));
            ExitCode::from(1)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(2)
        }
    }
}

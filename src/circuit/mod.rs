mod circuit_context;

pub use circuit_context::CircuitContext;

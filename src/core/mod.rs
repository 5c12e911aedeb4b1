pub mod circuit;
pub mod gate;
pub mod wire;

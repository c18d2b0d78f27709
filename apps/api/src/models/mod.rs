pub mod generation;

pub use generation::{Generation, GenerationRow, NewGeneration};

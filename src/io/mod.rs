//! # Input readers
pub mod boundaries;
pub mod decompress;
pub mod genes;
pub mod halves;

pub use boundaries::read_boundaries;
pub use genes::read_genes;
pub use halves::read_halves;

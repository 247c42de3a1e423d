//! Class file assembler and the cross-crate scenario suites.

mod testing;
#[cfg(test)]
mod tests;

pub use testing::*;

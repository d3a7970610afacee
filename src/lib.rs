pub mod config;
pub mod error;
pub mod node;
pub mod ring;
pub mod storage_engine;
pub mod telemetry;
pub mod utils;

pub use node::Node;
pub use ring::Ring;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

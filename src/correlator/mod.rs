// src/correlator/mod.rs
// Correlation is the join query in Store::get_findings and is effectively
// free; the non-trivial design here is the adaptive polling loop (4.5).

pub mod poller;

pub use poller::{Poller, PollerState};

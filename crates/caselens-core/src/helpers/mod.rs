// crates/caselens-core/src/helpers/mod.rs
//
// Small pure utilities shared across crates.

pub mod time;

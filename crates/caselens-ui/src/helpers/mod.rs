// crates/caselens-ui/src/helpers/mod.rs

pub mod format;

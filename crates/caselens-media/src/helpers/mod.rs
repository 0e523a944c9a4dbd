// crates/caselens-media/src/helpers/mod.rs
//
// Internal helper modules for caselens-media.
// Not re-exported from lib.rs — these are decode/encode implementation
// details, not part of the public API consumed by caselens-ui.

pub mod jpeg;
pub mod seek;

// crates/caselens-media/src/lib.rs
//
// No egui dependency — communicates with caselens-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs (a new MediaWorker method)

pub mod audio;
pub mod decode;
pub mod error;
pub mod helpers;
pub mod probe;
pub mod region;
pub mod sample;
pub mod still;
pub mod worker;

// Re-export the main public API so caselens-ui imports are simple.
pub use error::MediaError;
pub use worker::MediaWorker;
pub use caselens_core::media_types::MediaResult;

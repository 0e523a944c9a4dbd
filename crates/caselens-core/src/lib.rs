// crates/caselens-core/src/lib.rs
//
// Pure session state and logic. No egui, no ffmpeg — everything here is
// plain data and deterministic transforms, which is what makes the tool
// rules and the wire contracts unit-testable without a window or a codec.
//
// To add a new overlay tool:
//   1. Add a ToolMode variant and an engine file under tools/
//   2. Route it in ToolController::pointer_{down,move,up}
//   3. Paint it in caselens-ui/src/modules/canvas.rs

pub mod commands;
pub mod contracts;
pub mod filter;
pub mod geometry;
pub mod helpers;
pub mod media_types;
pub mod overlay;
pub mod session;
pub mod tools;

// Re-export the types the other crates touch constantly so their imports
// stay shallow.
pub use commands::ViewerCommand;
pub use media_types::MediaResult;
pub use session::SessionState;

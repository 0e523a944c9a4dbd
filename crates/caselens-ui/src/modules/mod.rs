// crates/caselens-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing ViewerModule
//   2. Add `pub mod mypanel;` below
//   3. Give it a field and a panel slot in app.rs

pub mod canvas;
pub mod evidence;
pub mod inspector;
pub mod sources;

use caselens_core::commands::ViewerCommand;
use caselens_core::session::SessionState;
use egui::Ui;

use crate::context::AppContext;

/// Every panel implements this trait.
/// Panels read state and emit commands; they never mutate state directly.
/// The context is passed for textures and in-flight bookkeeping, not for
/// issuing work: anything that changes the session goes through a command.
pub trait ViewerModule {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &SessionState,
        ctx:   &mut AppContext,
        cmd:   &mut Vec<ViewerCommand>,
    );
}

//! Interactive egui viewer
//!
//! [`ViewerApp`] drives the whole session: a side panel with the patient
//! selector and display controls, and a central panel showing the windowed
//! slice (with optional nodule overlay) above the nodule gallery.

mod state;
mod viewer;

pub use state::ViewerState;
pub use viewer::ViewerApp;

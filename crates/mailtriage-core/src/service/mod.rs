//! High-level services: the batch triage run and the editor surface.

mod editor;
mod run;

pub use editor::{EditorError, EditorResult, EditorService, MessageDetail, ValidationError};
pub use run::{RunSummary, run_triage};

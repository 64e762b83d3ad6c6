//! Core engine-facing contracts.
//!
//! The interface between the runtime loop and the application (studio):
//! window events in, one `FrameCtx` per redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};

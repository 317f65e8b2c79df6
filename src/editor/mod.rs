//! Editing session: position, key and layer commands, clipboard, undo wiring.

/// Owned clipboard for copy, cut and paste.
pub mod clipboard;
/// The editing session.
pub mod session;

pub use clipboard::{Clipboard, ClipboardContent};
pub use session::Editor;

pub mod cli;
pub mod error;
pub mod net;
pub mod policy;
pub mod shortcut;

pub use error::ShortcutError;
pub use shortcut::{Decision, ShortcutResolver};

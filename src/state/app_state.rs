use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::bindings::Bindings;

use super::{cursors::Cursors, focus::Focus, library::ResponsesList, popup::Popup, shared::Shared};

/// Everything the render loop owns. Fields shared with the HTTP side live
/// behind `shared`.
#[derive(Debug)]
pub struct AppState {
    pub shared: Arc<Shared>,
    pub responses: ResponsesList,
    pub config_path: PathBuf,
    pub focus: Focus,
    /// Which overlay popup (if any) is currently open.
    pub popup: Option<Popup>,
    pub cursors: Cursors,
    /// Commit panel edits to the live response when focus moves.
    pub auto_update: bool,
    /// Set by editors whenever a panel buffer changes.
    pub has_changed: bool,
    pub hide_response_builder: bool,
    /// When the info bar should be cleared.
    pub info_expires: Option<Instant>,
    pub bindings: Bindings,
    pub should_quit: bool,
    /// Set when the render loop must stop with an error.
    pub failure: Option<String>,
}

impl AppState {
    pub fn new(shared: Arc<Shared>, config_path: PathBuf, auto_update: bool) -> Self {
        Self {
            shared,
            responses: ResponsesList::new(),
            config_path,
            focus: Focus::default(),
            popup: None,
            cursors: Cursors::default(),
            auto_update,
            has_changed: false,
            hide_response_builder: false,
            info_expires: None,
            bindings: Bindings::DEFAULT,
            should_quit: false,
            failure: None,
        }
    }
}

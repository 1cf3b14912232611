use crate::state::focus::ViewName;

/// Modal popups. At most one is open; `AppState::popup` holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    Help,
    Responses,
    SaveResponse,
    SaveRequest,
    FileDialog,
}

impl Popup {
    pub fn view(&self) -> ViewName {
        match self {
            Popup::Help => ViewName::Bindings,
            Popup::Responses => ViewName::Responses,
            Popup::SaveResponse | Popup::SaveRequest => ViewName::Save,
            Popup::FileDialog => ViewName::FileDialog,
        }
    }
}

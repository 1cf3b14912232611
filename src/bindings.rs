use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::state::focus::ViewName;
use crate::view::ViewManager;

/// A key as bindings see it. Shift is folded into the character for
/// printable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = event.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT);
        let code = match event.code {
            KeyCode::Char(c) => {
                modifiers.remove(KeyModifiers::SHIFT);
                if modifiers.contains(KeyModifiers::CONTROL) {
                    KeyCode::Char(c.to_ascii_lowercase())
                } else {
                    KeyCode::Char(c)
                }
            }
            KeyCode::BackTab => {
                modifiers.remove(KeyModifiers::SHIFT);
                KeyCode::BackTab
            }
            code => code,
        };
        Self { code, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NextView,
    PrevView,
    UpdateResponse,
    ResetRequests,
    SaveResponseAs,
    SaveRequestAs,
    ToggleResponsesList,
    ToggleResponseBuilder,
    OpenBodyFile,
    SwitchBodyMode,
    ToggleLineWrap,
    ClosePopup,
    PrevRequest,
    NextRequest,
    Quit,
    ToggleHelp,
    ResponsesUp,
    ResponsesDown,
    ResponsesSelect,
    ResponsesDelete,
    ConfirmSave,
    ConfirmBodyFile,
}

/// One row of the table. Rows without an action are shown in help only;
/// rows without a name or help text are bound but not shown.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub key: Key,
    pub name: &'static str,
    pub help: &'static str,
    /// Empty means global.
    pub views: &'static [ViewName],
    pub action: Option<Action>,
}

const fn bind(key: Key, name: &'static str, help: &'static str, action: Action) -> Binding {
    Binding { key, name, help, views: &[], action: Some(action) }
}

const fn bind_on(key: Key, views: &'static [ViewName], action: Action) -> Binding {
    Binding { key, name: "", help: "", views, action: Some(action) }
}

#[derive(Debug, Clone, Copy)]
pub struct Bindings(pub &'static [Binding]);

impl Bindings {
    pub const DEFAULT: Bindings = Bindings(&[
        bind(Key::plain(KeyCode::Tab), "Tab", "Next Input", Action::NextView),
        bind(Key::plain(KeyCode::BackTab), "Shift+Tab", "Previous Input", Action::PrevView),
        bind(Key::ctrl('a'), "Ctrl+a", "Update Response", Action::UpdateResponse),
        bind(Key::ctrl('r'), "Ctrl+r", "Reset Request history", Action::ResetRequests),
        bind(Key::ctrl('s'), "Ctrl+s", "Save Response as", Action::SaveResponseAs),
        bind(Key::ctrl('f'), "Ctrl+f", "Save Request as", Action::SaveRequestAs),
        bind(Key::ctrl('l'), "Ctrl+l", "Toggle Responses list", Action::ToggleResponsesList),
        bind(Key::ctrl('t'), "Ctrl+t", "Toggle Response builder", Action::ToggleResponseBuilder),
        bind(Key::ctrl('o'), "Ctrl+o", "Open Body file...", Action::OpenBodyFile),
        bind(Key::ctrl('b'), "Ctrl+b", "Switch Body mode", Action::SwitchBodyMode),
        bind(Key::ctrl('w'), "Ctrl+w", "Toggle line wrap", Action::ToggleLineWrap),
        Binding {
            key: Key::plain(KeyCode::Char('q')),
            name: "q",
            help: "Close Popup",
            views: &[ViewName::Bindings, ViewName::Responses],
            action: Some(Action::ClosePopup),
        },
        bind(Key::plain(KeyCode::PageUp), "PgUp", "Previous Request", Action::PrevRequest),
        bind(Key::plain(KeyCode::PageDown), "PgDown", "Next Request", Action::NextRequest),
        bind(Key::ctrl('c'), "Ctrl+c", "Quit", Action::Quit),
        // Popup keys, not listed in help.
        bind_on(Key::plain(KeyCode::Up), &[ViewName::Responses], Action::ResponsesUp),
        bind_on(Key::plain(KeyCode::Down), &[ViewName::Responses], Action::ResponsesDown),
        bind_on(Key::plain(KeyCode::Enter), &[ViewName::Responses], Action::ResponsesSelect),
        bind_on(Key::plain(KeyCode::Char('d')), &[ViewName::Responses], Action::ResponsesDelete),
        bind_on(Key::plain(KeyCode::Enter), &[ViewName::Save], Action::ConfirmSave),
        bind_on(Key::plain(KeyCode::Enter), &[ViewName::FileDialog], Action::ConfirmBodyFile),
    ]);

    pub const TOGGLE_HELP: Key = Key::ctrl('h');

    /// Binds every row that has an action, then Ctrl+h globally.
    pub fn apply<M: ViewManager>(&self, manager: &mut M) {
        for binding in self.0 {
            let Some(action) = binding.action else {
                continue;
            };
            if binding.views.is_empty() {
                manager.set_keybinding(None, binding.key, action);
            } else {
                for view in binding.views {
                    manager.set_keybinding(Some(*view), binding.key, action);
                }
            }
        }
        manager.set_keybinding(None, Self::TOGGLE_HELP, Action::ToggleHelp);
    }

    /// Binds only the rows attached to `view`. Closing a popup drops its
    /// bindings, so popups reinstall theirs when they open.
    pub fn apply_view<M: ViewManager>(&self, manager: &mut M, view: ViewName) {
        for binding in self.0 {
            if let Some(action) = binding.action {
                if binding.views.contains(&view) {
                    manager.set_keybinding(Some(view), binding.key, action);
                }
            }
        }
    }

    /// Two aligned columns, one row per named binding, Ctrl+h last.
    pub fn help(&self) -> String {
        let mut rows: Vec<(String, &str)> = self
            .0
            .iter()
            .filter(|b| !b.name.is_empty() && !b.help.is_empty())
            .map(|b| (format!("  {}", b.name), b.help))
            .collect();
        rows.push(("  Ctrl+h".to_string(), "Toggle Help"));

        let width = rows.iter().map(|(cell, _)| cell.chars().count()).max().unwrap_or(0) + 3;
        rows.iter()
            .map(|(cell, help)| format!("{cell:<width$}: {help}\n"))
            .collect()
    }
}

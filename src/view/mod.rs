pub mod editor;

use crate::bindings::{Action, Key};
use crate::error::AppError;
use crate::state::focus::ViewName;

use self::editor::Editor;

/// A named panel. Corners are inclusive terminal cells; the text area is
/// one cell inside them on every side, framed or not.
#[derive(Debug, Clone)]
pub struct View {
    name: ViewName,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub title: String,
    pub frame: bool,
    pub editable: bool,
    pub editor: Editor,
    pub wrap: bool,
    pub highlight: bool,
    lines: Vec<String>,
    cursor: (usize, usize),
}

fn byte_offset(line: &str, x: usize) -> usize {
    line.char_indices().nth(x).map(|(i, _)| i).unwrap_or(line.len())
}

impl View {
    fn new(name: ViewName, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            name,
            x0,
            y0,
            x1,
            y1,
            title: String::new(),
            frame: true,
            editable: false,
            editor: Editor::default(),
            wrap: false,
            highlight: false,
            lines: Vec::new(),
            cursor: (0, 0),
        }
    }

    pub fn name(&self) -> ViewName {
        self.name
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.cursor = (0, 0);
    }

    /// Appends text; `\n` starts a new line.
    pub fn write_str(&mut self, text: &str) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        for c in text.chars() {
            match c {
                '\n' => self.lines.push(String::new()),
                '\r' => {}
                c => {
                    if let Some(last) = self.lines.last_mut() {
                        last.push(c);
                    }
                }
            }
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.write_str(&String::from_utf8_lossy(bytes));
    }

    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.write_str(text);
    }

    pub fn buffer(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, y: usize) -> Option<&str> {
        self.lines.get(y).map(String::as_str)
    }

    pub fn line_len(&self, y: usize) -> usize {
        self.line(y).map(|l| l.chars().count()).unwrap_or(0)
    }

    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor = (x, y);
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    pub fn move_left(&mut self) {
        let (x, y) = self.cursor;
        let x = x.min(self.line_len(y));
        if x > 0 {
            self.cursor = (x - 1, y);
        } else if y > 0 {
            self.cursor = (self.line_len(y - 1), y - 1);
        }
    }

    pub fn move_right(&mut self) {
        let (x, y) = self.cursor;
        if x < self.line_len(y) {
            self.cursor = (x + 1, y);
        } else if y + 1 < self.lines.len() {
            self.cursor = (0, y + 1);
        }
    }

    pub fn move_up(&mut self) {
        let (x, y) = self.cursor;
        if y > 0 {
            self.cursor = (x.min(self.line_len(y - 1)), y - 1);
        }
    }

    pub fn move_down(&mut self) {
        let (x, y) = self.cursor;
        if y + 1 < self.lines.len() {
            self.cursor = (x.min(self.line_len(y + 1)), y + 1);
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.0 = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.0 = self.line_len(self.cursor.1);
    }

    fn ensure_line(&mut self) {
        while self.lines.len() <= self.cursor.1 {
            self.lines.push(String::new());
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.ensure_line();
        let (x, y) = self.cursor;
        let line = &mut self.lines[y];
        let at = byte_offset(line, x);
        line.insert(at, c);
        self.cursor = (x.min(line.chars().count() - 1) + 1, y);
    }

    pub fn insert_newline(&mut self) {
        self.ensure_line();
        let (x, y) = self.cursor;
        let at = byte_offset(&self.lines[y], x);
        let rest = self.lines[y].split_off(at);
        self.lines.insert(y + 1, rest);
        self.cursor = (0, y + 1);
    }

    /// Backspace. Joins with the previous line at column zero.
    pub fn delete_backward(&mut self) -> bool {
        let (x, y) = self.cursor;
        if y >= self.lines.len() {
            return false;
        }
        let x = x.min(self.line_len(y));
        if x > 0 {
            let line = &mut self.lines[y];
            let start = byte_offset(line, x - 1);
            let end = byte_offset(line, x);
            line.drain(start..end);
            self.cursor = (x - 1, y);
            true
        } else if y > 0 {
            let tail = self.lines.remove(y);
            let joint = self.line_len(y - 1);
            self.lines[y - 1].push_str(&tail);
            self.cursor = (joint, y - 1);
            true
        } else {
            false
        }
    }

    /// Delete key. Joins with the next line at line end.
    pub fn delete_forward(&mut self) -> bool {
        let (x, y) = self.cursor;
        if y >= self.lines.len() {
            return false;
        }
        let len = self.line_len(y);
        if x < len {
            let line = &mut self.lines[y];
            let start = byte_offset(line, x);
            let end = byte_offset(line, x + 1);
            line.drain(start..end);
            true
        } else if y + 1 < self.lines.len() {
            let next = self.lines.remove(y + 1);
            self.lines[y].push_str(&next);
            true
        } else {
            false
        }
    }
}

/// What the state engine needs from the terminal layer. All calls happen on
/// the render loop.
pub trait ViewManager {
    /// Terminal size in cells.
    fn size(&self) -> (i32, i32);

    /// Creates the view or moves an existing one. The flag is `true` when
    /// the view was just created.
    fn set_view(&mut self, name: ViewName, x0: i32, y0: i32, x1: i32, y1: i32) -> (&mut View, bool);

    fn view(&self, name: ViewName) -> Option<&View>;

    fn view_mut(&mut self, name: ViewName) -> Option<&mut View>;

    fn delete_view(&mut self, name: ViewName) -> bool;

    fn current_view(&self) -> Option<ViewName>;

    fn set_current_view(&mut self, name: ViewName) -> Result<(), AppError>;

    /// `None` binds globally. Rebinding a key on the same view replaces it.
    fn set_keybinding(&mut self, view: Option<ViewName>, key: Key, action: Action);

    fn delete_keybindings(&mut self, view: ViewName);

    fn keybinding(&self, view: Option<ViewName>, key: Key) -> Option<Action>;

    fn set_cursor_visible(&mut self, visible: bool);

    /// The action for `key`: a binding on the current view wins over a
    /// global one.
    fn resolve(&self, key: Key) -> Option<Action> {
        self.current_view()
            .and_then(|view| self.keybinding(Some(view), key))
            .or_else(|| self.keybinding(None, key))
    }
}

/// Retained set of views drawn every frame by `ui::render`.
#[derive(Debug)]
pub struct Screen {
    width: i32,
    height: i32,
    views: Vec<View>,
    current: Option<ViewName>,
    bindings: Vec<(Option<ViewName>, Key, Action)>,
    cursor_visible: bool,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: i32::from(width),
            height: i32::from(height),
            views: Vec::new(),
            current: None,
            bindings: Vec::new(),
            cursor_visible: true,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = i32::from(width);
        self.height = i32::from(height);
    }

    /// Views in draw order, last on top.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Topmost view covering the cell.
    pub fn view_at(&self, x: i32, y: i32) -> Option<ViewName> {
        self.views.iter().rev().find(|v| v.contains(x, y)).map(View::name)
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}

impl ViewManager for Screen {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn set_view(&mut self, name: ViewName, x0: i32, y0: i32, x1: i32, y1: i32) -> (&mut View, bool) {
        if let Some(pos) = self.views.iter().position(|v| v.name == name) {
            let view = &mut self.views[pos];
            (view.x0, view.y0, view.x1, view.y1) = (x0, y0, x1, y1);
            return (view, false);
        }
        self.views.push(View::new(name, x0, y0, x1, y1));
        let last = self.views.len() - 1;
        (&mut self.views[last], true)
    }

    fn view(&self, name: ViewName) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    fn view_mut(&mut self, name: ViewName) -> Option<&mut View> {
        self.views.iter_mut().find(|v| v.name == name)
    }

    fn delete_view(&mut self, name: ViewName) -> bool {
        let before = self.views.len();
        self.views.retain(|v| v.name != name);
        if self.current == Some(name) {
            self.current = None;
        }
        self.views.len() != before
    }

    fn current_view(&self) -> Option<ViewName> {
        self.current
    }

    fn set_current_view(&mut self, name: ViewName) -> Result<(), AppError> {
        if self.view(name).is_none() {
            return Err(AppError::UnknownView(name.as_str()));
        }
        self.current = Some(name);
        Ok(())
    }

    fn set_keybinding(&mut self, view: Option<ViewName>, key: Key, action: Action) {
        match self.bindings.iter_mut().find(|(v, k, _)| *v == view && *k == key) {
            Some(binding) => binding.2 = action,
            None => self.bindings.push((view, key, action)),
        }
    }

    fn delete_keybindings(&mut self, view: ViewName) {
        self.bindings.retain(|(v, _, _)| *v != Some(view));
    }

    fn keybinding(&self, view: Option<ViewName>, key: Key) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(v, k, _)| *v == view && *k == key)
            .map(|(_, _, action)| *action)
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_set_view_reports_creation_once() {
        let mut screen = Screen::new(80, 24);
        let (_, created) = screen.set_view(ViewName::Status, 0, 0, 10, 2);
        assert!(created);
        let (view, created) = screen.set_view(ViewName::Status, 1, 1, 11, 3);
        assert!(!created);
        assert_eq!((view.x0, view.y1), (1, 3));
        assert_eq!(screen.views().len(), 1);
    }

    #[test]
    fn test_set_current_view_requires_existing_view() {
        let mut screen = Screen::new(80, 24);
        assert!(matches!(
            screen.set_current_view(ViewName::Body),
            Err(AppError::UnknownView("body"))
        ));
        screen.set_view(ViewName::Body, 0, 0, 10, 10);
        screen.set_current_view(ViewName::Body).unwrap();
        assert_eq!(screen.current_view(), Some(ViewName::Body));
        assert!(screen.delete_view(ViewName::Body));
        assert_eq!(screen.current_view(), None);
        assert!(!screen.delete_view(ViewName::Body));
    }

    #[test]
    fn test_view_bindings_shadow_globals() {
        let mut screen = Screen::new(80, 24);
        let q = Key::new(KeyCode::Char('q'), KeyModifiers::NONE);
        screen.set_view(ViewName::Bindings, 0, 0, 10, 10);
        screen.set_view(ViewName::Status, 0, 0, 10, 10);
        screen.set_keybinding(None, q, Action::Quit);
        screen.set_keybinding(Some(ViewName::Bindings), q, Action::ClosePopup);

        screen.set_current_view(ViewName::Status).unwrap();
        assert_eq!(screen.resolve(q), Some(Action::Quit));
        screen.set_current_view(ViewName::Bindings).unwrap();
        assert_eq!(screen.resolve(q), Some(Action::ClosePopup));

        screen.delete_keybindings(ViewName::Bindings);
        assert_eq!(screen.resolve(q), Some(Action::Quit));
    }

    #[test]
    fn test_view_at_prefers_topmost() {
        let mut screen = Screen::new(80, 24);
        screen.set_view(ViewName::Request, 0, 0, 50, 20);
        screen.set_view(ViewName::Bindings, 10, 5, 30, 10);
        assert_eq!(screen.view_at(15, 6), Some(ViewName::Bindings));
        assert_eq!(screen.view_at(2, 2), Some(ViewName::Request));
        assert_eq!(screen.view_at(70, 22), None);
    }

    #[test]
    fn test_write_and_buffer() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Headers, 0, 0, 10, 10);
        view.write_str("A: 1\r\nB: 2");
        assert_eq!(view.lines(), ["A: 1", "B: 2"]);
        assert_eq!(view.buffer(), "A: 1\nB: 2");
        view.set_text("");
        assert_eq!(view.buffer(), "");
    }

    #[test]
    fn test_editing_primitives() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Body, 0, 0, 10, 10);
        for c in "héllo".chars() {
            view.insert_char(c);
        }
        view.move_left();
        view.move_left();
        view.insert_newline();
        assert_eq!(view.lines(), ["hél", "lo"]);
        assert_eq!(view.cursor(), (0, 1));

        assert!(view.delete_backward());
        assert_eq!(view.buffer(), "héllo");
        assert_eq!(view.cursor(), (3, 0));

        view.move_home();
        assert!(!view.delete_backward());
        assert!(view.delete_forward());
        assert_eq!(view.buffer(), "éllo");
        view.move_end();
        assert_eq!(view.cursor(), (4, 0));
        assert!(!view.delete_forward());
    }

    #[test]
    fn test_left_from_past_line_end() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Request, 0, 0, 10, 10);
        view.set_cursor(7, 0);
        view.move_left();
        assert_eq!(view.cursor(), (0, 0));

        view.set_text("ab\ncd");
        view.set_cursor(9, 1);
        view.move_left();
        assert_eq!(view.cursor(), (1, 1));
        view.set_cursor(5, 3);
        view.move_left();
        assert_eq!(view.cursor(), (0, 2));
    }
}

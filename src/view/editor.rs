use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::View;

/// How an editable view reacts to keys that no binding claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Editor {
    /// Cursor movement only. The request panel uses this.
    Motion,
    /// Digits only, up to `max_len` characters.
    Numeric { max_len: usize },
    #[default]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Changed,
    Unchanged,
}

impl Editor {
    pub fn edit(&self, view: &mut View, key: KeyEvent) -> Edit {
        // Down and Right past the last line would leave the cursor on
        // nothing.
        if matches!(key.code, KeyCode::Down | KeyCode::Right) && view.line(view.cursor().1).is_none() {
            return Edit::Unchanged;
        }

        match self {
            Editor::Motion => motion(view, key.code),
            Editor::Numeric { max_len } => numeric(view, key.code, *max_len),
            Editor::Text => text(view, key),
        }
    }
}

fn motion(view: &mut View, code: KeyCode) -> Edit {
    match code {
        KeyCode::Up => view.move_up(),
        KeyCode::Down => view.move_down(),
        KeyCode::Left => view.move_left(),
        KeyCode::Right => view.move_right(),
        _ => return Edit::Unchanged,
    }
    Edit::Unchanged
}

fn numeric(view: &mut View, code: KeyCode, max_len: usize) -> Edit {
    match code {
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if view.char_count() >= max_len {
                return Edit::Unchanged;
            }
            view.insert_char(c);
            Edit::Changed
        }
        KeyCode::Backspace => {
            if view.delete_backward() {
                Edit::Changed
            } else {
                Edit::Unchanged
            }
        }
        KeyCode::Left => {
            view.move_left();
            Edit::Unchanged
        }
        KeyCode::Right => {
            let (x, y) = view.cursor();
            if x < view.line_len(y) {
                view.move_right();
            }
            Edit::Unchanged
        }
        _ => Edit::Unchanged,
    }
}

fn text(view: &mut View, key: KeyEvent) -> Edit {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            view.insert_char(c);
            Edit::Changed
        }
        KeyCode::Enter => {
            view.insert_newline();
            Edit::Changed
        }
        KeyCode::Backspace => changed(view.delete_backward()),
        KeyCode::Delete => changed(view.delete_forward()),
        KeyCode::Up => {
            view.move_up();
            Edit::Unchanged
        }
        KeyCode::Down => {
            view.move_down();
            Edit::Unchanged
        }
        KeyCode::Left => {
            view.move_left();
            Edit::Unchanged
        }
        KeyCode::Right => {
            view.move_right();
            Edit::Unchanged
        }
        KeyCode::Home => {
            view.move_home();
            Edit::Unchanged
        }
        KeyCode::End => {
            view.move_end();
            Edit::Unchanged
        }
        _ => Edit::Unchanged,
    }
}

fn changed(did: bool) -> Edit {
    if did { Edit::Changed } else { Edit::Unchanged }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::focus::ViewName;
    use crate::view::{Screen, ViewManager};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_into(editor: Editor, view: &mut View, input: &str) {
        for c in input.chars() {
            editor.edit(view, press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_numeric_accepts_digits_up_to_limit() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Status, 0, 0, 10, 2);
        let editor = Editor::Numeric { max_len: 3 };

        type_into(editor, view, "4a0x49");
        assert_eq!(view.buffer(), "404");

        assert_eq!(editor.edit(view, press(KeyCode::Backspace)), Edit::Changed);
        assert_eq!(view.buffer(), "40");
        assert_eq!(editor.edit(view, press(KeyCode::Enter)), Edit::Unchanged);
        assert_eq!(view.buffer(), "40");
    }

    #[test]
    fn test_numeric_right_stops_at_line_end() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Delay, 0, 0, 10, 2);
        let editor = Editor::Numeric { max_len: 9 };
        type_into(editor, view, "12");
        editor.edit(view, press(KeyCode::Right));
        assert_eq!(view.cursor(), (2, 0));
        editor.edit(view, press(KeyCode::Left));
        assert_eq!(view.cursor(), (1, 0));
    }

    #[test]
    fn test_down_past_content_is_ignored() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Request, 0, 0, 10, 10);
        assert_eq!(Editor::Text.edit(view, press(KeyCode::Down)), Edit::Unchanged);
        assert_eq!(view.cursor(), (0, 0));
        assert!(view.lines().is_empty());
    }

    #[test]
    fn test_motion_never_edits() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Request, 0, 0, 10, 10);
        view.set_text("GET / HTTP/1.1\nHost: x");
        assert_eq!(Editor::Motion.edit(view, press(KeyCode::Char('z'))), Edit::Unchanged);
        assert_eq!(Editor::Motion.edit(view, press(KeyCode::Down)), Edit::Unchanged);
        assert_eq!(view.cursor(), (0, 1));
        assert_eq!(view.buffer(), "GET / HTTP/1.1\nHost: x");
    }

    #[test]
    fn test_text_editing() {
        let mut screen = Screen::new(80, 24);
        let (view, _) = screen.set_view(ViewName::Headers, 0, 0, 10, 10);
        type_into(Editor::Text, view, "X-A:1");
        Editor::Text.edit(view, press(KeyCode::Enter));
        type_into(Editor::Text, view, "X-B:2");
        assert_eq!(view.buffer(), "X-A:1\nX-B:2");

        let ctrl = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(Editor::Text.edit(view, ctrl), Edit::Unchanged);

        Editor::Text.edit(view, press(KeyCode::Home));
        assert_eq!(Editor::Text.edit(view, press(KeyCode::Backspace)), Edit::Changed);
        assert_eq!(view.buffer(), "X-A:1X-B:2");
    }
}

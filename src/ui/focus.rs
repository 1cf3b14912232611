use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::focus::{Focus, ViewName};
use crate::state::popup::Popup;
use crate::view::ViewManager;

use super::popup::create_popup_view;

impl AppState {
    pub fn next_view<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        if self.hide_response_builder {
            return Ok(());
        }
        self.focus = self.focus.next();
        self.set_view(g, self.focus.view())
    }

    pub fn prev_view<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        if self.hide_response_builder {
            return Ok(());
        }
        self.focus = self.focus.prev();
        self.set_view(g, self.focus.view())
    }

    /// Moves input focus to `name`.
    ///
    /// An open popup is closed first, unless it is the target. With
    /// auto-update on, pending panel edits are committed; a validation
    /// failure shows on the info bar and does not block the move.
    pub fn set_view<M: ViewManager>(&mut self, g: &mut M, name: ViewName) -> Result<(), AppError> {
        if let Some(popup) = self.popup {
            if popup.view() != name {
                self.close_popup(g, popup.view())?;
            }
        }

        if let Some(current) = g.current_view().and_then(|cur| g.view(cur)) {
            let (x, y) = current.cursor();
            self.cursors.set(current.name(), x, y);
        }

        g.set_current_view(name)?;

        if self.auto_update && self.has_changed {
            self.has_changed = false;
            // The failure is already on the info bar.
            let _ = self.update_response(g);
        }
        Ok(())
    }

    /// Opens `popup` centred on screen and gives it focus.
    pub fn open_popup<M: ViewManager>(&mut self, g: &mut M, popup: Popup, w: i32, h: i32) -> Result<(), AppError> {
        let name = popup.view();
        create_popup_view(g, name, w, h);
        self.set_view(g, name)?;
        self.popup = Some(popup);
        g.set_cursor_visible(false);
        self.bindings.apply_view(g, name);
        tracing::debug!(view = name.as_str(), "popup opened");
        Ok(())
    }

    /// Removes the popup view and its bindings, then hands focus back to
    /// the panel that had it. Does nothing when `name` is not on screen.
    pub fn close_popup<M: ViewManager>(&mut self, g: &mut M, name: ViewName) -> Result<(), AppError> {
        if g.view(name).is_none() {
            return Ok(());
        }

        g.delete_view(name);
        g.delete_keybindings(name);
        g.set_cursor_visible(true);
        self.popup = None;
        tracing::debug!(view = name.as_str(), "popup closed");

        let target = if self.hide_response_builder { ViewName::Request } else { self.focus.view() };
        self.set_view(g, target)
    }

    pub fn toggle_help<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        if self.popup == Some(Popup::Help) {
            return self.close_popup(g, ViewName::Bindings);
        }

        let help = self.bindings.help();
        let rows = help.matches('\n').count() as i32;
        self.open_popup(g, Popup::Help, 40, rows + 1)?;
        if let Some(view) = g.view_mut(ViewName::Bindings) {
            view.title = "Bindings".to_string();
            view.write_str(help.trim_end_matches('\n'));
        }
        Ok(())
    }

    /// Mouse click at screen cell (`x`, `y`) on one of the cycling panels.
    /// The cursor lands on the clicked character, clamped to the line; a
    /// click below the text puts the cursor back where it last was.
    pub fn click_view<M: ViewManager>(&mut self, g: &mut M, name: ViewName, x: i32, y: i32) -> Result<(), AppError> {
        if !name.is_cyclic() {
            return Ok(());
        }
        let Some(view) = g.view_mut(name) else {
            return Ok(());
        };

        let cx = (x - view.x0 - 1).max(0) as usize;
        let cy = (y - view.y0 - 1).max(0) as usize;
        match view.line(cy).map(|line| line.chars().count()) {
            Some(len) if cx > len => {
                view.set_cursor(len, cy);
                self.cursors.set(name, len, cy);
            }
            Some(_) => view.set_cursor(cx, cy),
            None => self.cursors.restore(view),
        }

        if let Some(focus) = Focus::on(name) {
            self.focus = focus;
        }
        self.set_view(g, name)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::event::RenderQueue;
    use crate::state::response::Response;
    use crate::state::shared::Shared;
    use crate::view::Screen;

    fn setup(auto_update: bool) -> (AppState, Screen) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::new(Response::default(), RenderQueue::new(tx)));
        let mut state = AppState::new(shared, PathBuf::from(".httplab"), auto_update);
        let mut screen = Screen::new(100, 40);
        state.layout(&mut screen).unwrap();
        (state, screen)
    }

    #[test]
    fn test_tab_cycles_through_panels() {
        let (mut state, mut screen) = setup(false);
        let mut seen = Vec::new();
        for _ in 0..5 {
            state.next_view(&mut screen).unwrap();
            seen.push(screen.current_view().unwrap());
        }
        assert_eq!(
            seen,
            [ViewName::Delay, ViewName::Headers, ViewName::Body, ViewName::Request, ViewName::Status]
        );
        state.prev_view(&mut screen).unwrap();
        assert_eq!(screen.current_view(), Some(ViewName::Request));
    }

    #[test]
    fn test_cycling_disabled_while_builder_hidden() {
        let (mut state, mut screen) = setup(false);
        state.hide_response_builder = true;
        state.next_view(&mut screen).unwrap();
        assert_eq!(state.focus.view(), ViewName::Status);
    }

    #[test]
    fn test_cursor_saved_when_leaving_view() {
        let (mut state, mut screen) = setup(false);
        screen.view_mut(ViewName::Status).unwrap().set_cursor(2, 0);
        state.next_view(&mut screen).unwrap();
        assert_eq!(state.cursors.get(ViewName::Status), (2, 0));
    }

    #[test]
    fn test_help_popup_toggles_and_restores_focus() {
        let (mut state, mut screen) = setup(false);
        state.next_view(&mut screen).unwrap();

        state.toggle_help(&mut screen).unwrap();
        assert_eq!(state.popup, Some(Popup::Help));
        assert_eq!(screen.current_view(), Some(ViewName::Bindings));
        assert!(!screen.cursor_visible());
        let help = screen.view(ViewName::Bindings).unwrap();
        assert_eq!(help.title, "Bindings");
        assert!(help.buffer().ends_with("Ctrl+h      : Toggle Help"));

        state.toggle_help(&mut screen).unwrap();
        assert_eq!(state.popup, None);
        assert!(screen.view(ViewName::Bindings).is_none());
        assert!(screen.cursor_visible());
        assert_eq!(screen.current_view(), Some(ViewName::Delay));
    }

    #[test]
    fn test_close_missing_popup_is_noop() {
        let (mut state, mut screen) = setup(false);
        state.close_popup(&mut screen, ViewName::Responses).unwrap();
        assert_eq!(screen.current_view(), Some(ViewName::Status));
    }

    #[test]
    fn test_focus_change_closes_popup_and_drops_its_bindings() {
        let (mut state, mut screen) = setup(false);
        state.toggle_help(&mut screen).unwrap();
        let q = crate::bindings::Key::plain(crossterm::event::KeyCode::Char('q'));
        assert!(screen.keybinding(Some(ViewName::Bindings), q).is_some());

        state.next_view(&mut screen).unwrap();
        assert_eq!(state.popup, None);
        assert!(screen.view(ViewName::Bindings).is_none());
        assert!(screen.keybinding(Some(ViewName::Bindings), q).is_none());
        assert_eq!(screen.current_view(), Some(ViewName::Delay));
    }

    #[test]
    fn test_auto_update_commits_on_focus_change() {
        let (mut state, mut screen) = setup(true);
        screen.view_mut(ViewName::Status).unwrap().set_text("404");
        state.has_changed = true;
        state.next_view(&mut screen).unwrap();
        assert_eq!(state.shared.response().status, 404);
        assert!(!state.has_changed);
        assert_eq!(screen.view(ViewName::Info).unwrap().buffer(), "Response updated!");
    }

    #[test]
    fn test_auto_update_failure_does_not_block_focus() {
        let (mut state, mut screen) = setup(true);
        screen.view_mut(ViewName::Status).unwrap().set_text("999");
        state.has_changed = true;
        state.next_view(&mut screen).unwrap();
        assert_eq!(screen.current_view(), Some(ViewName::Delay));
        assert_eq!(state.shared.response().status, 200);
        assert!(screen.view(ViewName::Info).unwrap().buffer().starts_with("Invalid status '999'"));
    }

    #[test]
    fn test_auto_update_fires_once_per_pending_edit() {
        let (mut state, mut screen) = setup(true);
        screen.view_mut(ViewName::Status).unwrap().set_text("404");
        state.has_changed = true;

        state.close_popup(&mut screen, ViewName::Bindings).unwrap();
        assert!(state.has_changed);
        assert_eq!(state.shared.response().status, 200);

        state.set_view(&mut screen, ViewName::Status).unwrap();
        assert!(!state.has_changed);
        assert_eq!(state.shared.response().status, 404);

        state.shared.replace_response(Response::default());
        state.set_view(&mut screen, ViewName::Status).unwrap();
        assert_eq!(state.shared.response().status, 200);
    }

    #[test]
    fn test_edits_wait_without_auto_update() {
        let (mut state, mut screen) = setup(false);
        screen.view_mut(ViewName::Status).unwrap().set_text("404");
        state.has_changed = true;
        state.next_view(&mut screen).unwrap();
        assert_eq!(state.shared.response().status, 200);
        assert!(state.has_changed);
    }

    #[test]
    fn test_click_moves_focus_and_clamps_cursor() {
        let (mut state, mut screen) = setup(false);
        // Headers panel spans (70, 4)-(99, 18); its text starts at (71, 5).
        screen.view_mut(ViewName::Headers).unwrap().set_text("A: 1\nLonger: 2");
        state.click_view(&mut screen, ViewName::Headers, 90, 5).unwrap();
        assert_eq!(screen.current_view(), Some(ViewName::Headers));
        assert_eq!(state.focus.view(), ViewName::Headers);
        assert_eq!(screen.view(ViewName::Headers).unwrap().cursor(), (4, 0));
        assert_eq!(state.cursors.get(ViewName::Headers), (4, 0));

        state.click_view(&mut screen, ViewName::Headers, 73, 6).unwrap();
        assert_eq!(screen.view(ViewName::Headers).unwrap().cursor(), (2, 1));
    }

    #[test]
    fn test_clamped_click_is_what_a_later_click_below_restores() {
        let (mut state, mut screen) = setup(false);
        screen.view_mut(ViewName::Headers).unwrap().set_text("A: 1");
        state.click_view(&mut screen, ViewName::Headers, 90, 5).unwrap();
        screen.view_mut(ViewName::Headers).unwrap().set_cursor(0, 0);

        state.click_view(&mut screen, ViewName::Headers, 75, 15).unwrap();
        assert_eq!(screen.view(ViewName::Headers).unwrap().cursor(), (4, 0));
    }

    #[test]
    fn test_click_below_text_restores_saved_cursor() {
        let (mut state, mut screen) = setup(false);
        screen.view_mut(ViewName::Headers).unwrap().set_text("A: 1");
        state.cursors.set(ViewName::Headers, 3, 0);
        state.click_view(&mut screen, ViewName::Headers, 75, 15).unwrap();
        assert_eq!(screen.view(ViewName::Headers).unwrap().cursor(), (3, 0));
    }
}

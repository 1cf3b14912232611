use std::time::Instant;

use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

use crate::bindings::Key;
use crate::error::AppError;
use crate::event::{Event, RenderTask};
use crate::state::app_state::AppState;
use crate::view::editor::Edit;
use crate::view::{Screen, ViewManager};

pub struct App {
    pub state: AppState,
    pub screen: Screen,
}

impl App {
    /// Installs the key bindings and builds the first layout.
    pub fn new(mut state: AppState, width: u16, height: u16) -> Result<Self, AppError> {
        let mut screen = Screen::new(width, height);
        state.bindings.apply(&mut screen);
        state.layout(&mut screen)?;
        Ok(Self { state, screen })
    }

    pub fn handle_event(&mut self, event: Event) {
        let result = match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Key(_) => Ok(()),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Tick => {
                self.state.expire_info(&mut self.screen, Instant::now());
                Ok(())
            }
            Event::Resize(width, height) => {
                self.screen.resize(width, height);
                Ok(())
            }
            Event::Render(task) => {
                self.run_task(task);
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "action failed");
            self.state.info(&mut self.screen, err.to_string());
        }

        if let Err(err) = self.state.layout(&mut self.screen) {
            tracing::error!(error = %err, "layout failed");
            self.state.failure = Some(err.to_string());
            self.state.should_quit = true;
        }
    }

    /// Bound keys run their action; anything else goes to the focused
    /// view's editor.
    fn handle_key(&mut self, key: KeyEvent) -> Result<(), AppError> {
        if let Some(action) = self.screen.resolve(Key::from(key)) {
            tracing::debug!(?action, "key bound");
            return self.state.dispatch(&mut self.screen, action);
        }

        let Some(name) = self.screen.current_view() else {
            return Ok(());
        };
        let Some(view) = self.screen.view_mut(name) else {
            return Ok(());
        };
        if !view.editable {
            return Ok(());
        }
        let editor = view.editor;
        if editor.edit(view, key) == Edit::Changed && name.is_builder() {
            self.state.has_changed = true;
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<(), AppError> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(());
        }
        let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
        match self.screen.view_at(x, y) {
            Some(name) => self.state.click_view(&mut self.screen, name, x, y),
            None => Ok(()),
        }
    }

    fn run_task(&mut self, task: RenderTask) {
        match task {
            RenderTask::RefreshRequest => self.state.refresh_request(&mut self.screen),
            RenderTask::Info(msg) => self.state.info(&mut self.screen, msg),
            RenderTask::Abort(msg) => {
                self.state.failure = Some(msg);
                self.state.should_quit = true;
            }
        }
    }
}

use std::time::{Duration, Instant};

use crate::bindings::Action;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::focus::{Focus, ViewName};
use crate::state::popup::Popup;
use crate::state::response::{BodyMode, Response, expand_path, parse_delay};
use crate::view::ViewManager;

const INFO_TTL: Duration = Duration::from_secs(3);

fn view_buffer<M: ViewManager>(g: &M, name: ViewName) -> String {
    g.view(name).map(|v| v.buffer()).unwrap_or_default()
}

fn popup_value<M: ViewManager>(g: &M, name: ViewName) -> String {
    view_buffer(g, name).trim_matches([' ', '\n']).to_string()
}

impl AppState {
    pub fn dispatch<M: ViewManager>(&mut self, g: &mut M, action: Action) -> Result<(), AppError> {
        match action {
            Action::NextView => self.next_view(g),
            Action::PrevView => self.prev_view(g),
            Action::UpdateResponse => {
                // The failure is already on the info bar.
                let _ = self.update_response(g);
                Ok(())
            }
            Action::ResetRequests => {
                self.reset_requests(g);
                Ok(())
            }
            Action::SaveResponseAs => self.open_save_popup(g, Popup::SaveResponse, "Save Response as..."),
            Action::SaveRequestAs => self.save_request_popup(g),
            Action::ToggleResponsesList => self.toggle_responses_loader(g),
            Action::ToggleResponseBuilder => self.toggle_response_builder(g),
            Action::OpenBodyFile => self.open_body_file_popup(g),
            Action::SwitchBodyMode => {
                self.next_body_mode(g);
                Ok(())
            }
            Action::ToggleLineWrap => {
                if let Some(view) = g.view_mut(ViewName::Request) {
                    view.wrap = !view.wrap;
                }
                Ok(())
            }
            Action::ClosePopup => match g.current_view() {
                Some(name) => self.close_popup(g, name),
                None => Ok(()),
            },
            Action::PrevRequest => {
                self.shared.requests.prev();
                Ok(())
            }
            Action::NextRequest => {
                self.shared.requests.next();
                Ok(())
            }
            Action::Quit => {
                self.should_quit = true;
                Ok(())
            }
            Action::ToggleHelp => self.toggle_help(g),
            Action::ResponsesUp => {
                self.move_responses_cursor(g, false);
                Ok(())
            }
            Action::ResponsesDown => {
                self.move_responses_cursor(g, true);
                Ok(())
            }
            Action::ResponsesSelect => {
                if let Some(resp) = self.responses.cur().cloned() {
                    self.restore_response(g, resp);
                }
                Ok(())
            }
            Action::ResponsesDelete => self.delete_selected_response(g),
            Action::ConfirmSave => self.confirm_save(g),
            Action::ConfirmBodyFile => self.confirm_body_file(g),
        }
    }

    /// Shows `msg` on the info bar for three seconds.
    pub fn info<M: ViewManager>(&mut self, g: &mut M, msg: impl Into<String>) {
        let Some(view) = g.view_mut(ViewName::Info) else {
            return;
        };
        view.set_text(&msg.into());
        self.info_expires = Some(Instant::now() + INFO_TTL);
    }

    /// Clears the info bar once its message has been up long enough.
    pub fn expire_info<M: ViewManager>(&mut self, g: &mut M, now: Instant) {
        if self.info_expires.is_some_and(|at| at <= now) {
            self.info_expires = None;
            if let Some(view) = g.view_mut(ViewName::Info) {
                view.clear();
            }
        }
    }

    /// Shows the request under the log cursor.
    pub fn refresh_request<M: ViewManager>(&self, g: &mut M) {
        let Some(snapshot) = self.shared.requests.current() else {
            return;
        };
        if let Some(view) = g.view_mut(ViewName::Request) {
            view.title = format!("Request ({}/{})", snapshot.index + 1, snapshot.total);
            view.clear();
            view.write(&snapshot.dump);
        }
    }

    pub fn reset_requests<M: ViewManager>(&mut self, g: &mut M) {
        self.shared.requests.reset();
        if let Some(view) = g.view_mut(ViewName::Request) {
            view.title = "Request".to_string();
            view.clear();
        }
        tracing::info!("request history cleared");
        self.info(g, "Requests cleared");
    }

    /// Reads the editing panels into a response. The body source comes from
    /// the live response; in input mode its text is replaced by the panel.
    pub fn current_response<M: ViewManager>(&self, g: &M) -> Result<Response, AppError> {
        let mut resp = Response::parse(
            &view_buffer(g, ViewName::Status),
            &view_buffer(g, ViewName::Headers),
            "",
        )?;

        let live = self.shared.response();
        resp.body = live.body.clone();
        if live.body.mode == BodyMode::Input {
            resp.body.input = view_buffer(g, ViewName::Body).into_bytes();
        }

        resp.delay = parse_delay(&view_buffer(g, ViewName::Delay))?;
        Ok(resp)
    }

    /// Validates the panels and makes the result live. Errors are shown on
    /// the info bar and returned.
    pub fn update_response<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        match self.current_response(g) {
            Ok(resp) => {
                tracing::info!(status = resp.status, delay_ms = resp.delay.as_millis() as u64, "response applied");
                self.shared.replace_response(resp);
                self.info(g, "Response updated!");
                Ok(())
            }
            Err(err) => {
                self.info(g, err.to_string());
                Err(err)
            }
        }
    }

    /// Makes `resp` live and writes it back into the editing panels.
    pub fn restore_response<M: ViewManager>(&mut self, g: &mut M, resp: Response) {
        if let Some(view) = g.view_mut(ViewName::Status) {
            view.set_text(&resp.status.to_string());
        }
        if let Some(view) = g.view_mut(ViewName::Delay) {
            view.set_text(&resp.delay.as_millis().to_string());
        }
        if let Some(view) = g.view_mut(ViewName::Headers) {
            view.set_text(&resp.headers.to_text());
        }
        self.shared.replace_response(resp);
        self.render_body(g);
        self.info(g, "Response loaded!");
    }

    pub fn toggle_responses_loader<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        if self.popup == Some(Popup::Responses) {
            return self.close_popup(g, ViewName::Responses);
        }

        self.responses.load(&self.config_path)?;
        if self.responses.is_empty() {
            return Err(AppError::MissingResponse);
        }

        self.open_popup(g, Popup::Responses, 30, self.responses.len() as i32 + 1)?;
        let lines: String = self
            .responses
            .keys()
            .iter()
            .filter_map(|key| self.responses.get(key).map(|resp| format!("{key} > {}\n", resp.status)))
            .collect();
        if let Some(view) = g.view_mut(ViewName::Responses) {
            view.title = "Responses".to_string();
            view.highlight = true;
            view.write_str(lines.trim_end_matches('\n'));
            view.set_cursor(0, self.responses.index());
        }
        Ok(())
    }

    fn move_responses_cursor<M: ViewManager>(&mut self, g: &mut M, forward: bool) {
        if self.responses.is_empty() {
            return;
        }
        if forward {
            self.responses.next();
        } else {
            self.responses.prev();
        }
        if let Some(view) = g.view_mut(ViewName::Responses) {
            let (x, _) = view.cursor();
            view.set_cursor(x, self.responses.index());
        }
    }

    fn delete_selected_response<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        let Some(key) = self.responses.cur_key().map(str::to_string) else {
            return Ok(());
        };
        self.responses.del(&key);
        self.responses.save(&self.config_path)?;
        tracing::info!(name = %key, "response deleted");

        self.close_popup(g, ViewName::Responses)?;
        // Reopen with the remaining entries; an empty library stays closed.
        match self.toggle_responses_loader(g) {
            Err(AppError::MissingResponse) => Ok(()),
            other => other,
        }
    }

    fn open_save_popup<M: ViewManager>(&mut self, g: &mut M, popup: Popup, title: &str) -> Result<(), AppError> {
        if let Some(open) = self.popup {
            self.close_popup(g, open.view())?;
        }

        let width = 20.max(title.chars().count() as i32 + 3);
        self.open_popup(g, popup, width, 2)?;
        if let Some(view) = g.view_mut(ViewName::Save) {
            view.title = title.to_string();
            view.editable = true;
        }
        g.set_cursor_visible(true);
        Ok(())
    }

    fn save_request_popup<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        if self.shared.requests.is_empty() {
            self.info(g, "No Requests to save");
            return Ok(());
        }
        self.open_save_popup(g, Popup::SaveRequest, "Save Request as...")
    }

    fn confirm_save<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        let value = popup_value(g, ViewName::Save);
        let saved = match self.popup {
            Some(Popup::SaveResponse) => self.save_response_as(g, &value),
            Some(Popup::SaveRequest) => self.save_request_as(g, &value),
            _ => Ok(()),
        };
        if let Err(err) = saved {
            tracing::warn!(error = %err, "save failed");
            self.info(g, err.to_string());
        }
        self.close_popup(g, ViewName::Save)
    }

    /// Validates the panels, stores the result under `name` in the library
    /// and makes it live.
    pub fn save_response_as<M: ViewManager>(&mut self, g: &mut M, name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::Other("Response name can't be empty".to_string()));
        }
        let resp = self.current_response(g)?;

        // Start from what is on disk so entries saved elsewhere survive.
        self.responses.load(&self.config_path)?;
        self.responses.add(name, resp.clone());
        self.responses.save(&self.config_path)?;

        self.shared.replace_response(resp);
        self.has_changed = false;
        tracing::info!(name, "response saved");
        self.info(g, format!("Response applied and saved as '{name}'"));
        Ok(())
    }

    /// Writes the request under the log cursor to `path`.
    pub fn save_request_as<M: ViewManager>(&mut self, g: &mut M, path: &str) -> Result<(), AppError> {
        let Some(snapshot) = self.shared.requests.current() else {
            return Ok(());
        };
        let target = expand_path(path);
        std::fs::write(&target, &snapshot.dump).map_err(|e| AppError::file_access(&target, e))?;
        tracing::info!(path = %target, "request saved");
        self.info(g, format!("Request saved as '{path}'"));
        Ok(())
    }

    fn open_body_file_popup<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        if let Some(open) = self.popup {
            self.close_popup(g, open.view())?;
        }

        self.open_popup(g, Popup::FileDialog, 20, 2)?;
        g.set_cursor_visible(true);
        if let Some(view) = g.view_mut(ViewName::FileDialog) {
            view.title = "Open Body File".to_string();
            view.editable = true;
        }
        Ok(())
    }

    fn confirm_body_file<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        let path = popup_value(g, ViewName::FileDialog);
        if !path.is_empty() {
            let mut resp = (*self.shared.response()).clone();
            match resp.body.set_file(&path) {
                Ok(()) => {
                    tracing::info!(path = %path, "body file opened");
                    self.shared.replace_response(resp);
                    self.render_body(g);
                }
                Err(err) => self.info(g, err.to_string()),
            }
        }
        self.close_popup(g, ViewName::FileDialog)
    }

    /// Flips the live body between typed text and the opened file.
    pub fn next_body_mode<M: ViewManager>(&mut self, g: &mut M) {
        let mut resp = (*self.shared.response()).clone();
        resp.body.mode = resp.body.mode.next();
        self.shared.replace_response(resp);
        self.render_body(g);
    }

    pub fn toggle_response_builder<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        self.hide_response_builder = !self.hide_response_builder;
        if self.hide_response_builder {
            if let Some(focus) = Focus::on(ViewName::Request) {
                self.focus = focus;
            }
            g.set_current_view(ViewName::Request)?;
        }
        Ok(())
    }
}

use ratatui::style::Color;

use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::focus::ViewName;
use crate::view::{ViewManager, editor::Editor};

use super::split::Split;

// TokyoNight palette
pub const ACCENT_BLUE: Color = Color::Rgb(122, 162, 247); // #7aa2f7
pub const ACCENT_GREEN: Color = Color::Rgb(158, 206, 106); // #9ece6a
pub const ACCENT_ORANGE: Color = Color::Rgb(224, 175, 104); // #e0af68
pub const BORDER_INACTIVE: Color = Color::Rgb(65, 72, 104); // #414868
pub const TEXT_MUTED: Color = Color::Rgb(86, 95, 137); // #565f89
pub const BG: Color = Color::Rgb(26, 27, 38); // #1a1b26

const STATUS_DIGITS: usize = 3;
const DELAY_DIGITS: usize = 9;

impl AppState {
    /// Places every panel for the current terminal size. Runs after each
    /// event; panels are filled from the live response only when first
    /// created.
    pub fn layout<M: ViewManager>(&mut self, g: &mut M) -> Result<(), AppError> {
        let (max_x, max_y) = g.size();

        let mut split_x = if self.hide_response_builder {
            Split::new(max_x).fixed(&[max_x - 1])
        } else {
            Split::new(max_x).relative(&[70])
        };
        let mut split_y = Split::new(max_y).fixed(&[max_y - 2]);

        let (view, created) = g.set_view(ViewName::Request, 0, 0, split_x.next(), split_y.next());
        if created {
            view.title = "Request".to_string();
            view.editable = true;
            view.editor = Editor::Motion;
        }

        self.set_response_view(g, split_x.current(), 0, max_x - 1, split_y.current());

        let (view, created) = g.set_view(ViewName::Info, -1, split_y.current(), max_x - 1, max_y);
        if created {
            view.frame = false;
        }

        if g.current_view().is_none() {
            let start = if self.hide_response_builder { ViewName::Request } else { ViewName::Status };
            g.set_current_view(start)?;
        }
        Ok(())
    }

    fn set_response_view<M: ViewManager>(&self, g: &mut M, x0: i32, y0: i32, x1: i32, y1: i32) {
        if self.hide_response_builder {
            for name in [ViewName::Status, ViewName::Delay, ViewName::Headers, ViewName::Body] {
                g.delete_view(name);
            }
            return;
        }

        let resp = self.shared.response();
        let mut split = Split::new(y1).fixed(&[2, 2]).relative(&[40]);

        let (view, created) = g.set_view(ViewName::Status, x0, y0, x1, split.next());
        if created {
            view.title = "Status".to_string();
            view.editable = true;
            view.editor = Editor::Numeric { max_len: STATUS_DIGITS };
            view.write_str(&resp.status.to_string());
        }

        let (view, created) = g.set_view(ViewName::Delay, x0, split.current(), x1, split.next());
        if created {
            view.title = "Delay (ms) ".to_string();
            view.editable = true;
            view.editor = Editor::Numeric { max_len: DELAY_DIGITS };
            view.write_str(&resp.delay.as_millis().to_string());
        }

        let (view, created) = g.set_view(ViewName::Headers, x0, split.current(), x1, split.next());
        if created {
            view.title = "Headers".to_string();
            view.editable = true;
            view.editor = Editor::Text;
            view.write_str(&resp.headers.to_text());
        }

        let (view, created) = g.set_view(ViewName::Body, x0, split.current(), x1, y1);
        if created {
            view.editable = true;
            view.editor = Editor::Text;
            self.render_body(g);
        }
    }

    /// Redraws the body panel from the live response: the text in input
    /// mode, a file summary in file mode.
    pub fn render_body<M: ViewManager>(&self, g: &mut M) {
        let Some(view) = g.view_mut(ViewName::Body) else {
            return;
        };
        let resp = self.shared.response();
        let body = &resp.body;
        view.title = format!("Body ({})", body.mode);
        view.clear();
        view.write(&body.info());
    }
}

use std::collections::HashMap;

use crate::state::focus::ViewName;
use crate::view::View;

/// Last cursor position per view, kept across focus changes so a click on
/// empty space can put the cursor back where it was.
#[derive(Debug, Clone, Default)]
pub struct Cursors(HashMap<ViewName, (usize, usize)>);

impl Cursors {
    pub fn get(&self, view: ViewName) -> (usize, usize) {
        self.0.get(&view).copied().unwrap_or((0, 0))
    }

    pub fn set(&mut self, view: ViewName, x: usize, y: usize) {
        self.0.insert(view, (x, y));
    }

    /// Puts the saved position back, pulled inside the view's current text.
    pub fn restore(&self, view: &mut View) {
        let (x, y) = self.get(view.name());
        let y = y.min(view.lines().len().saturating_sub(1));
        view.set_cursor(x.min(view.line_len(y)), y);
    }
}

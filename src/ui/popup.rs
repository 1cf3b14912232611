use crate::state::focus::ViewName;
use crate::view::{View, ViewManager};

/// Corners of a `w`×`h` box centred on a `max_x`×`max_y` screen.
pub fn centered_corners(max_x: i32, max_y: i32, w: i32, h: i32) -> (i32, i32, i32, i32) {
    let x = max_x / 2 - w / 2;
    let y = max_y / 2 - h / 2;
    (x, y, x + w, y + h)
}

/// Creates (or re-centres) a popup view on top of everything else.
pub fn create_popup_view<M: ViewManager>(g: &mut M, name: ViewName, w: i32, h: i32) -> &mut View {
    let (max_x, max_y) = g.size();
    let (x0, y0, x1, y1) = centered_corners(max_x, max_y, w, h);
    g.set_view(name, x0, y0, x1, y1).0
}

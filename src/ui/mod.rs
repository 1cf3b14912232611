pub mod actions;
pub mod focus;
pub mod layout;
pub mod popup;
pub mod render;
pub mod split;

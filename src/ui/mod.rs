/// Popup UI
mod commands;
pub mod components;
pub mod popup;

pub mod app;
pub mod autohide;
pub mod control_bar;
pub mod settings;
pub mod theme;
pub mod transport;

#[cfg(test)]
mod app_test;

pub use app::*;

pub mod config_window;
pub mod status;
pub mod viewer;

//! Ratatui front end split across logical submodules: `app` holds the state
//! machine, `forms` the modal input states, `screens` the per-view list
//! state, and `terminal` the raw-mode event loop.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

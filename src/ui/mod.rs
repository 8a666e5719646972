mod app;
mod draw;
mod panes;

pub use app::App;

mod app;
mod bell;
mod clock;
mod config;
mod error;
mod event;
mod models;
mod stats;
mod store;
mod timer;
mod ui;
mod validation;

use std::fs::File;

use app::App;
use simplelog::{Config, LevelFilter, WriteLogger};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging();

    let terminal = ratatui::init();
    let result = App::new()?.run(terminal);
    ratatui::restore();
    result
}

/// Log to a file next to the data; the terminal belongs to the UI
fn init_logging() {
    let Ok(path) = config::get_log_path() else {
        return;
    };
    if let Ok(file) = File::create(&path) {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
    }
}

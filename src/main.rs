mod app;
mod audio;
mod config;
mod logging;
mod media;
mod ui;

use config::PlayerConfig;

fn main() -> iced::Result {
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    app::run(PlayerConfig::default())
}

mod app;
mod config;
mod error;
mod files;
mod input;
mod launcher;
mod logging;
mod modal;
mod panes;
mod render;
mod state;
mod text_buffer;
mod theme;
mod util;
mod viewport;

use app::App;
use config::Config;
use error::AppError;
use files::LocalFs;
use input::CrosstermEvents;
use launcher::SystemLauncher;
use state::DataPaths;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::from_env();

    // Fatal errors end the session with a one-line reason, not a report
    if let Err(err) = run(config) {
        log::error!("{}", err);
        eprintln!("{}", err);
    }
    Ok(())
}

fn run(config: Config) -> Result<(), AppError> {
    let paths = DataPaths::init()?;
    // Without a log file the session simply runs unlogged
    logging::init(&paths.log_file(), config.log_level);
    if config.restore_last {
        log::info!("-l given; session restore is not available, starting fresh");
    }

    let mut app = App::new(config, Box::new(LocalFs), Box::new(SystemLauncher::default()))?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal, &mut CrosstermEvents);
    ratatui::restore();
    result
}

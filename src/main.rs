use std::io;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use ticklist::app::{self, App};
use ticklist::logging;
use ticklist::storage::{default_data_dir, Storage};
use ticklist::store::TaskStore;

fn main() -> io::Result<()> {
    let data_dir = default_data_dir();
    // The app still works without a log file.
    if let Err(err) = logging::init_logging(&data_dir) {
        eprintln!("logging unavailable: {err}");
    }

    let storage = Storage::new(data_dir);
    if let Err(err) = storage.ensure_dirs() {
        log::error!("cannot prepare data directory: {err}");
        return Err(io::Error::other(err));
    }
    let mut app = App::new(TaskStore::open(storage));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = app::run(&mut terminal, &mut app);

    // Restore the terminal even when the loop errored.
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

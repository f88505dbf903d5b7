use anyhow::Result;

use invoice_chat::Config;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

/// Tracing goes to a file: the terminal belongs to the TUI. `RUST_LOG`
/// overrides the default filter.
fn init_tracing() -> Result<()> {
    let log_path = Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_chat=info".into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::load_or_init().unwrap_or_else(|err| {
        tracing::warn!("Could not load config, using defaults: {:#}", err);
        Config::default()
    });

    let mut app = App::new(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Apply any network round trip that resolved since the last pass;
        // tick events keep this running while the user is idle
        app.poll_requests().await;

        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }

    Ok(())
}

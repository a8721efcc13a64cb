//! Terminal UI for abholi: register users, toggle collectors online and match
//! pickup requests to the nearest available collector.

mod app;
mod config;
mod input;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use abholi_core::{
    model::{RequestId, UserId},
    service::AbholiService,
};
use abholi_geocoder_nominatim::NominatimGeocoder;
use abholi_store_sqlite::SqliteRecordStore;

use crate::app::{App, IdPrompt, describe_completion, describe_dispatch, describe_toggle};
use crate::config::AppConfig;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_logging(&config)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.http_timeout)
        .build()?;
    let geocoder = NominatimGeocoder::new(client, config.geocoder_url.as_str());
    let store = SqliteRecordStore::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let service = AbholiService::new(Arc::new(store.clone()), Arc::new(geocoder));

    info!(database = %config.database_url, "abholi started");

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, App::new(), &service).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    store.close().await;
    info!("abholi stopped");

    res
}

/// Send tracing output to the log file; the terminal belongs to the UI.
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file {}", config.log_file.display()))?;

    let env_filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    service: &AbholiService,
) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::LoadUsers => load_users(&mut app, service).await,
                Action::LoadRequests => load_requests(&mut app, service).await,
                Action::Register => {
                    app.is_loading = true;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = service.register_user(app.form.to_registration()).await;

                    app.is_loading = false;
                    match res {
                        Ok(user) => {
                            app.set_success(format!(
                                "User registered successfully! ID: {}",
                                user.id
                            ));
                            app.back_to_menu();
                        }
                        Err(err) => {
                            error!(error = %err, "registration failed");
                            app.report(&err);
                        }
                    }
                }
                Action::SubmitId(prompt) => {
                    let id = match app.parsed_id(prompt) {
                        Ok(id) => id,
                        Err(message) => {
                            app.set_error(message);
                            continue;
                        }
                    };

                    app.is_loading = true;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    submit_id(&mut app, service, prompt, id).await;

                    app.is_loading = false;
                    app.id_input.clear();
                    if prompt.wants_request_id() {
                        load_requests(&mut app, service).await;
                    } else {
                        load_users(&mut app, service).await;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn submit_id(app: &mut App, service: &AbholiService, prompt: IdPrompt, id: i64) {
    let outcome = match prompt {
        IdPrompt::ToggleStatus => service
            .toggle_online_status(UserId(id))
            .await
            .map(|user| describe_toggle(&user)),
        IdPrompt::CreateRequest => service
            .create_request(UserId(id))
            .await
            .map(|dispatch| describe_dispatch(&dispatch)),
        IdPrompt::CompleteRequest => service
            .complete_request(RequestId(id))
            .await
            .map(|request| describe_completion(&request)),
        IdPrompt::CompleteNextForCollector => service
            .complete_next_for_collector(UserId(id))
            .await
            .map(|request| describe_completion(&request)),
    };

    match outcome {
        Ok(message) => app.set_success(message),
        Err(err) => app.report(&err),
    }
}

async fn load_users(app: &mut App, service: &AbholiService) {
    match service.users().await {
        Ok(users) => app.users = users,
        Err(err) => {
            app.users.clear();
            app.set_error(format!("Failed to load users: {err}"));
        }
    }
}

async fn load_requests(app: &mut App, service: &AbholiService) {
    match service.requests().await {
        Ok(requests) => app.requests = requests,
        Err(err) => {
            app.requests.clear();
            app.set_error(format!("Failed to load pickup requests: {err}"));
        }
    }
}

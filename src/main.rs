mod app;
mod bindings;
mod cli;
mod error;
mod event;
mod http;
mod logging;
mod state;
mod storage;
mod terminal;
mod ui;
mod view;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::event::{Event, RenderQueue, RenderTask};
use crate::http::server::{Cors, router};
use crate::state::app_state::AppState;
use crate::state::shared::Shared;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init(args.log_path().as_deref());

    let response = args.initial_response()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let queue = RenderQueue::new(tx.clone());
    let shared = Arc::new(Shared::new(response, queue.clone()));

    // Bind before taking over the terminal so the error stays readable.
    let listener = http::server::bind(args.port)
        .await
        .with_context(|| format!("can't listen on :{}", args.port))?;
    let cors = args.cors.then_some(Cors { display_preflight: args.cors_display });
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(http::server::serve(
        listener,
        router(shared.clone(), cors),
        shutdown.clone(),
        queue.clone(),
    ));

    // Background thread: read crossterm events and feed into channel
    let event_tx = tx;
    std::thread::spawn(move || loop {
        let event = if crossterm::event::poll(Duration::from_millis(250)).unwrap_or(false) {
            match crossterm::event::read() {
                Ok(crossterm::event::Event::Key(key)) => Event::Key(key),
                Ok(crossterm::event::Event::Mouse(mouse)) => Event::Mouse(mouse),
                Ok(crossterm::event::Event::Resize(w, h)) => Event::Resize(w, h),
                _ => continue,
            }
        } else {
            Event::Tick
        };
        if event_tx.send(event).is_err() {
            break;
        }
    });

    terminal::install_panic_hook();
    let mut terminal = terminal::init()?;
    let size = terminal.size()?;
    let state = AppState::new(shared, args.config_path(), args.auto_update);

    let result = match App::new(state, size.width, size.height) {
        Ok(mut app) => {
            queue.submit(RenderTask::Info(format!("Listening on :{}", args.port)));
            tracing::info!(port = args.port, config = %args.config_path().display(), "httplab started");
            let result = run_loop(&mut terminal, &mut app, &mut rx).await;
            match app.state.failure.take() {
                Some(failure) => result.and(Err(anyhow::anyhow!(failure))),
                None => result,
            }
        }
        Err(err) => Err(err.into()),
    };

    terminal::restore()?;
    shutdown.cancel();
    let _ = server.await;
    tracing::info!("httplab stopped");
    result
}

async fn run_loop(
    terminal: &mut terminal::Tui,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render::render(frame, &app.screen))?;

        match rx.recv().await {
            Some(event) => app.handle_event(event),
            None => break,
        }

        if app.state.should_quit {
            break;
        }
    }
    Ok(())
}

//! src/main.rs
//! Cloud file manager TUI: browse, filter, select, download and upload
//! objects in a bucket.

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::{
    signal,
    sync::{Notify, mpsc},
};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use cloudfm_core::{
    Logger,
    auth::session::{AuthProvider, AuthUser, SessionAuth},
    config::Config,
    controller::{
        event_loop::{EventLoop, TaskResult, map_terminal_event},
        file_manager::FileManager,
    },
    storage::{gateway::StorageGateway, local_bucket::LocalBucket, memory_bucket::MemoryBucket},
    view::{theme, ui::UIRenderer},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

const TICK_RATE: Duration = Duration::from_millis(120);

const USAGE: &str = "Usage: cloudfm [--demo] [--bucket <dir>] [--user <name>]

  --demo           browse an in-memory bucket seeded with sample files
  --bucket <dir>   directory backing the bucket (overrides the config)
  --user <name>    start signed in as <name>
  -h, --help       print this help";

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    demo: bool,
    bucket: Option<PathBuf>,
    user: Option<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--demo" => parsed.demo = true,
                "--bucket" => {
                    let dir = args.next().context("--bucket needs a directory")?;
                    parsed.bucket = Some(PathBuf::from(dir));
                }
                "--user" => {
                    let name = args.next().context("--user needs a name")?;
                    parsed.user = Some(name);
                }
                "-h" | "--help" => return Ok(None),
                other => bail!("Unknown argument: {other}\n\n{USAGE}"),
            }
        }

        Ok(Some(parsed))
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    setup_panic_handler();

    let app = App::new(args)
        .await
        .context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    manager: FileManager,
    ui_renderer: UIRenderer,
    shutdown: Arc<Notify>,
    _log_guard: WorkerGuard,
}

impl App {
    async fn new(args: Args) -> Result<Self> {
        let mut config: Config = Config::load().await.unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {e}");
            Config::default()
        });

        let log_guard = Logger::init(&config.logging).context("Failed to initialize logging")?;
        info!(demo = args.demo, "Starting cloud file manager");

        if let Some(bucket) = args.bucket {
            config.storage.bucket_root = bucket;
        }
        if let Some(user) = args.user {
            config.auth.user = Some(user);
        }

        let gateway: Arc<dyn StorageGateway> = if args.demo {
            info!(prefix = %config.storage.prefix, "Using in-memory demo bucket");
            Arc::new(MemoryBucket::demo(&config.storage.prefix))
        } else {
            info!(root = %config.storage.bucket_root.display(), "Using local bucket");
            Arc::new(LocalBucket::new(
                config.storage.bucket_root.clone(),
                config.storage.url_ttl,
            ))
        };

        let auth = Arc::new(SessionAuth::new(
            config.auth.user.as_deref().map(AuthUser::new),
        ));

        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();

        let event_loop = EventLoop::new(task_rx, auth.subscribe(), TICK_RATE);
        let manager = FileManager::new(&config, gateway, auth, task_tx);

        theme::init_theme();
        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        info!("Application initialized successfully");

        Ok(Self {
            terminal,
            event_loop,
            manager,
            ui_renderer: UIRenderer::new(),
            shutdown: Arc::new(Notify::new()),
            _log_guard: log_guard,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        info!("Starting event loop");

        let mut event_stream: EventStream = EventStream::new();

        loop {
            self.render()?;

            tokio::select! {
                () = self.shutdown.notified() => {
                    info!("Shutdown signal received");
                    break;
                }

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(terminal_event)) => {
                        let action = map_terminal_event(&terminal_event, self.manager.state());
                        if let Some(action) = action
                            && !self.manager.handle(action).await
                        {
                            break;
                        }
                    }
                    Some(Err(e)) => warn!("Terminal event error: {}", e),
                    None => {
                        info!("Terminal event stream closed");
                        break;
                    }
                },

                action = self.event_loop.next_action() => {
                    if !self.manager.handle(action).await {
                        break;
                    }
                }
            }
        }

        self.event_loop.shutdown();

        let stats = self.ui_renderer.stats();
        info!(
            frames = stats.frames,
            slow_frames = stats.slow,
            fps = stats.fps(),
            "Event loop terminated cleanly"
        );
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if !self.manager.needs_redraw() {
            return Ok(());
        }

        let start: Instant = Instant::now();
        let (renderer, manager) = (&mut self.ui_renderer, &self.manager);

        self.terminal
            .draw(|frame: &mut Frame<'_>| {
                renderer.render(frame, manager.state());
            })
            .context("Failed to draw terminal")?;

        self.manager.clear_redraw();

        let duration = start.elapsed();
        if duration.as_millis() > 16 {
            debug!("Slow render: {}ms (target: <16ms)", duration.as_millis());
        }

        Ok(())
    }

    fn setup_shutdown_handler(&self) {
        let shutdown: Arc<Notify> = self.shutdown.clone();

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let (mut sigterm, mut sigint) =
                    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                        (Ok(term), Ok(int)) => (term, int),
                        (Err(e), _) | (_, Err(e)) => {
                            warn!("Failed to install signal handlers: {}", e);
                            return;
                        }
                    };

                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                    _ = signal::ctrl_c() => info!("Received Ctrl+C"),
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
            }

            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableBracketedPaste, LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}

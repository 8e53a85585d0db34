//! Mouse Tracker: precision cursor sampling from the command line or a
//! global hotkey.

mod app;
mod app_command;
mod cli;
mod commands;
mod config;
mod error;
mod hotkey_handler;
mod logging;
mod persistence;
mod recording_state;
mod recording_worker;

pub(crate) use {
    app::{App, OutputSequence},
    app_command::{AppCommand, UiCommand},
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    persistence::PersistenceWorker,
    recording_state::RecordingState,
    recording_worker::{RecordingWorker, SessionEvent},
};

use crate::{
    cli::{Cli, Command, RecordArgs},
    config::{Config, HotkeyPreset},
    persistence::DEFAULT_QUEUE_CAPACITY,
};

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use global_hotkey::GlobalHotKeyManager;
use mouse_tracker_core::SamplingEngine;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::error;

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Record(args) => run_recorder(args),
        Command::Points(args) => {
            let _log_guard = init_logging_or_exit(None);
            commands::finish(commands::points(&args))
        }
        Command::Trajectory(args) => {
            let _log_guard = init_logging_or_exit(None);
            commands::finish(commands::trajectory(&args))
        }
        Command::Inspect(args) => {
            let _log_guard = init_logging_or_exit(None);
            commands::finish(commands::inspect(&args))
        }
    }
}

fn init_logging_or_exit(
    file: Option<&std::path::Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    match logging::init(file) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(i32::from(commands::EXIT_CAPTURE_FAILED));
        }
    }
}

/// Hotkey-driven recorder. Never returns; the event loop owns the process.
fn run_recorder(args: RecordArgs) -> ! {
    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            let _ = init_logging_or_exit(None);
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let log_guard = init_logging_or_exit(config.logging.file.as_deref());

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    // Persists across event loop iterations; dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut config = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(UiCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some(config) = config.take() else {
                    return;
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Registered on the main thread: tao's event loop pumps the
                // Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_id) =
                    match HotkeyHandler::register_hotkey(config.hotkey.preset) {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!(
                                preset = %config.hotkey.preset,
                                available = ?HotkeyPreset::ALL.map(HotkeyPreset::label),
                                "Failed to register hotkey: {:?}",
                                e
                            );
                            std::process::exit(1);
                        }
                    };
                hotkey_manager = Some(manager);

                let ui_proxy = ui_proxy.clone();

                // Async runtime on its own thread; the hotkey manager stays here.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let (command_tx, command_rx) = mpsc::channel(32);
                        let (session_tx, session_rx) = mpsc::channel(32);
                        let (shutdown_tx, shutdown_rx) = watch::channel(false);
                        let state = Arc::new(Mutex::new(RecordingState::Idle));

                        let worker = match RecordingWorker::spawn(SamplingEngine::system, session_tx)
                        {
                            Ok(worker) => worker,
                            Err(e) => {
                                error!("Failed to start recording worker: {:?}", e);
                                std::process::exit(1);
                            }
                        };

                        let hotkey_handler = HotkeyHandler::new(
                            hotkey_id,
                            config.recording.mode,
                            Arc::clone(&state),
                            command_tx,
                        );

                        let app = App {
                            config,
                            state,
                            worker,
                            persistence: PersistenceWorker::spawn(DEFAULT_QUEUE_CAPACITY),
                            ui_proxy,
                            command_rx,
                            session_rx,
                            shutdown_tx,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep the hotkey manager and log writer alive for the app's lifetime.
        let _ = (&hotkey_manager, &log_guard);
    });
}

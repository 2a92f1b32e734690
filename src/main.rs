//! Terminal Tetris runner (default binary).
//!
//! The engine and the remote pad server run on a tokio runtime; this thread
//! owns the terminal. It polls crossterm for keys, forwards commands to the
//! engine handle and redraws the latest snapshot.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use gift_tetris::adapter::{run_server, PadStatus, ServerConfig};
use gift_tetris::engine::{Engine, EngineConfig, EngineError, EngineHandle};
use gift_tetris::input::{handle_key_event, should_quit, NameEntry, NameInput};
use gift_tetris::term::{
    FrameBuffer, GameView, Hud, PadStatusView, PromptView, TerminalRenderer, Viewport,
};
use gift_tetris::types::Phase;

const FRAME: Duration = Duration::from_millis(16);

/// Pad server as seen from the UI.
struct PadInfo {
    port: u16,
    status: PadStatus,
}

fn main() -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let mut config = EngineConfig::from_env();
    if let Some(name) = std::env::args().nth(1) {
        let name = name.trim();
        if !name.is_empty() {
            config.player = Some(name.to_string());
        }
    }

    let engine = {
        let _guard = rt.enter();
        Engine::spawn(config.clone(), config.generator())
    };

    let pad = if ServerConfig::is_disabled() {
        None
    } else {
        let server_config = ServerConfig {
            // Connection chatter would draw over the game screen.
            log_connections: !std::io::stderr().is_terminal(),
            ..ServerConfig::from_env()
        };
        let port = server_config.port;
        let status = PadStatus::default();
        let server_engine = engine.clone();
        let server_status = status.clone();
        rt.spawn(async move {
            if let Err(e) = run_server(server_config, server_engine, server_status, None).await {
                eprintln!("[Pad] server stopped: {:#}", e);
            }
        });
        Some(PadInfo { port, status })
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &rt, &engine, config.player.as_deref(), pad.as_ref());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(
    term: &mut TerminalRenderer,
    rt: &tokio::runtime::Runtime,
    engine: &EngineHandle,
    player: Option<&str>,
    pad: Option<&PadInfo>,
) -> Result<()> {
    let view = GameView::default();
    let mut name_entry = player.map(NameEntry::with_name).unwrap_or_default();
    let mut snapshots = engine.watch();
    let mut last_phase = Phase::Idle;
    let mut fb = FrameBuffer::new(0, 0);

    loop {
        let snap = snapshots.borrow_and_update().clone();

        // Back to the prompt after a reset: pre-fill the last name.
        if snap.phase == Phase::Idle && last_phase != Phase::Idle {
            name_entry = NameEntry::with_name(&snap.player);
        }
        last_phase = snap.phase;

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let hud = Hud {
            prompt: PromptView {
                name: name_entry.text(),
                notice: name_entry.notice(),
            },
            pad: pad.map(|p| PadStatusView {
                port: p.port,
                clients: p.status.clients().min(u16::MAX as usize) as u16,
            }),
        };
        view.render_into(&snap, &hud, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        if !event::poll(FRAME)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if snap.phase == Phase::Idle {
                    if !on_prompt_key(rt, engine, &mut name_entry, key)? {
                        return Ok(());
                    }
                    continue;
                }

                if should_quit(key) {
                    return Ok(());
                }
                if let Some(command) = handle_key_event(key) {
                    match engine.try_send(command) {
                        // Dropped keypresses are fine under load.
                        Ok(()) | Err(EngineError::Backpressure) => {}
                        Err(EngineError::Closed) => bail!("engine stopped"),
                    }
                }
            }
            Event::Resize(_, _) => term.invalidate(),
            _ => {}
        }
    }
}

/// Feed one key to the name prompt. Returns `false` to quit.
fn on_prompt_key(
    rt: &tokio::runtime::Runtime,
    engine: &EngineHandle,
    name_entry: &mut NameEntry,
    key: KeyEvent,
) -> Result<bool> {
    match name_entry.handle_key(key) {
        NameInput::Submit(command) => match rt.block_on(engine.request(command)) {
            Ok(_) => Ok(true),
            Err(e) => bail!("engine stopped: {}", e.message()),
        },
        NameInput::Edited => Ok(true),
        NameInput::Unhandled => Ok(!should_quit(key)),
    }
}

//! Battle reveal - terminal host for the battle presentation sequencer

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use battle_reveal::accessibility::{wait_for_change, MotionPreference, SharedMotionPreference};
use battle_reveal::action::Action;
use battle_reveal::completion::{CompletionSlot, CompletionStatus};
use battle_reveal::components::{
    Component, HostScreen, HostScreenProps, RevealOverlay, RevealOverlayProps,
};
use battle_reveal::effect::Effect;
use battle_reveal::error::Error;
use battle_reveal::outcome::{load_outcomes, sample_outcomes, BattleMode};
use battle_reveal::reducer::reducer;
use battle_reveal::state::AppState;
use battle_reveal::telemetry::{self, JsonLinesSink, TelemetrySink, TracingSink};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Flex, Layout, Rect},
    Frame, Terminal,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventKind, EventOutcome,
    RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

const BEAT_TASK: &str = "beat";
const MOTION_TASK: &str = "reduce_motion";

const MODAL_WIDTH: u16 = 64;
const MODAL_HEIGHT: u16 = 20;

/// Battle reveal - plays a battle outcome as a timed presentation
#[derive(Parser, Debug)]
#[command(name = "battle-reveal")]
#[command(about = "Deterministic battle presentation sequencer")]
struct Args {
    /// JSON file with one outcome or an array of outcomes
    #[arg(long)]
    outcomes: Option<PathBuf>,

    /// Screen the battles are presented from
    #[arg(long, value_enum, default_value_t = BattleMode::Campaign)]
    mode: BattleMode,

    /// Start with the device reduce-motion flag on
    #[arg(long)]
    reduce_motion: bool,

    /// Append telemetry as JSON lines instead of logging it
    #[arg(long)]
    telemetry_file: Option<PathBuf>,

    /// Directory for the session log
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        outcomes,
        mode,
        reduce_motion,
        telemetry_file,
        log_dir,
        debug: debug_args,
    } = Args::parse();

    let _log_guard = setup_logging(log_dir.as_deref())?;

    let debug = DebugSession::new(debug_args);
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let outcomes = match outcomes {
        Some(path) => load_outcomes(&path).map_err(io::Error::other)?,
        None => sample_outcomes(),
    };
    let motion = Arc::new(SharedMotionPreference::new(reduce_motion));
    let sink = build_sink(telemetry_file.as_deref()).map_err(io::Error::other)?;

    let initial_motion = motion.reduce_motion();
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(outcomes, mode, initial_motion))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let effects = EffectRunner::new(sink, motion);
    let result = run_app(&mut terminal, &debug, store, replay_actions, effects).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

fn build_sink(path: Option<&Path>) -> Result<Arc<dyn TelemetrySink>, Error> {
    let sink: Arc<dyn TelemetrySink> = match path {
        Some(path) => Arc::new(JsonLinesSink::open(path)?),
        None => Arc::new(TracingSink),
    };
    Ok(sink)
}

/// File-only logging; the terminal belongs to the UI.
fn setup_logging(log_dir: Option<&Path>) -> io::Result<WorkerGuard> {
    let log_dir = log_dir.map(Path::to_path_buf).unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "battle-reveal.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/battle-reveal.log", log_dir.display());
    Ok(guard)
}

fn default_log_dir() -> PathBuf {
    let base = dirs_next::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("battle-reveal").join("logs")
}

struct RevealUi {
    host: HostScreen,
    overlay: RevealOverlay,
}

impl RevealUi {
    fn new() -> Self {
        Self {
            host: HostScreen,
            overlay: RevealOverlay,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState, ctx: RenderContext) {
        let props = HostScreenProps {
            state,
            is_focused: ctx.is_focused() && !state.is_presenting(),
        };
        self.host.render(frame, area, props);

        if state.visible {
            let props = RevealOverlayProps {
                visible: state.visible,
                presentation: state.presentation.as_ref(),
                is_focused: ctx.is_focused(),
            };
            self.overlay.render(frame, modal_area(area), props);
        }
    }

    fn handle_event(&mut self, event: &EventKind, state: &AppState) -> EventOutcome<Action> {
        let action = if state.is_presenting() {
            let props = RevealOverlayProps {
                visible: state.visible,
                presentation: state.presentation.as_ref(),
                is_focused: true,
            };
            self.overlay.handle_event(event, props).into_iter().next()
        } else {
            let props = HostScreenProps {
                state,
                is_focused: true,
            };
            self.host.handle_event(event, props).into_iter().next()
        };
        EventOutcome::from(action)
    }
}

fn modal_area(area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(MODAL_HEIGHT.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [modal] = Layout::horizontal([Constraint::Length(MODAL_WIDTH.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    modal
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
    effects: EffectRunner,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(RevealUi::new()));
    let ui_render = Rc::clone(&ui);
    let ui_events = Rc::clone(&ui);

    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |_runtime| {},
            move |frame, area, state, render_ctx: RenderContext| {
                ui_render.borrow_mut().render(frame, area, state, render_ctx);
            },
            move |event, state| -> EventOutcome<Action> {
                ui_events.borrow_mut().handle_event(event, state)
            },
            |action| matches!(action, Action::Quit),
            move |effect: Effect, ctx: &mut EffectContext<Action>| effects.handle(effect, ctx),
        )
        .await
}

/// Owns the collaborators the reducer talks to through effects.
struct EffectRunner {
    telemetry: Arc<dyn TelemetrySink>,
    motion: Arc<SharedMotionPreference>,
    completions: RefCell<CompletionSlot>,
}

impl EffectRunner {
    fn new(telemetry: Arc<dyn TelemetrySink>, motion: Arc<SharedMotionPreference>) -> Self {
        Self {
            telemetry,
            motion,
            completions: RefCell::new(CompletionSlot::new()),
        }
    }

    fn handle(&self, effect: Effect, ctx: &mut EffectContext<Action>) {
        match effect {
            Effect::ScheduleBeat {
                generation,
                delay_ms,
            } => {
                ctx.tasks().spawn(TaskKey::new(BEAT_TASK), async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Action::BeatElapsed(generation)
                });
            }
            Effect::CancelBeat => {
                ctx.tasks().cancel(&TaskKey::new(BEAT_TASK));
            }
            Effect::OpenCompletion { generation } => {
                let receiver = self.completions.borrow_mut().open(generation);
                let key = format!("completion_{generation}");
                ctx.tasks().spawn(TaskKey::new(key), async move {
                    match receiver.await {
                        CompletionStatus::Completed(report) => Action::HostDidComplete(report),
                        CompletionStatus::Abandoned { generation } => {
                            Action::HostDidAbandon(generation)
                        }
                    }
                });
            }
            Effect::AbandonCompletion => self.completions.borrow_mut().abandon(),
            Effect::Complete(report) => {
                let generation = report.generation;
                if !self.completions.borrow_mut().complete(report) {
                    tracing::warn!(generation, "completion had no pending receiver");
                }
            }
            Effect::Track(event) => telemetry::track(self.telemetry.as_ref(), &event),
            Effect::WatchReduceMotion { known } => {
                let receiver = self.motion.subscribe();
                ctx.tasks().spawn(TaskKey::new(MOTION_TASK), async move {
                    match wait_for_change(receiver, known).await {
                        Some(reduce_motion) => Action::ReduceMotionChanged(reduce_motion),
                        None => Action::ReduceMotionLost,
                    }
                });
            }
            Effect::SetDeviceReduceMotion(reduce_motion) => self.motion.set(reduce_motion),
        }
    }
}

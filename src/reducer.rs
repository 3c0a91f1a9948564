//! Reducer - pure function: (state, action) -> DispatchResult
//!
//! The presentation is a forward-only state machine
//! `Intro -> Moments -> Climax -> Result`. Every deferred beat carries the
//! generation it was scheduled under; activation, hide and skip bump the
//! generation so a beat that fires late is dropped here.

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::completion::CompletionReport;
use crate::damage::DamageTag;
use crate::effect::Effect;
use crate::moments::KeyMoment;
use crate::outcome::{BattleMode, BattleOutcome};
use crate::state::{AppState, Phase, Presentation};
use crate::telemetry::TelemetryEvent;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Host actions =====
        Action::HostSelectNext => {
            if state.is_presenting() || state.outcomes.is_empty() {
                return DispatchResult::unchanged();
            }
            state.selected = (state.selected + 1) % state.outcomes.len();
            DispatchResult::changed()
        }

        Action::HostSelectPrev => {
            if state.is_presenting() || state.outcomes.is_empty() {
                return DispatchResult::unchanged();
            }
            let len = state.outcomes.len();
            state.selected = (state.selected + len - 1) % len;
            DispatchResult::changed()
        }

        Action::HostPresentSelected => {
            let Some(outcome) = state.selected_outcome().cloned() else {
                return DispatchResult::unchanged();
            };
            let mode = state.mode;
            show(state, Some(outcome), mode)
        }

        Action::HostToggleReduceMotion => {
            // State follows later through ReduceMotionChanged.
            let mut result = DispatchResult::unchanged();
            result
                .effects
                .push(Effect::SetDeviceReduceMotion(!state.device_reduce_motion));
            result
        }

        Action::HostDidComplete(report) => {
            let live = state
                .presentation
                .as_ref()
                .is_some_and(|p| p.activation == report.generation);
            if !live {
                tracing::debug!(
                    generation = report.generation,
                    "ignoring completion from a replaced presentation"
                );
                return DispatchResult::unchanged();
            }
            state.completed_count = state.completed_count.saturating_add(1);
            state.status = Some(format!(
                "Back to {} after {}{}",
                report.mode.label(),
                if report.victory { "victory" } else { "defeat" },
                if report.skipped { " (skipped)" } else { "" },
            ));
            state.last_report = Some(report);
            hide(state)
        }

        Action::HostDidAbandon(generation) => {
            tracing::debug!(generation, "presentation abandoned before completion");
            DispatchResult::unchanged()
        }

        // ===== Presentation actions =====
        Action::PresentationShow { outcome, mode } => show(state, outcome, mode),

        Action::PresentationHide => hide(state),

        Action::PresentationSkip => skip(state),

        Action::PresentationContinue => continue_from_result(state),

        Action::BeatElapsed(generation) => beat_elapsed(state, generation),

        // ===== Accessibility =====
        Action::ReduceMotionChanged(reduce_motion) => {
            state.device_reduce_motion = reduce_motion;
            // Only future activations read the flag; the running presentation keeps its snapshot.
            DispatchResult::changed_with(Effect::WatchReduceMotion {
                known: reduce_motion,
            })
        }

        Action::ReduceMotionLost => {
            tracing::warn!("reduce-motion source closed; keeping last known value");
            DispatchResult::unchanged()
        }

        // ===== Global actions =====
        Action::Init => DispatchResult::changed_with(Effect::WatchReduceMotion {
            known: state.device_reduce_motion,
        }),

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn show(
    state: &mut AppState,
    outcome: Option<BattleOutcome>,
    mode: BattleMode,
) -> DispatchResult<Effect> {
    state.visible = true;
    state.generation = state.generation.wrapping_add(1);
    let generation = state.generation;

    let Some(outcome) = outcome else {
        tracing::warn!(generation, "presentation shown without an outcome");
        state.presentation = None;
        return DispatchResult::changed_with_many(vec![
            Effect::CancelBeat,
            Effect::AbandonCompletion,
        ]);
    };

    let presentation = Presentation::new(generation, outcome, mode, state.device_reduce_motion);
    tracing::info!(
        generation,
        mode = mode.label(),
        victory = presentation.outcome.victory,
        moments = presentation.moments.len(),
        reduce_motion = presentation.reduce_motion,
        "presentation activated"
    );

    let effects = vec![
        Effect::CancelBeat,
        Effect::OpenCompletion { generation },
        Effect::Track(TelemetryEvent::PresentationViewed {
            mode,
            generation,
            victory: presentation.outcome.victory,
            power_ratio: presentation.outcome.power_ratio(),
            reduce_motion: presentation.reduce_motion,
        }),
        Effect::ScheduleBeat {
            generation,
            delay_ms: presentation.intro_ms(),
        },
    ];
    state.presentation = Some(presentation);
    state.status = None;
    DispatchResult::changed_with_many(effects)
}

fn hide(state: &mut AppState) -> DispatchResult<Effect> {
    if !state.visible && state.presentation.is_none() {
        return DispatchResult::unchanged();
    }
    state.visible = false;
    state.presentation = None;
    state.generation = state.generation.wrapping_add(1);
    DispatchResult::changed_with_many(vec![Effect::CancelBeat, Effect::AbandonCompletion])
}

fn skip(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(presentation) = state.presentation.as_mut() else {
        return DispatchResult::unchanged();
    };
    if !presentation.can_skip() {
        return DispatchResult::unchanged();
    }

    // Invalidate the pending beat before touching the phase.
    state.generation = state.generation.wrapping_add(1);

    let skipped = TelemetryEvent::PresentationSkipped {
        mode: presentation.mode,
        generation: presentation.activation,
        phase: presentation.phase,
        moment_index: presentation.moment_index,
    };
    presentation.skipped = true;
    presentation.phase = Phase::Result;
    tracing::debug!(activation = presentation.activation, "presentation skipped");

    DispatchResult::changed_with_many(vec![
        Effect::CancelBeat,
        Effect::Track(skipped),
        Effect::Track(result_shown(presentation)),
    ])
}

fn continue_from_result(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(presentation) = state.presentation.as_mut() else {
        return DispatchResult::unchanged();
    };
    if presentation.phase != Phase::Result || presentation.completed {
        return DispatchResult::unchanged();
    }

    presentation.completed = true;
    let report = CompletionReport {
        generation: presentation.activation,
        mode: presentation.mode,
        victory: presentation.outcome.victory,
        skipped: presentation.skipped,
    };
    DispatchResult::changed_with_many(vec![
        Effect::Track(TelemetryEvent::PresentationCompleted {
            mode: presentation.mode,
            generation: presentation.activation,
            skipped: presentation.skipped,
        }),
        Effect::Complete(report),
    ])
}

fn beat_elapsed(state: &mut AppState, generation: u64) -> DispatchResult<Effect> {
    if generation != state.generation {
        tracing::trace!(
            generation,
            current = state.generation,
            "dropping stale beat"
        );
        return DispatchResult::unchanged();
    }
    let Some(presentation) = state.presentation.as_mut() else {
        return DispatchResult::unchanged();
    };

    match presentation.phase {
        Phase::Intro => {
            presentation.phase = Phase::Moments;
            presentation.moment_index = 0;
            enter_moment(presentation, generation)
        }
        Phase::Moments if presentation.is_last_moment() => {
            presentation.phase = Phase::Climax;
            DispatchResult::changed_with_many(vec![
                Effect::Track(TelemetryEvent::MomentsShown {
                    mode: presentation.mode,
                    generation,
                    moments: presentation.moments.clone(),
                    clutch: presentation.has_clutch(),
                }),
                Effect::ScheduleBeat {
                    generation,
                    delay_ms: presentation.climax_ms(),
                },
            ])
        }
        Phase::Moments => {
            presentation.moment_index += 1;
            enter_moment(presentation, generation)
        }
        Phase::Climax => {
            presentation.phase = Phase::Result;
            DispatchResult::changed_with(Effect::Track(result_shown(presentation)))
        }
        Phase::Result => DispatchResult::unchanged(),
    }
}

fn enter_moment(presentation: &Presentation, generation: u64) -> DispatchResult<Effect> {
    let moment = presentation.current_moment();
    let mut effects = Vec::with_capacity(2);
    if moment == KeyMoment::Damage {
        let events = &presentation.damage_events;
        effects.push(Effect::Track(TelemetryEvent::DamageBatchShown {
            mode: presentation.mode,
            generation,
            count: events.len(),
            total: events.iter().map(|e| e.value).sum(),
            special_tags: events
                .iter()
                .filter(|e| e.tag != DamageTag::Normal)
                .count(),
            shown: presentation.shown_damage().map(|e| e.tag),
        }));
    }
    effects.push(Effect::ScheduleBeat {
        generation,
        delay_ms: moment.hold_ms(presentation.reduce_motion),
    });
    DispatchResult::changed_with_many(effects)
}

fn result_shown(presentation: &Presentation) -> TelemetryEvent {
    TelemetryEvent::ResultShown {
        mode: presentation.mode,
        generation: presentation.activation,
        victory: presentation.outcome.victory,
        stars: presentation.outcome.star_count(),
        first_clear: presentation.outcome.first_clear,
        skipped: presentation.skipped,
    }
}

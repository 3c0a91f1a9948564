//! Sequencer flows driven through EffectStoreTestHarness
//!
//! Beats are fired the way the runtime fires them: by reading the
//! generation out of the emitted `ScheduleBeat` effect.

use battle_reveal::{
    action::Action,
    components::{Component, RevealOverlay, RevealOverlayProps},
    effect::Effect,
    moments::KeyMoment,
    outcome::{BattleMode, BattleOutcome},
    reducer::reducer,
    state::{AppState, Phase},
    telemetry::TelemetryEvent,
};
use pretty_assertions::assert_eq;
use tui_dispatch::NumericComponentId;
use tui_dispatch::testing::*;

fn even_fight() -> BattleOutcome {
    BattleOutcome::new(true, 12_000.0, 12_000.0)
        .with_stage("1-4 Ember Pass")
        .with_stars(3)
        .with_first_clear()
}

fn show(outcome: BattleOutcome) -> Action {
    Action::PresentationShow {
        outcome: Some(outcome),
        mode: BattleMode::Campaign,
    }
}

fn scheduled_beat(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::ScheduleBeat { generation, .. } => Some(*generation),
        _ => None,
    })
}

fn tracked(effects: &[Effect]) -> Vec<&'static str> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Track(event) => Some(event.name()),
            _ => None,
        })
        .collect()
}

/// Fire scheduled beats until none is pending, collecting every effect seen.
/// `dispatch` sends one action and returns the effects it produced.
fn run_beats(
    mut dispatch: impl FnMut(Action) -> Vec<Effect>,
    mut pending: Option<u64>,
) -> Vec<Effect> {
    let mut seen = Vec::new();
    while let Some(generation) = pending {
        let effects = dispatch(Action::BeatElapsed(generation));
        pending = scheduled_beat(&effects);
        seen.extend(effects);
    }
    seen
}

// ============================================================================
// Full playback
// ============================================================================

#[test]
fn test_full_playback_reaches_result() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(show(even_fight()));
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::CancelBeat));
    assert_eq!(tracked(&effects), vec!["presentation_viewed"]);

    let seen = run_beats(
        |action| {
            harness.dispatch_collect(action);
            harness.drain_effects()
        },
        scheduled_beat(&effects),
    );

    harness.assert_state(|s| s.phase() == Some(Phase::Result));
    harness.assert_state(|s| !s.presentation.as_ref().unwrap().skipped);
    assert_eq!(
        tracked(&seen),
        vec!["damage_batch_shown", "moments_shown", "result_shown"]
    );
    seen.effects_none_match(|e| matches!(e, Effect::Complete(_)));
}

#[test]
fn test_even_fight_selects_every_moment() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(show(even_fight()));

    harness.assert_state(|s| {
        s.presentation.as_ref().unwrap().moments
            == vec![
                KeyMoment::Opening,
                KeyMoment::Skill,
                KeyMoment::Damage,
                KeyMoment::Clutch,
                KeyMoment::Final,
            ]
    });
    harness.assert_state(|s| s.presentation.as_ref().unwrap().damage_events.len() == 10);
}

#[test]
fn test_moments_shown_reports_clutch() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(show(even_fight()));
    let effects = harness.drain_effects();
    let seen = run_beats(
        |action| {
            harness.dispatch_collect(action);
            harness.drain_effects()
        },
        scheduled_beat(&effects),
    );

    let shown = seen.iter().find_map(|e| match e {
        Effect::Track(TelemetryEvent::MomentsShown { clutch, moments, .. }) => {
            Some((*clutch, moments.len()))
        }
        _ => None,
    });
    assert_eq!(shown, Some((true, 5)));
}

#[test]
fn test_reduced_motion_shortens_every_beat() {
    let state = AppState {
        device_reduce_motion: true,
        ..Default::default()
    };
    let mut harness = EffectStoreTestHarness::new(state, reducer);
    harness.dispatch_collect(show(even_fight()));

    let mut delays = Vec::new();
    let mut effects = harness.drain_effects();
    while let Some(generation) = scheduled_beat(&effects) {
        delays.extend(effects.iter().filter_map(|e| match e {
            Effect::ScheduleBeat { delay_ms, .. } => Some(*delay_ms),
            _ => None,
        }));
        harness.dispatch_collect(Action::BeatElapsed(generation));
        effects = harness.drain_effects();
    }

    // Intro, Opening, Final, Climax
    assert_eq!(delays, vec![300, 700, 700, 600]);
    harness.assert_state(|s| s.phase() == Some(Phase::Result));
}

// ============================================================================
// Skip and completion
// ============================================================================

#[test]
fn test_skip_short_circuits_to_result() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(show(even_fight()));
    let effects = harness.drain_effects();
    let intro_beat = scheduled_beat(&effects);

    harness.dispatch_collect(Action::PresentationSkip);
    let effects = harness.drain_effects();
    assert_eq!(
        tracked(&effects),
        vec!["presentation_skipped", "result_shown"]
    );
    effects.effects_first_matches(|e| matches!(e, Effect::CancelBeat));
    harness.assert_state(|s| s.phase() == Some(Phase::Result));

    // The intro beat that was already in flight lands late.
    let late = run_beats(
        |action| {
            harness.dispatch_collect(action);
            harness.drain_effects()
        },
        intro_beat,
    );
    late.effects_empty();
    harness.assert_state(|s| s.phase() == Some(Phase::Result));
}

#[test]
fn test_continue_completes_exactly_once() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(show(even_fight()));
    let activation = scheduled_beat(&harness.drain_effects()).unwrap();
    harness.dispatch_collect(Action::PresentationSkip);
    harness.drain_effects();

    harness.dispatch_all([
        Action::PresentationContinue,
        Action::PresentationContinue,
        Action::PresentationContinue,
    ]);
    let effects = harness.drain_effects();

    let reports: Vec<_> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Complete(report) => Some(report.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].generation, activation);
    assert!(reports[0].skipped);
    assert!(reports[0].victory);
}

#[test]
fn test_host_receives_completion_and_hides() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::HostPresentSelected);
    harness.dispatch_collect(Action::PresentationSkip);
    harness.dispatch_collect(Action::PresentationContinue);

    let effects = harness.drain_effects();
    let report = effects
        .iter()
        .find_map(|e| match e {
            Effect::Complete(report) => Some(report.clone()),
            _ => None,
        })
        .unwrap();

    harness.complete_action(Action::HostDidComplete(report));
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));

    harness.assert_state(|s| !s.visible);
    harness.assert_state(|s| s.completed_count == 1);
    harness.assert_state(|s| s.status.as_deref().is_some_and(|m| m.contains("victory")));
}

#[test]
fn test_late_completion_from_previous_run_is_ignored() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(show(even_fight()));
    harness.dispatch_collect(Action::PresentationSkip);
    harness.dispatch_collect(Action::PresentationContinue);
    let first_report = harness
        .drain_effects()
        .into_iter()
        .find_map(|e| match e {
            Effect::Complete(report) => Some(report),
            _ => None,
        })
        .unwrap();

    // The next run starts before the first run's completion reaches the host.
    let rematch = BattleOutcome::new(false, 8_000.0, 10_000.0).with_stage("3-9 Frostmarch");
    harness.dispatch_collect(show(rematch));
    harness.drain_effects();

    harness.complete_action(Action::HostDidComplete(first_report));
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (0, 1));

    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.visible);
    harness.assert_state(|s| s.phase() == Some(Phase::Intro));
    harness.assert_state(|s| !s.presentation.as_ref().unwrap().outcome.victory);
    harness.assert_state(|s| s.completed_count == 0);
}

// ============================================================================
// Re-activation
// ============================================================================

#[test]
fn test_reactivation_drops_previous_timers() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(show(even_fight()));
    let first = scheduled_beat(&harness.drain_effects()).unwrap();

    let rematch = BattleOutcome::new(false, 6_000.0, 10_000.0).with_stage("Arena Silver II");
    harness.dispatch_collect(Action::PresentationShow {
        outcome: Some(rematch),
        mode: BattleMode::Arena,
    });
    let effects = harness.drain_effects();
    let second = scheduled_beat(&effects).unwrap();
    assert!(second > first);
    effects.effects_first_matches(|e| matches!(e, Effect::CancelBeat));

    // A's intro beat fires after B was activated.
    harness.dispatch_collect(Action::BeatElapsed(first));
    harness.drain_effects().effects_empty();
    harness.assert_state(|s| s.phase() == Some(Phase::Intro));
    harness.assert_state(|s| s.presentation.as_ref().unwrap().mode == BattleMode::Arena);

    // B completes under its own generation.
    harness.dispatch_collect(Action::PresentationSkip);
    harness.dispatch_collect(Action::PresentationContinue);
    let effects = harness.drain_effects();
    effects.effects_none_match(
        |e| matches!(e, Effect::Complete(report) if report.generation != second),
    );
    effects.effects_not_empty();
}

#[test]
fn test_reactivation_resets_presentation() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(show(even_fight()));
    harness.dispatch_collect(Action::PresentationSkip);
    harness.dispatch_collect(Action::PresentationContinue);

    harness.dispatch_collect(show(even_fight()));
    harness.assert_state(|s| {
        let p = s.presentation.as_ref().unwrap();
        p.phase == Phase::Intro && !p.skipped && !p.completed && p.moment_index == 0
    });
}

#[test]
fn test_hide_mid_playback_cancels_beat() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(show(even_fight()));
    let beat = scheduled_beat(&harness.drain_effects());

    harness.dispatch_collect(Action::PresentationHide);
    let effects = harness.drain_effects();
    assert_eq!(
        effects,
        vec![Effect::CancelBeat, Effect::AbandonCompletion]
    );

    run_beats(
        |action| {
            harness.dispatch_collect(action);
            harness.drain_effects()
        },
        beat,
    )
    .effects_empty();
    harness.assert_state(|s| s.presentation.is_none() && !s.visible);
}

// ============================================================================
// Component + store integration
// ============================================================================

#[test]
fn test_keyboard_skip_then_continue() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    let mut overlay = RevealOverlay;
    harness.dispatch_collect(show(even_fight()));

    let actions = harness.send_keys::<NumericComponentId, _, _>("s", |state, event| {
        let props = RevealOverlayProps {
            visible: state.visible,
            presentation: state.presentation.as_ref(),
            is_focused: true,
        };
        overlay
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::PresentationSkip);
    for action in actions {
        harness.dispatch_collect(action);
    }

    let actions = harness.send_keys::<NumericComponentId, _, _>("c", |state, event| {
        let props = RevealOverlayProps {
            visible: state.visible,
            presentation: state.presentation.as_ref(),
            is_focused: true,
        };
        overlay
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });
    actions.assert_first(Action::PresentationContinue);
    for action in actions {
        harness.dispatch_collect(action);
    }

    harness.assert_state(|s| s.presentation.as_ref().unwrap().completed);
}

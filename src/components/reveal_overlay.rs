use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tui_dispatch::EventKind;

use super::{Component, ResultPanel, ResultPanelProps};
use crate::action::Action;
use crate::damage::{DamageEvent, DamageTag};
use crate::moments::KeyMoment;
use crate::state::{Phase, Presentation};

/// Props for RevealOverlay - the host's `visible` flag plus the active run
pub struct RevealOverlayProps<'a> {
    pub visible: bool,
    pub presentation: Option<&'a Presentation>,
    pub is_focused: bool,
}

/// Modal overlay that plays the battle presentation
#[derive(Default)]
pub struct RevealOverlay;

fn tag_color(tag: DamageTag) -> Color {
    match tag {
        DamageTag::Devastating => Color::LightRed,
        DamageTag::Crit => Color::Yellow,
        DamageTag::Blocked => Color::Blue,
        DamageTag::Glancing => Color::Gray,
        DamageTag::Normal => Color::White,
    }
}

pub fn format_power(power: f64) -> String {
    let digits = (power.max(0.0).round() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn damage_line(event: DamageEvent) -> Line<'static> {
    let style = Style::default()
        .fg(tag_color(event.tag))
        .add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled(format_power(event.value as f64), style)];
    if event.tag != DamageTag::Normal {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("{}!", event.tag.label()), style));
    }
    Line::from(spans).centered()
}

fn moment_detail(presentation: &Presentation) -> Line<'static> {
    let moment = presentation.current_moment();
    match moment {
        KeyMoment::Skill => {
            let callout = presentation.skill_callout().unwrap_or_default();
            Line::from(Span::styled(
                format!("\u{00ab} {callout} \u{00bb}"),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered()
        }
        KeyMoment::Damage => match presentation.shown_damage() {
            Some(event) => damage_line(event),
            None => Line::default(),
        },
        KeyMoment::Opening => Line::from("Both sides charge!").centered(),
        KeyMoment::Clutch => Line::from("Too close to call!").centered(),
        KeyMoment::Final => Line::from("One last strike...").centered(),
    }
}

fn progress_line(presentation: &Presentation) -> Line<'static> {
    let spans: Vec<Span<'static>> = presentation
        .moments
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i <= presentation.moment_index {
                Span::styled("\u{25cf} ", Style::default().fg(Color::Cyan))
            } else {
                Span::styled("\u{25cb} ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();
    Line::from(spans).centered()
}

fn render_intro(frame: &mut Frame, area: Rect, presentation: &Presentation) {
    let outcome = &presentation.outcome;
    let mut lines = vec![Line::from(Span::styled(
        "BATTLE START",
        Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
    ))
    .centered()];
    if let Some(stage) = &outcome.stage_name {
        lines.push(Line::from(stage.clone()).centered());
    }
    lines.push(Line::default());
    lines.push(
        Line::from(format!(
            "{}  vs  {}",
            format_power(outcome.player_power()),
            format_power(outcome.enemy_power())
        ))
        .centered(),
    );
    render_centered(frame, area, lines);
}

fn render_moment(frame: &mut Frame, area: Rect, presentation: &Presentation) {
    let lines = vec![
        progress_line(presentation),
        Line::default(),
        Line::from(Span::styled(
            presentation.current_moment().label(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::default(),
        moment_detail(presentation),
    ];
    render_centered(frame, area, lines);
}

fn render_climax(frame: &mut Frame, area: Rect, presentation: &Presentation) {
    let color = if presentation.outcome.victory {
        Color::Yellow
    } else {
        Color::Gray
    };
    let lines = vec![Line::from(Span::styled(
        presentation.climax_line(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .centered()];
    render_centered(frame, area, lines);
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let [body] = Layout::vertical([Constraint::Length(lines.len() as u16)])
        .flex(Flex::Center)
        .areas(area);
    frame.render_widget(Paragraph::new(lines), body);
}

fn hint_line(presentation: &Presentation) -> Line<'static> {
    let key = Style::default().fg(Color::Cyan);
    let text = Style::default().fg(Color::DarkGray);
    if presentation.can_skip() {
        Line::from(vec![Span::styled("s", key), Span::styled(" skip", text)]).right_aligned()
    } else {
        Line::from(vec![
            Span::styled("enter", key),
            Span::styled(" continue", text),
        ])
        .right_aligned()
    }
}

impl Component<Action> for RevealOverlay {
    type Props<'a> = RevealOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || !props.visible {
            return None;
        }
        let Some(presentation) = props.presentation else {
            return None;
        };

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('s') | KeyCode::Esc if presentation.can_skip() => {
                    Some(Action::PresentationSkip)
                }
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c')
                    if presentation.phase == Phase::Result =>
                {
                    Some(Action::PresentationContinue)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if !props.visible {
            return;
        }
        let Some(presentation) = props.presentation else {
            return;
        };

        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} battle ", presentation.mode.label()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body, hints] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        match presentation.phase {
            Phase::Intro => render_intro(frame, body, presentation),
            Phase::Moments => render_moment(frame, body, presentation),
            Phase::Climax => render_climax(frame, body, presentation),
            Phase::Result => {
                let mut panel = ResultPanel;
                panel.render(frame, body, ResultPanelProps { presentation });
            }
        }
        frame.render_widget(Paragraph::new(hint_line(presentation)), hints);
    }
}

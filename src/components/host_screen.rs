use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::Component;
use super::result_panel::star_line;
use crate::action::Action;
use crate::outcome::BattleOutcome;
use crate::state::AppState;

/// Props for HostScreen - read-only view of state
pub struct HostScreenProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Stand-in for the battle-origin screen that launches presentations
#[derive(Default)]
pub struct HostScreen;

fn outcome_line(outcome: &BattleOutcome, selected: bool) -> Line<'static> {
    let (result, color) = if outcome.victory {
        ("VICTORY", Color::Yellow)
    } else {
        ("DEFEAT ", Color::Gray)
    };
    let cursor = if selected { "> " } else { "  " };
    let row = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(result, Style::default().fg(color)),
        Span::styled(
            format!(
                "  {:<20}",
                outcome.stage_name.as_deref().unwrap_or("unnamed stage")
            ),
            row,
        ),
        Span::styled(
            format!("ratio {:.2}  ", outcome.power_ratio()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(star_line(outcome.star_count()), Style::default().fg(Color::Yellow)),
    ])
}

impl Component<Action> for HostScreen {
    type Props<'a> = HostScreenProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => Some(Action::HostSelectNext),
                KeyCode::Up | KeyCode::Char('k') => Some(Action::HostSelectPrev),
                KeyCode::Enter => Some(Action::HostPresentSelected),
                KeyCode::Char('m') => Some(Action::HostToggleReduceMotion),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Outcome list
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} outcomes ", state.mode.label()));
        let lines: Vec<Line> = state
            .outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| outcome_line(outcome, i == state.selected))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

        let motion = if state.device_reduce_motion {
            "reduce motion: on"
        } else {
            "reduce motion: off"
        };
        let mut status = vec![Span::styled(motion, Style::default().fg(Color::DarkGray))];
        if let Some(message) = &state.status {
            status.push(Span::raw("  "));
            status.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
        }
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[2],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("enter", "present"),
                    StatusBarHint::new("j/k", "select"),
                    StatusBarHint::new("m", "motion"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

use artbox::{
    Alignment as ArtAlignment, Color as ArtColor, ColorStop, Fill, LinearGradient, Renderer,
    fonts, integrations::ratatui::ArtBox,
};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;
use crate::outcome::MAX_STARS;
use crate::state::Presentation;

pub const STAR_FILLED: &str = "\u{2605}";
pub const STAR_EMPTY: &str = "\u{2606}";

pub struct ResultPanel;

pub struct ResultPanelProps<'a> {
    pub presentation: &'a Presentation,
}

/// Banner height cap, tall enough for the terminus font.
const BANNER_CAP: u16 = 6;

fn banner_fill(victory: bool) -> Fill {
    let (from, to) = if victory {
        (ArtColor::rgb(255, 214, 90), ArtColor::rgb(255, 150, 60))
    } else {
        (ArtColor::rgb(150, 160, 190), ArtColor::rgb(90, 100, 140))
    };
    Fill::Linear(LinearGradient::new(
        0.0,
        vec![ColorStop::new(0.0, from), ColorStop::new(1.0, to)],
    ))
}

pub fn star_line(stars: u8) -> String {
    (0..MAX_STARS)
        .map(|i| if i < stars { STAR_FILLED } else { STAR_EMPTY })
        .collect::<Vec<_>>()
        .join(" ")
}

fn reward_lines(presentation: &Presentation) -> Vec<Line<'static>> {
    presentation
        .outcome
        .rewards
        .iter()
        .map(|(kind, amount)| {
            Line::from(vec![
                Span::styled(format!("{kind} "), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("+{amount}"),
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
            .centered()
        })
        .collect()
}

impl Component<Action> for ResultPanel {
    type Props<'a> = ResultPanelProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let presentation = props.presentation;
        let outcome = &presentation.outcome;
        let rewards = reward_lines(presentation);

        let chunks = Layout::vertical([
            Constraint::Max(BANNER_CAP),
            Constraint::Length(1), // Subtitle
            Constraint::Length(1), // First clear badge
            Constraint::Length(1), // Stars
            Constraint::Length(1),
            Constraint::Length(rewards.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1), // Continue
        ])
        .flex(Flex::Center)
        .split(area);

        let banner = if outcome.victory { "VICTORY" } else { "DEFEAT" };
        let renderer = Renderer::new(fonts::stack(&["terminus", "miniwi"]))
            .with_plain_fallback()
            .with_alignment(ArtAlignment::Center)
            .with_fill(banner_fill(outcome.victory));
        frame.render_widget(ArtBox::new(&renderer, banner), chunks[0]);

        let subtitle = match (&outcome.stage_name, outcome.victory) {
            (Some(stage), true) => format!("{banner}  {stage} cleared"),
            (Some(stage), false) => format!("{banner}  {stage} failed"),
            (None, _) => banner.to_string(),
        };
        frame.render_widget(
            Paragraph::new(Line::from(subtitle).centered())
                .style(Style::default().add_modifier(Modifier::BOLD)),
            chunks[1],
        );

        if outcome.first_clear {
            let badge = Line::from(Span::styled(
                " FIRST CLEAR ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered();
            frame.render_widget(Paragraph::new(badge), chunks[2]);
        }

        let stars = Line::from(Span::styled(
            star_line(outcome.star_count()),
            Style::default().fg(Color::Yellow),
        ))
        .centered();
        frame.render_widget(Paragraph::new(stars), chunks[3]);

        frame.render_widget(Paragraph::new(rewards), chunks[5]);

        let label = if presentation.completed {
            "Continuing..."
        } else {
            "[ Continue ]"
        };
        let button = Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .centered();
        frame.render_widget(Paragraph::new(button), chunks[7]);
    }
}

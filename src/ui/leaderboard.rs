use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::app::App;
use crate::leaderboard::LeaderboardEntry;

/// "3 hours ago" style age for a leaderboard entry
fn humanized_age(entry: &LeaderboardEntry) -> String {
    let elapsed = Local::now()
        .signed_duration_since(entry.date)
        .to_std()
        .unwrap_or_default();
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}

fn medal_style(rank: usize) -> Style {
    match rank {
        0 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        1 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        2 => Style::default().fg(Color::LightRed),
        _ => Style::default(),
    }
}

pub fn render_leaderboard(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // table
            Constraint::Length(2), // instructions
        ])
        .split(area);

    let title = Paragraph::new("Local Top Ten")
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let entries = app.trainer.leaderboard.entries();
    if entries.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "no sessions recorded yet — finish a run to get on the board",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        f.render_widget(empty, chunks[1]);
    } else {
        let rows: Vec<Row> = entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| {
                Row::new(vec![
                    Cell::from(format!("#{}", rank + 1)).style(medal_style(rank)),
                    Cell::from(entry.score.to_string()).style(medal_style(rank)),
                    Cell::from(format!("{:.0}%", entry.accuracy)),
                    Cell::from(entry.difficulty.to_string()),
                    Cell::from(entry.mode.to_string()),
                    Cell::from(humanized_age(entry))
                        .style(Style::default().add_modifier(Modifier::DIM)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Min(12),
            ],
        )
        .header(
            Row::new(vec!["", "score", "acc", "level", "mode", "when"])
                .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)),
        )
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new(Span::styled(
        "(b)ack  (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, SortBy};
use crate::stats::DifficultySummary;

/// Pure presenter for a single analytics row
pub fn present_row(data: &DifficultySummary) -> Row<'static> {
    let reaction_color = if data.avg_reaction_ms == 0.0 {
        Color::DarkGray
    } else if data.avg_reaction_ms < 450.0 {
        Color::Green
    } else if data.avg_reaction_ms < 700.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let rate_color = if data.hit_rate >= 80.0 {
        Color::Green
    } else if data.hit_rate >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let reaction_display = if data.avg_reaction_ms == 0.0 {
        "—".to_string()
    } else {
        format!("{:.0} ms", data.avg_reaction_ms)
    };

    Row::new(vec![
        Cell::from(data.difficulty.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(reaction_display).style(Style::default().fg(reaction_color)),
        Cell::from(format!("{:.1}%", data.hit_rate)).style(Style::default().fg(rate_color)),
        Cell::from(data.attempts.to_string()),
    ])
}

fn sort_summary(summary: &mut [DifficultySummary], sort_by: &SortBy, ascending: bool) {
    match sort_by {
        // the summary arrives in difficulty order; nothing to re-sort
        SortBy::Difficulty => {
            if !ascending {
                summary.reverse();
            }
            return;
        }
        SortBy::AvgReaction => summary.sort_by(|a, b| {
            a.avg_reaction_ms
                .partial_cmp(&b.avg_reaction_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortBy::HitRate => summary.sort_by(|a, b| {
            a.hit_rate
                .partial_cmp(&b.hit_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortBy::Attempts => summary.sort_by(|a, b| a.attempts.cmp(&b.attempts)),
    }
    if !ascending {
        summary.reverse();
    }
}

pub fn render_reaction_stats(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // table
            Constraint::Length(4), // instructions
        ])
        .split(area);

    let sort_direction = if app.stats_view.sort_ascending {
        "↑"
    } else {
        "↓"
    };
    let sort_by_text = match app.stats_view.sort_by {
        SortBy::Difficulty => "Difficulty",
        SortBy::AvgReaction => "Avg Reaction",
        SortBy::HitRate => "Hit Rate",
        SortBy::Attempts => "Attempts",
    };
    let title = Paragraph::new(format!(
        "Reaction Analytics (Sort: {} {})",
        sort_by_text, sort_direction
    ))
    .block(Block::default().borders(Borders::ALL).title("Stats"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let summary = app
        .trainer
        .stats_db
        .as_ref()
        .and_then(|db| db.get_difficulty_summary().ok());

    match summary {
        Some(mut summary) if !summary.is_empty() => {
            sort_summary(
                &mut summary,
                &app.stats_view.sort_by,
                app.stats_view.sort_ascending,
            );

            let table_height = chunks[1].height.saturating_sub(3) as usize;
            let max_scroll = summary.len().saturating_sub(table_height.max(1));
            if app.stats_view.scroll_offset > max_scroll {
                app.stats_view.scroll_offset = max_scroll;
            }

            let rows: Vec<Row> = summary
                .iter()
                .skip(app.stats_view.scroll_offset)
                .take(table_height.max(1))
                .map(present_row)
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(12),
                    Constraint::Length(12),
                    Constraint::Length(10),
                    Constraint::Min(8),
                ],
            )
            .header(
                Row::new(vec!["level", "reaction", "hit rate", "attempts"])
                    .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)),
            )
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(table, chunks[1]);
        }
        _ => {
            let empty = Paragraph::new(
                "no reaction data yet — play a few sessions and come back",
            )
            .style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC))
            .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
        }
    }

    let instructions = Paragraph::new(
        "sort: (1) level (2) reaction (3) hit rate (4) attempts  (space) flip\nscroll: ↑/↓  (b)ack  (esc) quit",
    )
    .style(Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM))
    .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(difficulty: &str, reaction: f64, rate: f64, attempts: i64) -> DifficultySummary {
        DifficultySummary {
            difficulty: difficulty.to_string(),
            avg_reaction_ms: reaction,
            hit_rate: rate,
            attempts,
        }
    }

    #[test]
    fn test_sort_by_reaction_descending() {
        let mut rows = vec![
            summary("easy", 600.0, 90.0, 10),
            summary("hard", 300.0, 40.0, 20),
        ];
        sort_summary(&mut rows, &SortBy::AvgReaction, false);
        assert_eq!(rows[0].difficulty, "easy");
        sort_summary(&mut rows, &SortBy::AvgReaction, true);
        assert_eq!(rows[0].difficulty, "hard");
    }

    #[test]
    fn test_sort_by_attempts() {
        let mut rows = vec![
            summary("easy", 600.0, 90.0, 10),
            summary("normal", 500.0, 70.0, 50),
            summary("hard", 300.0, 40.0, 20),
        ];
        sort_summary(&mut rows, &SortBy::Attempts, false);
        let attempts: Vec<i64> = rows.iter().map(|r| r.attempts).collect();
        assert_eq!(attempts, vec![50, 20, 10]);
    }

    #[test]
    fn test_difficulty_order_flips_only() {
        let mut rows = vec![
            summary("easy", 600.0, 90.0, 10),
            summary("expert", 200.0, 30.0, 5),
        ];
        sort_summary(&mut rows, &SortBy::Difficulty, false);
        assert_eq!(rows[0].difficulty, "expert");
    }
}

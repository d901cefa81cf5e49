pub mod charting;
pub mod leaderboard;
pub mod reaction_stats;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap,
    },
};
use std::time::SystemTime;

use crate::app::{App, AppState};
use crate::session::{Mode, Phase};
use crate::trainer::Snapshot;
use crate::util::{mean, std_dev};

const CELEBRATION_COLORS: [Color; 7] = [
    Color::Red,
    Color::LightRed,
    Color::Yellow,
    Color::LightYellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Aim => render_aim(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            // table screens render through their own Frame-based functions
            AppState::Leaderboard | AppState::ReactionStats => {}
        }
    }
}

/// The playfield cell area inside the header/footer chrome and the border.
/// Mouse coordinates are mapped through this same rect, so the math here is
/// the single source of truth for where a click lands.
pub fn playfield_inner(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    let field = chunks[1];
    Rect {
        x: field.x.saturating_add(1),
        y: field.y.saturating_add(1),
        width: field.width.saturating_sub(2),
        height: field.height.saturating_sub(2),
    }
}

/// Map a terminal cell to playfield coordinates. Returns `None` for cells
/// outside the playfield. The canvas y-axis points up, so rows invert.
pub fn cell_to_field(
    col: u16,
    row: u16,
    inner: Rect,
    field_w: f64,
    field_h: f64,
) -> Option<(f64, f64)> {
    if inner.width == 0 || inner.height == 0 {
        return None;
    }
    if col < inner.x
        || col >= inner.x + inner.width
        || row < inner.y
        || row >= inner.y + inner.height
    {
        return None;
    }
    let fx = (col - inner.x) as f64 + 0.5;
    let fy = (row - inner.y) as f64 + 0.5;
    let x = fx / inner.width as f64 * field_w;
    let y = field_h - fy / inner.height as f64 * field_h;
    Some((x, y))
}

fn clock_label(snapshot: &Snapshot, mode: Mode) -> String {
    let secs = snapshot.clock_secs;
    match mode {
        Mode::Timed => format!("{}:{:02}", secs / 60, secs % 60),
        Mode::Endless => format!("{}:{:02} elapsed", secs / 60, secs % 60),
    }
}

fn render_aim(app: &App, area: Rect, buf: &mut Buffer) {
    let now = SystemTime::now();
    let snapshot = app.trainer.snapshot(now);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Line::from(vec![
        Span::styled(format!(" score {}", snapshot.score), bold_style),
        Span::styled("  │  ", dim_style),
        Span::raw(clock_label(&snapshot, app.trainer.config.mode)),
        Span::styled("  │  ", dim_style),
        Span::raw(format!("acc {:.0}%", snapshot.accuracy)),
        Span::styled("  │  ", dim_style),
        Span::styled(
            format!(
                "{} / {}",
                app.trainer.config.difficulty, app.trainer.config.mode
            ),
            dim_style,
        ),
    ]);
    Paragraph::new(header).render(chunks[0], buf);

    let field_w = app.trainer.config.width;
    let field_h = app.trainer.config.height;
    let hovered = app.hovered;
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("plink"))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, field_w])
        .y_bounds([0.0, field_h])
        .paint(|ctx| {
            for target in &snapshot.targets {
                let color = if hovered == Some(target.id) {
                    Color::Cyan
                } else if target.opacity > 0.66 {
                    Color::Green
                } else if target.opacity > 0.33 {
                    Color::Yellow
                } else {
                    Color::Red
                };
                ctx.draw(&Circle {
                    x: target.x,
                    y: target.y,
                    radius: target.radius,
                    color,
                });
            }
        });
    canvas.render(chunks[1], buf);

    match snapshot.phase {
        Phase::Idle => {
            let intro = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled("plink", bold_style)),
                Line::from(""),
                Line::from("click the targets before they fade"),
                Line::from(""),
                Line::from(Span::styled("press s to start", dim_style)),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            intro.render(centered_band(chunks[1], 6), buf);
        }
        Phase::Paused => {
            let overlay = Paragraph::new(Span::styled(
                "PAUSED — press space to resume",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            overlay.render(centered_band(chunks[1], 1), buf);
        }
        _ => {}
    }

    let legend = Paragraph::new(Span::styled(
        "(s)tart  (space) pause  (r)eset  (l)eaderboard  (a)nalytics  (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[2], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.trainer.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(5)
        .vertical_margin(2)
        .constraints([
            Constraint::Min(1),    // reaction chart
            Constraint::Length(1), // headline stats
            Constraint::Length(1), // reaction summary
            Constraint::Length(1), // record banner / padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let coords: Vec<(f64, f64)> = session.reaction_coords.iter().map(|&p| p.into()).collect();
    let (max_t, max_reaction) = charting::compute_chart_params(&coords);
    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(magenta_style)
        .data(&coords)];
    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .style(dim_style)
                .bounds([0.0, max_t])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(charting::format_label(max_t)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("reaction ms")
                .style(dim_style)
                .bounds([0.0, max_reaction])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(charting::format_label(max_reaction)),
                ]),
        );
    chart.render(chunks[0], buf);

    let final_score = session.final_score.unwrap_or(session.score);
    let headline = Line::from(vec![
        Span::styled(format!("{} pts", final_score), bold_style),
        Span::styled("   ", dim_style),
        Span::raw(format!("{:.0}% accuracy", session.accuracy)),
        Span::styled("   ", dim_style),
        Span::raw(format!("{} hit / {} missed", session.hits, session.misses)),
    ]);
    Paragraph::new(headline)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let reactions: Vec<f64> = session.reaction_coords.iter().map(|p| p.reaction_ms).collect();
    let summary = match (mean(&reactions), std_dev(&reactions)) {
        (Some(avg), Some(sd)) => format!("avg reaction {:.0}ms ± {:.0}", avg, sd),
        _ => String::from("no targets hit"),
    };
    Paragraph::new(Span::styled(summary, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    if app.trainer.last_rank() == Some(0) {
        Paragraph::new(Span::styled(
            "NEW RECORD!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    let legend = Paragraph::new(Span::styled(
        "(r)etry  (l)eaderboard  (a)nalytics  (t)weet  (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[4], buf);

    render_celebration(app, area, buf);
}

/// Overlay the confetti particles onto whatever is already drawn
pub fn render_celebration(app: &App, area: Rect, buf: &mut Buffer) {
    if !app.celebration.is_active {
        return;
    }
    for particle in &app.celebration.particles {
        let col = particle.x.round();
        let row = particle.y.round();
        if col < 0.0 || row < 0.0 {
            continue;
        }
        let (col, row) = (col as u16, row as u16);
        if col < area.x + area.width && row < area.y + area.height && col >= area.x && row >= area.y
        {
            if let Some(cell) = buf.cell_mut(Position::new(col, row)) {
                cell.set_char(particle.symbol)
                    .set_fg(CELEBRATION_COLORS[particle.color_index % CELEBRATION_COLORS.len()]);
            }
        }
    }
}

/// A horizontal band of `height` rows vertically centered in `area`
fn centered_band(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let top = area.y + (area.height - height) / 2;
    Rect {
        x: area.x,
        y: top,
        width: area.width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playfield_inner_accounts_for_chrome() {
        let inner = playfield_inner(Rect::new(0, 0, 80, 24));
        // one header row, one footer row, one border cell on each side
        assert_eq!(inner, Rect::new(1, 2, 78, 20));
    }

    #[test]
    fn test_cell_to_field_maps_corners() {
        let inner = Rect::new(1, 2, 78, 20);
        let (x, y) = cell_to_field(1, 2, inner, 800.0, 450.0).unwrap();
        assert!(x > 0.0 && x < 800.0 / 78.0);
        assert!(y > 450.0 - 450.0 / 20.0 && y < 450.0);

        let (x, y) = cell_to_field(78, 21, inner, 800.0, 450.0).unwrap();
        assert!(x < 800.0);
        assert!(y > 0.0);
    }

    #[test]
    fn test_cell_to_field_rejects_outside_cells() {
        let inner = Rect::new(1, 2, 78, 20);
        assert!(cell_to_field(0, 5, inner, 800.0, 450.0).is_none());
        assert!(cell_to_field(79, 5, inner, 800.0, 450.0).is_none());
        assert!(cell_to_field(10, 1, inner, 800.0, 450.0).is_none());
        assert!(cell_to_field(10, 22, inner, 800.0, 450.0).is_none());
    }

    #[test]
    fn test_cell_to_field_inverts_rows() {
        let inner = Rect::new(0, 0, 10, 10);
        let (_, y_top) = cell_to_field(5, 0, inner, 100.0, 100.0).unwrap();
        let (_, y_bottom) = cell_to_field(5, 9, inner, 100.0, 100.0).unwrap();
        assert!(y_top > y_bottom);
    }

    #[test]
    fn test_cell_to_field_degenerate_inner() {
        let inner = Rect::new(0, 0, 0, 0);
        assert!(cell_to_field(0, 0, inner, 100.0, 100.0).is_none());
    }
}

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use spellfall::token::TokenState;
use spellfall::util::{mean, std_dev};

use crate::{App, AppState};

const TOP_BAR_ROWS: u16 = 3;
const HELP_ROWS: u16 = 1;
const ACCURACY_COLS: u16 = 4;

const PARTICLE_COLORS: [Color; 7] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
    Color::White,
];

/// The part of the terminal the board maps onto. Input translates mouse
/// cells back into board coordinates through the same function, so render
/// and hit-testing can never disagree.
pub fn board_viewport(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + TOP_BAR_ROWS.min(area.height),
        width: area.width.saturating_sub(ACCURACY_COLS).max(1),
        height: area
            .height
            .saturating_sub(TOP_BAR_ROWS + HELP_ROWS)
            .max(1),
    }
}

pub fn cell_to_board(vp: Rect, board_size: (f64, f64), column: u16, row: u16) -> (f64, f64) {
    let (w, h) = board_size;
    if w <= 0.0 || h <= 0.0 || vp.width == 0 || vp.height == 0 {
        return (0.0, 0.0);
    }
    let x = (column.saturating_sub(vp.x)) as f64 / vp.width as f64 * w;
    let y = (row.saturating_sub(vp.y)) as f64 / vp.height as f64 * h;
    (x, y)
}

pub fn board_to_cell(vp: Rect, board_size: (f64, f64), x: f64, y: f64) -> Option<(u16, u16)> {
    let (w, h) = board_size;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let col = vp.x as f64 + x / w * vp.width as f64;
    let row = vp.y as f64 + y / h * vp.height as f64;
    if col < vp.x as f64
        || row < vp.y as f64
        || col >= (vp.x + vp.width) as f64
        || row >= (vp.y + vp.height) as f64
    {
        return None;
    }
    Some((col as u16, row as u16))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => render_game(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    if area.height < TOP_BAR_ROWS + HELP_ROWS + 2 || area.width < 20 {
        return;
    }

    render_top_bar(app, area, buf);
    render_accuracy_bar(app, area, buf);

    let vp = board_viewport(area);
    let size = app.engine.geometry().size();

    render_goals(app, vp, size, buf);
    render_tokens(app, vp, size, buf);
    render_celebration(app, area, buf);

    let help = Line::from(vec![
        Span::styled(
            "drag letters into their slots",
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw("   "),
        Span::styled("(n)", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" new session  ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled("(esc)", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" quit", Style::default().add_modifier(Modifier::DIM)),
    ]);
    Paragraph::new(help)
        .alignment(Alignment::Center)
        .render(Rect::new(area.x, area.bottom() - 1, area.width, 1), buf);
}

fn render_top_bar(app: &App, area: Rect, buf: &mut Buffer) {
    let score = app.engine.score();
    let session = app.engine.session();

    let remaining = session.current_active_words().len()
        + session.session().map(|s| s.pool_len()).unwrap_or(0);
    let category = app
        .engine
        .current_word()
        .and_then(|w| w.category.clone())
        .unwrap_or_default();

    let mut header = vec![Span::styled(
        " spellfall ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !category.is_empty() {
        header.push(Span::styled(
            format!("· {category} "),
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ));
    }
    header.push(Span::styled(
        format!("· {remaining} words left "),
        Style::default().add_modifier(Modifier::DIM),
    ));
    Paragraph::new(Line::from(header))
        .render(Rect::new(area.x, area.y, area.width, 1), buf);

    // Progress bar: one cell per 2% of the session, like the top score bar.
    let progress = score.progress_ratio();
    let bar_width = area.width.saturating_sub(ACCURACY_COLS + 8) as usize;
    let filled = (progress * bar_width as f64).round() as usize;
    let mut spans = vec![Span::raw(" ")];
    for i in 0..bar_width {
        if i < filled {
            spans.push(Span::styled("█", Style::default().fg(Color::Green)));
        } else {
            spans.push(Span::styled("░", Style::default().add_modifier(Modifier::DIM)));
        }
    }
    spans.push(Span::styled(
        format!(" {:>3.0}%", progress * 100.0),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    Paragraph::new(Line::from(spans))
        .render(Rect::new(area.x, area.y + 1, area.width, 1), buf);
}

/// Vertical accuracy bar along the right edge, colored by how well the
/// session is going.
fn render_accuracy_bar(app: &App, area: Rect, buf: &mut Buffer) {
    let accuracy = app.engine.score().accuracy_ratio();
    let color = if accuracy >= 0.8 {
        Color::Cyan
    } else if accuracy >= 0.5 {
        Color::Yellow
    } else {
        Color::Red
    };

    let x = area.right().saturating_sub(2);
    let top = area.y + TOP_BAR_ROWS;
    let height = area.height.saturating_sub(TOP_BAR_ROWS + HELP_ROWS);
    let filled = (accuracy * height as f64).round() as u16;

    for i in 0..height {
        let symbol = if height - i <= filled { "█" } else { "░" };
        let style = if height - i <= filled {
            Style::default().fg(color)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        buf.set_string(x, top + i, symbol, style);
    }

    let label = format!("{:>3.0}", accuracy * 100.0);
    buf.set_string(
        area.right().saturating_sub(label.width() as u16 + 1),
        area.y,
        &label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    );
}

fn render_goals(app: &App, vp: Rect, size: (f64, f64), buf: &mut Buffer) {
    let geometry = app.engine.geometry();
    for slot in app.engine.board().slots() {
        let Some((gx, gy)) = geometry.goal_center(slot.index) else {
            continue;
        };
        let Some((col, row)) = board_to_cell(vp, size, gx, gy) else {
            continue;
        };
        let (text, style) = if slot.filled {
            (
                format!("({})", slot.expected.to_uppercase()),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                format!("[{}]", slot.expected),
                Style::default().add_modifier(Modifier::DIM),
            )
        };
        let col = col.saturating_sub(1).max(vp.x);
        buf.set_string(col, row, text, style);
    }
}

fn render_tokens(app: &App, vp: Rect, size: (f64, f64), buf: &mut Buffer) {
    for token in app.engine.tokens() {
        let style = match token.state {
            // Placed tokens are already shown by their filled goal.
            TokenState::PlacedCorrect | TokenState::Retired => continue,
            TokenState::Dragging => Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            TokenState::Spawned => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        };
        let Some((col, row)) = board_to_cell(vp, size, token.x, token.y) else {
            continue;
        };
        buf.set_string(col, row, token.ch.to_uppercase().to_string(), style);
    }
}

fn render_celebration(app: &App, area: Rect, buf: &mut Buffer) {
    if !app.celebration.is_active {
        return;
    }
    for particle in &app.celebration.particles {
        let col = particle.x.round();
        let row = particle.y.round();
        if col < area.x as f64
            || row < area.y as f64
            || col >= area.right() as f64
            || row >= area.bottom() as f64
        {
            continue;
        }
        let color = PARTICLE_COLORS[particle.color_index % PARTICLE_COLORS.len()];
        buf.set_string(
            col as u16,
            row as u16,
            particle.symbol.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let score = app.engine.score();
    let session = app.engine.session();

    let completed = session
        .session()
        .map(|s| s.completed().len())
        .unwrap_or(0);
    let total = session.session().map(|s| s.total_words()).unwrap_or(0);

    let mut lines = vec![
        Line::from(Span::styled(
            "session complete",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(format!("words completed   {completed}/{total}")),
        Line::from(format!("letters placed    {}", score.correct_letters())),
        Line::from(format!("wrong attempts    {}", score.wrong_attempts())),
        Line::from(format!(
            "accuracy          {:.0}%",
            score.accuracy_ratio() * 100.0
        )),
    ];

    if let Some(summary) = app.summary.as_ref().filter(|s| !s.is_empty()) {
        let times: Vec<f64> = summary.iter().map(|s| s.avg_time_to_place_ms).collect();
        if let (Some(avg), Some(sd)) = (mean(&times), std_dev(&times)) {
            lines.push(Line::from(format!(
                "time to place     {:.1}s ± {:.1}s",
                avg / 1000.0,
                sd / 1000.0
            )));
        }

        let troublesome: Vec<_> = summary
            .iter()
            .filter(|s| s.miss_rate > 0.0)
            .sorted_by(|a, b| {
                b.miss_rate
                    .partial_cmp(&a.miss_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .take(5)
            .collect();
        if !troublesome.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "troublesome letters",
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
            for s in troublesome {
                lines.push(Line::from(format!(
                    "  {}   {:>3.0}% missed over {} attempts",
                    s.letter.to_uppercase(),
                    s.miss_rate,
                    s.attempts
                )));
            }
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled("(n)", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" new session   "),
        Span::styled("(esc)", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]));

    let height = lines.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .render(
            Rect::new(area.x, top, area.width, height.min(area.height)),
            buf,
        );
}

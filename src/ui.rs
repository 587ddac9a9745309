use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Clear, Paragraph, Widget, Wrap,
    },
    Frame,
};

use crate::editor::EditorController;
use crate::geom::Point;
use crate::overlay::OverlayMode;
use crate::session::{Outcome, RenderSnapshot};

/// Left share of the screen given to the draw area, mirroring the original
/// layout (canvas left, HUD column right).
const DRAW_AREA_PERCENT: u16 = 65;

/// The draw-area rectangle for a given terminal size. The input layer uses
/// the same split so hit testing and rendering agree.
pub fn draw_area(size: Rect) -> Rect {
    split(size).0
}

fn split(size: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(DRAW_AREA_PERCENT),
            Constraint::Percentage(100 - DRAW_AREA_PERCENT),
        ])
        .split(size);
    (chunks[0], chunks[1])
}

fn canvas_points(points: &[Point], origin: Rect) -> Vec<(f64, f64)> {
    // Terminal rows grow downwards; canvas y grows upwards.
    points
        .iter()
        .map(|p| {
            (
                p.x - origin.x as f64,
                origin.height as f64 - (p.y - origin.y as f64),
            )
        })
        .collect()
}

fn stroke_canvas<'a>(title: &'a str, pts: Vec<(f64, f64)>, w: f64, h: f64, color: Color) -> impl Widget + 'a {
    Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &pts,
                color,
            });
        })
}

/// Render one play-session frame from the read-only snapshot.
pub fn draw_play(f: &mut Frame, snap: &RenderSnapshot, warnings: &[String]) {
    let (draw, hud) = split(f.area());

    let trail = canvas_points(snap.trail, draw);
    f.render_widget(
        stroke_canvas(
            "Draw Area",
            trail,
            draw.width as f64,
            draw.height as f64,
            Color::Cyan,
        ),
        draw,
    );

    let hud_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(hud);

    f.render_widget(
        Paragraph::new(snap.goal_name)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Name")),
        hud_chunks[0],
    );

    // Goal figure in shape space (0..100, y down).
    let figure: Vec<(f64, f64)> = snap
        .goal_points
        .iter()
        .map(|p| (p.x, 100.0 - p.y))
        .collect();
    f.render_widget(
        stroke_canvas("Figure", figure, 100.0, 100.0, Color::Yellow),
        hud_chunks[1],
    );

    let secs = snap.seconds_remaining;
    f.render_widget(
        Paragraph::new(format!("{}:{:04.1}", (secs / 60.0) as u32, secs % 60.0))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Time")),
        hud_chunks[2],
    );

    f.render_widget(
        Paragraph::new(snap.score.to_string())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Score")),
        hud_chunks[3],
    );

    let banner = match snap.last_outcome {
        Outcome::Match => Some(Span::styled(
            "Right!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Outcome::NoMatch => Some(Span::styled(
            "Wrong!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Outcome::None => None,
    };
    if let Some(banner) = banner {
        f.render_widget(
            Paragraph::new(banner).alignment(Alignment::Center),
            hud_chunks[4],
        );
    }

    if !warnings.is_empty() {
        f.render_widget(
            Paragraph::new(warnings.join("; "))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true }),
            hud_chunks[5],
        );
    }

    if snap.overlay_visible {
        draw_overlay(f, snap.overlay_mode, snap.score);
    }
}

fn draw_overlay(f: &mut Frame, mode: OverlayMode, score: u32) {
    let size = f.area();
    let area = Rect {
        x: size.width / 4,
        y: size.height / 3,
        width: size.width / 2,
        height: (size.height / 3).max(5),
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("Score: {score}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("(enter) {mode}")),
        Line::from("(esc) quit"),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("strokr")),
        area,
    );
}

/// Render one editor frame.
pub fn draw_editor(f: &mut Frame, ed: &EditorController, name: &str, warnings: &[String]) {
    let (draw, panel) = split(f.area());

    let trail = canvas_points(ed.recorder.points(), draw);
    f.render_widget(
        stroke_canvas(
            "Draw Area",
            trail,
            draw.width as f64,
            draw.height as f64,
            Color::Cyan,
        ),
        draw,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(panel);

    f.render_widget(
        Paragraph::new(name)
            .block(Block::default().borders(Borders::ALL).title("Add as")),
        chunks[0],
    );

    let help = Paragraph::new(vec![
        Line::from("(ctrl-r) recognize"),
        Line::from("(enter)  add shape"),
        Line::from("(ctrl-x) clear drawing"),
        Line::from("(esc)    quit"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Editor"));
    f.render_widget(help, chunks[1]);

    if let Some(msg) = &ed.message {
        f.render_widget(
            Paragraph::new(msg.as_str())
                .style(Style::default().fg(Color::Magenta))
                .wrap(Wrap { trim: true }),
            chunks[2],
        );
    }

    if !warnings.is_empty() {
        f.render_widget(
            Paragraph::new(warnings.join("; "))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true }),
            chunks[3],
        );
    }
}

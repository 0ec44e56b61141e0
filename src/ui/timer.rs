use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::app::App;
use crate::config::{STREAK_THRESHOLD_MINUTES, STREAK_WINDOW_DAYS};
use crate::stats::{current_streak, daily_buckets, format_hours, period_totals};
use crate::timer::{AlarmDuration, Mode, TimerState};
use crate::ui::{self, Palette};

/// Render the timer view
pub fn render_timer(frame: &mut Frame, area: Rect, app: &App) {
    let palette = ui::paint_background(frame, area, app);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Length(3), // Timer display
        Constraint::Length(1), // Progress
        Constraint::Length(2), // Mode label
        Constraint::Length(2), // Topic
        Constraint::Min(1),    // Spacer
        Constraint::Length(2), // Today
        Constraint::Length(2), // Controls
        Constraint::Length(1), // Footer
    ])
    .split(area);

    // Title
    let title = Line::from("Study Timer").bold().fg(palette.accent).centered();
    frame.render_widget(
        Paragraph::new(title).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    let engine = &app.engine;
    let color = mode_color(&palette, engine.mode());

    // Countdown
    let remaining = engine.remaining_seconds();
    let time_str = format!("{:02}:{:02}", remaining / 60, remaining % 60);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            time_str,
            Style::default().fg(color).bold(),
        )))
        .centered(),
        chunks[1],
    );

    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(engine.progress()),
        chunks[2],
    );

    // Mode label and state
    let status = if engine.alarm_playing() {
        match engine.alarm_duration() {
            AlarmDuration::Infinite => " (ALARM, press any key)".to_string(),
            AlarmDuration::Seconds(secs) => format!(" (ALARM {}s, press any key)", secs),
        }
    } else if engine.is_completed() {
        " (DONE)".to_string()
    } else {
        match engine.state() {
            TimerState::Running { deadline } => format!(" until {}", deadline.format("%H:%M")),
            TimerState::Idle if remaining < engine.configured_minutes() * 60 => {
                " (PAUSED)".to_string()
            }
            _ => " (READY)".to_string(),
        }
    };
    let mode_line = Line::from(vec![
        Span::styled(engine.mode().label(), Style::default().fg(color).bold()),
        Span::raw(format!(" {} min", engine.configured_minutes())),
        Span::raw(status),
    ]);
    frame.render_widget(Paragraph::new(mode_line).centered(), chunks[3]);

    // Selected topic
    let topic_line = match engine.selected_topic().and_then(|id| app.topic(id)) {
        Some(topic) => Line::from(vec![
            Span::raw("Topic: "),
            Span::styled(
                topic.name.as_str(),
                Style::default().fg(topic.display_color()).bold(),
            ),
        ]),
        None => Line::from("No topic selected, press [ or ] to pick one").fg(palette.muted),
    };
    frame.render_widget(Paragraph::new(topic_line).centered(), chunks[4]);

    // Today at a glance
    let today = app.today();
    let totals = period_totals(app.log.records(), today);
    let streak = current_streak(
        &daily_buckets(app.log.records(), today, STREAK_WINDOW_DAYS),
        STREAK_THRESHOLD_MINUTES,
    );
    let today_line = format!(
        "Today {}  |  Week {}  |  Streak {} days",
        format_hours(totals.day),
        format_hours(totals.week),
        streak
    );
    frame.render_widget(
        Paragraph::new(today_line)
            .centered()
            .block(Block::default().borders(Borders::TOP)),
        chunks[6],
    );

    // Controls
    let controls = if engine.is_running() {
        "[s/p] Pause"
    } else {
        "[s] Start  [r] Reset  [f/b] Focus/Break  [+/-] Minutes  [ [/] ] Topic"
    };
    frame.render_widget(
        Paragraph::new(controls).centered().fg(palette.muted),
        chunks[7],
    );

    ui::render_footer(
        frame,
        chunks[8],
        app,
        "[1] Timer  [2] Topics  [3] Dashboard  [c] Settings  [q] Quit",
    );
}

fn mode_color(palette: &Palette, mode: Mode) -> ratatui::style::Color {
    match mode {
        Mode::Focus => palette.focus,
        Mode::Break => palette.rest,
    }
}

use chrono::Datelike;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
};

use crate::app::App;
use crate::config::{DAILY_WINDOW_DAYS, STREAK_THRESHOLD_MINUTES, STREAK_WINDOW_DAYS, TREND_MONTHS};
use crate::stats::{
    DayBucket, MonthBucket, TopicMinutes, daily_buckets, daily_goal_progress, format_hours,
    max_of, monthly_trend, period_totals, streak_summary, topic_monthly_breakdown,
};
use crate::ui::{self, Palette};

/// Render the dashboard view
pub fn render_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let palette = ui::paint_background(frame, area, app);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Length(3), // Period totals
        Constraint::Length(3), // Streak and daily goal
        Constraint::Min(6),    // Charts
        Constraint::Length(2), // Controls
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let title = Line::from("Dashboard").bold().fg(palette.accent).centered();
    frame.render_widget(
        Paragraph::new(title).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    let today = app.today();
    let log = app.log.records();

    // Period totals
    let totals = period_totals(log, today);
    let totals_line = Line::from(vec![
        Span::raw("Today "),
        Span::styled(format_hours(totals.day), Style::default().bold()),
        Span::raw("    This week "),
        Span::styled(format_hours(totals.week), Style::default().bold()),
        Span::raw("    This month "),
        Span::styled(format_hours(totals.month), Style::default().bold()),
    ]);
    frame.render_widget(
        Paragraph::new(totals_line)
            .centered()
            .block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );

    // Streak and daily goal
    let row = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);

    let streak = streak_summary(
        &daily_buckets(log, today, STREAK_WINDOW_DAYS),
        STREAK_THRESHOLD_MINUTES,
    );
    let streak_hint = if streak.today_counted {
        "today counted"
    } else {
        "study 1h today to extend"
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{} day streak", streak.days()),
                Style::default().fg(palette.accent).bold(),
            ),
            Span::styled(format!("  ({})", streak_hint), Style::default().fg(palette.muted)),
        ]))
        .centered()
        .block(Block::default().borders(Borders::ALL).title(" Streak ")),
        row[0],
    );

    let goal_hours = app.settings.daily_goal_hours;
    let progress = daily_goal_progress(totals.day, goal_hours);
    frame.render_widget(
        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Daily goal {:.1}h ", goal_hours)),
            )
            .gauge_style(Style::default().fg(palette.rest))
            .ratio(progress.clamp(0.0, 1.0))
            .label(format!("{:.0}%", progress * 100.0)),
        row[1],
    );

    // Charts
    let charts = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);
    let top = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(charts[0]);

    render_topic_breakdown(
        frame,
        top[0],
        app,
        &topic_monthly_breakdown(log, &app.topics, today),
        &palette,
    );
    render_monthly_trend(
        frame,
        top[1],
        &monthly_trend(log, today, TREND_MONTHS),
        &palette,
    );
    render_daily_chart(
        frame,
        charts[1],
        &daily_buckets(log, today, DAILY_WINDOW_DAYS),
        &palette,
    );

    frame.render_widget(
        Paragraph::new("[x] Export  [i] Import  [X] Reset all data")
            .centered()
            .fg(palette.muted)
            .block(Block::default().borders(Borders::TOP)),
        chunks[4],
    );

    ui::render_footer(
        frame,
        chunks[5],
        app,
        "[1] Timer  [2] Topics  [3] Dashboard  [c] Settings  [q] Quit",
    );
}

/// Horizontal bars of this month's minutes per topic
fn render_topic_breakdown(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    breakdown: &[TopicMinutes],
    palette: &Palette,
) {
    let block = Block::default().borders(Borders::ALL).title(" This month ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if breakdown.is_empty() {
        frame.render_widget(
            Paragraph::new("No topics yet").centered().fg(palette.muted),
            inner,
        );
        return;
    }

    let minutes: Vec<u32> = breakdown.iter().map(|t| t.minutes).collect();
    let max = max_of(&minutes, 1);
    // name + space + value
    let bar_space = inner.width.saturating_sub(12 + 1 + 7);

    let lines: Vec<Line> = breakdown
        .iter()
        .map(|entry| {
            let color = app
                .topic(entry.topic_id)
                .map(|t| t.display_color())
                .unwrap_or(palette.muted);
            let ratio = ui::bar_ratio(f64::from(entry.minutes), f64::from(max));
            let filled = (ratio * f64::from(bar_space)).round() as usize;
            Line::from(vec![
                Span::styled(format!("{:<12.12} ", entry.name), Style::default().fg(color)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::raw(format!(" {:>6}", format_hours(entry.minutes))),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Hours per month, oldest first
fn render_monthly_trend(frame: &mut Frame, area: Rect, trend: &[MonthBucket], palette: &Palette) {
    let bars: Vec<Bar> = trend
        .iter()
        .map(|bucket| {
            Bar::default()
                .value(u64::from(bucket.minutes))
                .label(Line::from(bucket.label.clone()))
                .text_value(format!("{:.1}", bucket.hours()))
                .style(Style::default().fg(palette.accent))
        })
        .collect();

    let minutes: Vec<u32> = trend.iter().map(|b| b.minutes).collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Monthly hours "))
        .bar_width(5)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bars))
        .max(u64::from(max_of(&minutes, 60)));

    frame.render_widget(chart, area);
}

/// Minutes per day over the daily window, today last
fn render_daily_chart(frame: &mut Frame, area: Rect, days: &[DayBucket], palette: &Palette) {
    let bars: Vec<Bar> = days
        .iter()
        .map(|bucket| {
            let color = if bucket.minutes >= STREAK_THRESHOLD_MINUTES {
                palette.rest
            } else {
                palette.muted
            };
            Bar::default()
                .value(u64::from(bucket.minutes))
                .label(Line::from(format!("{:02}", bucket.date.day())))
                .text_value(String::new())
                .style(Style::default().fg(color))
        })
        .collect();

    let minutes: Vec<u32> = days.iter().map(|b| b.minutes).collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Last {} days ", days.len())),
        )
        .bar_width(2)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .max(u64::from(max_of(&minutes, STREAK_THRESHOLD_MINUTES)));

    frame.render_widget(chart, area);
}

use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;
use crate::models::{SessionRecord, Topic};
use crate::stats::{TopicTotals, format_hours, topic_totals, weekly_goal_progress};
use crate::ui::{self, Palette};

/// Sessions listed under "Recent"
const RECENT_SESSIONS: usize = 12;

/// Render the topics view
pub fn render_topics(frame: &mut Frame, area: Rect, app: &mut App) {
    let palette = ui::paint_background(frame, area, app);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Min(1),    // Lists
        Constraint::Length(2), // Controls
        Constraint::Length(1), // Footer
    ])
    .split(area);

    let title = Line::from("Topics").bold().fg(palette.accent).centered();
    frame.render_widget(
        Paragraph::new(title).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    let columns = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let today = app.today();
    let totals = topic_totals(app.log.records(), &app.topics, today);
    let selected = app.engine.selected_topic();

    let items: Vec<ListItem> = if app.topics.is_empty() {
        vec![ListItem::new(
            Line::from("No topics yet. Press [n] to add one.").fg(palette.muted),
        )]
    } else {
        app.topics
            .iter()
            .zip(&totals)
            .map(|(topic, totals)| topic_item(topic, totals, selected == Some(topic.id), &palette))
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Topics "))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(palette.muted),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, columns[0], &mut app.topic_list);

    let recent = recent_items(app.log.records(), &app.topics, today, &palette);
    frame.render_widget(
        List::new(recent).block(Block::default().borders(Borders::ALL).title(" Recent ")),
        columns[1],
    );

    let controls = "[j/k] Navigate  [Enter] Use for timer  [n] New  [e] Edit  [d] Delete";
    frame.render_widget(
        Paragraph::new(controls)
            .centered()
            .fg(palette.muted)
            .block(Block::default().borders(Borders::TOP)),
        chunks[2],
    );

    ui::render_footer(
        frame,
        chunks[3],
        app,
        "[1] Timer  [2] Topics  [3] Dashboard  [c] Settings  [q] Quit",
    );
}

fn topic_item(
    topic: &Topic,
    totals: &TopicTotals,
    in_use: bool,
    palette: &Palette,
) -> ListItem<'static> {
    let color = topic.display_color();
    let mut spans = vec![
        Span::styled("■ ", Style::default().fg(color)),
        Span::styled(format!("{:<16}", topic.name), Style::default().fg(color).bold()),
        Span::raw(format!(
            " wk {:>6}  mo {:>6}  all {:>6}",
            format_hours(totals.weekly),
            format_hours(totals.monthly),
            format_hours(totals.total)
        )),
    ];

    if let Some(progress) = weekly_goal_progress(topic, totals.weekly) {
        let goal_color = if progress >= 1.0 {
            palette.rest
        } else {
            palette.muted
        };
        spans.push(Span::styled(
            format!("  goal {:.0}%", progress * 100.0),
            Style::default().fg(goal_color),
        ));
    }

    if in_use {
        spans.push(Span::styled("  (timer)", Style::default().fg(palette.accent)));
    }

    ListItem::new(Line::from(spans))
}

/// Most recent sessions first; deleted topics show as "(deleted)"
fn recent_items(
    log: &[SessionRecord],
    topics: &[Topic],
    today: NaiveDate,
    palette: &Palette,
) -> Vec<ListItem<'static>> {
    if log.is_empty() {
        return vec![ListItem::new(
            Line::from("No sessions yet").fg(palette.muted),
        )];
    }

    log.iter()
        .rev()
        .take(RECENT_SESSIONS)
        .map(|record| {
            let topic = topics.iter().find(|t| t.id == record.topic_id);
            let (name, color) = match topic {
                Some(t) => (t.name.clone(), t.display_color()),
                None => ("(deleted)".to_string(), palette.muted),
            };
            let day = if record.date == today {
                "Today".to_string()
            } else if today.pred_opt() == Some(record.date) {
                "Yesterday".to_string()
            } else {
                record.date.format("%b %d").to_string()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", day), Style::default().fg(palette.muted)),
                Span::styled(name, Style::default().fg(color)),
                Span::raw("  "),
                Span::raw(record.format_duration()),
            ]))
        })
        .collect()
}

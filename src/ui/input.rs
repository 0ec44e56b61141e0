use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, TopicField};
use crate::config::TOPIC_COLORS;
use crate::models::parse_hex_color;
use crate::ui;

/// Render the new/edit topic modal as an overlay
pub fn render_topic_modal(frame: &mut Frame, area: Rect, app: &App) {
    let modal_area = ui::modal_area(frame, area, 50, 13);
    let form = &app.topic_form;

    let title = if form.editing.is_some() {
        " Edit Topic "
    } else {
        " New Topic "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Name field
        Constraint::Length(2), // Color selector
        Constraint::Length(3), // Goal field
        Constraint::Length(2), // Controls
    ])
    .split(inner);

    // Name field, read-only when editing
    let name_active = form.field == TopicField::Name && form.editing.is_none();
    let name_text = if name_active {
        format!("{}_", form.name)
    } else {
        form.name.clone()
    };
    let name_block = Block::default()
        .title("Name")
        .borders(Borders::ALL)
        .border_style(field_style(name_active));
    frame.render_widget(Paragraph::new(name_text).block(name_block), chunks[0]);

    // Color selector
    let color_hex = TOPIC_COLORS[form.color_index % TOPIC_COLORS.len()];
    let color_active = form.field == TopicField::Color;
    let color_line = Line::from(vec![
        Span::styled("Color: ", field_style(color_active)),
        Span::styled("< ", Style::default().dark_gray()),
        Span::styled("■■■ ", Style::default().fg(parse_hex_color(color_hex))),
        Span::styled(color_hex, field_style(color_active)),
        Span::styled(" >", Style::default().dark_gray()),
    ]);
    frame.render_widget(Paragraph::new(color_line).centered(), chunks[1]);

    // Weekly goal
    let goal_active = form.field == TopicField::Goal;
    let goal_text = if goal_active {
        format!("{}_", form.goal)
    } else {
        form.goal.clone()
    };
    let goal_block = Block::default()
        .title("Weekly goal in hours (optional)")
        .borders(Borders::ALL)
        .border_style(field_style(goal_active));
    frame.render_widget(Paragraph::new(goal_text).block(goal_block), chunks[2]);

    // Controls
    let controls = Line::from(vec![
        Span::styled("[Enter]", Style::default().bold()),
        Span::raw(" Save   "),
        Span::styled("[Tab]", Style::default().bold()),
        Span::raw(" Next Field   "),
        Span::styled("[Esc]", Style::default().bold()),
        Span::raw(" Cancel"),
    ]);
    frame.render_widget(Paragraph::new(controls).centered().dark_gray(), chunks[3]);
}

/// Render the import path prompt
pub fn render_import_modal(frame: &mut Frame, area: Rect, app: &App) {
    let modal_area = ui::modal_area(frame, area, 60, 8);

    let block = Block::default()
        .title(" Import ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Path field
        Constraint::Length(1), // Warning
        Constraint::Length(2), // Controls
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(format!("{}_", app.import_path)).block(
            Block::default()
                .title("Path to export file")
                .borders(Borders::ALL)
                .border_style(field_style(true)),
        ),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new("Replaces all topics, history and settings")
            .centered()
            .yellow(),
        chunks[1],
    );

    let controls = Line::from(vec![
        Span::styled("[Enter]", Style::default().bold()),
        Span::raw(" Import   "),
        Span::styled("[Esc]", Style::default().bold()),
        Span::raw(" Cancel"),
    ]);
    frame.render_widget(Paragraph::new(controls).centered().dark_gray(), chunks[2]);
}

/// Render the reset confirmation dialog
pub fn render_confirm_modal(frame: &mut Frame, area: Rect, app: &App) {
    let modal_area = ui::modal_area(frame, area, 46, 7);

    let block = Block::default()
        .title(" Reset data ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let text = vec![
        Line::from(format!(
            "Delete {} topics and {} sessions?",
            app.topics.len(),
            app.log.len()
        )),
        Line::from("Settings are kept.").dark_gray(),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().bold().red()),
            Span::raw(" Delete   "),
            Span::styled("[any key]", Style::default().bold()),
            Span::raw(" Cancel"),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(text).centered().wrap(Wrap { trim: true }),
        inner,
    );
}

fn field_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

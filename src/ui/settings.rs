use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, SettingsField};
use crate::config::find_sound;
use crate::models::Settings;
use crate::ui;

const ROWS: [(SettingsField, &str, &str); 7] = [
    (SettingsField::FocusMinutes, "Focus length:", "min"),
    (SettingsField::BreakMinutes, "Break length:", "min"),
    (SettingsField::AlarmSeconds, "Alarm duration:", "s"),
    (SettingsField::InfiniteAlarm, "Ring until stopped:", ""),
    (SettingsField::DailyGoal, "Daily goal:", "h"),
    (SettingsField::Sound, "Alarm sound:", ""),
    (SettingsField::Theme, "Theme:", ""),
];

/// Render the settings modal as an overlay
pub fn render_settings_modal(frame: &mut Frame, area: Rect, app: &App) {
    let modal_area = ui::modal_area(frame, area, 48, 13);

    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::vertical([
        Constraint::Length(ROWS.len() as u16), // Fields
        Constraint::Min(1),                    // Spacer
        Constraint::Length(2),                 // Controls
    ])
    .split(inner);

    let form = &app.settings_form;
    let lines: Vec<Line> = ROWS
        .iter()
        .map(|&(field, label, unit)| {
            let is_selected = form.field == field;
            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };

            let value_text = if is_selected && !field.is_choice() {
                format!("{}_", form.editing_value)
            } else if is_selected {
                format!("< {} >", format_value(&form.editing, field))
            } else {
                format_value(&form.editing, field)
            };

            Line::from(vec![
                Span::styled(format!("{:<22}", label), style),
                Span::styled(value_text, style),
                Span::raw(format!(" {}", unit)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    // Controls
    let controls = Line::from(vec![
        Span::styled("[Enter]", Style::default().bold()),
        Span::raw(" Save  "),
        Span::styled("[↑↓]", Style::default().bold()),
        Span::raw(" Move  "),
        Span::styled("[←→]", Style::default().bold()),
        Span::raw(" Change  "),
        Span::styled("[Esc]", Style::default().bold()),
        Span::raw(" Cancel"),
    ]);
    frame.render_widget(Paragraph::new(controls).centered().dark_gray(), chunks[2]);
}

/// Display value of a field in the edited settings
fn format_value(settings: &Settings, field: SettingsField) -> String {
    match field {
        SettingsField::FocusMinutes => settings.focus_minutes.to_string(),
        SettingsField::BreakMinutes => settings.break_minutes.to_string(),
        SettingsField::AlarmSeconds => settings.alarm_duration.to_string(),
        SettingsField::InfiniteAlarm if settings.infinite_alarm => "on".to_string(),
        SettingsField::InfiniteAlarm => "off".to_string(),
        SettingsField::DailyGoal => format!("{:.1}", settings.daily_goal_hours),
        SettingsField::Sound => find_sound(&settings.selected_sound_id).label.to_string(),
        SettingsField::Theme => settings.theme.label().to_string(),
    }
}

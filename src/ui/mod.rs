mod dashboard;
mod input;
mod settings;
mod timer;
mod topics;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    widgets::{Block, Clear, Paragraph},
};

use crate::app::{App, NotificationLevel};
use crate::models::Theme;

pub use dashboard::render_dashboard;
pub use input::{render_confirm_modal, render_import_modal, render_topic_modal};
pub use settings::render_settings_modal;
pub use timer::render_timer;
pub use topics::render_topics;

/// Colors used by the views for the selected theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub base: Style,
    pub accent: Color,
    pub focus: Color,
    pub rest: Color,
    pub muted: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                base: Style::default(),
                accent: Color::Cyan,
                focus: Color::Red,
                rest: Color::Green,
                muted: Color::DarkGray,
            },
            Theme::Light => Self {
                base: Style::default().bg(Color::White).fg(Color::Black),
                accent: Color::Blue,
                focus: Color::LightRed,
                rest: Color::LightGreen,
                muted: Color::Gray,
            },
        }
    }
}

/// Fill the view background for the current theme and return its palette
pub fn paint_background(frame: &mut Frame, area: Rect, app: &App) -> Palette {
    let palette = Palette::for_theme(app.settings.theme);
    frame.render_widget(Block::default().style(palette.base), area);
    palette
}

/// Clear and return a centered area for a modal
pub fn modal_area(frame: &mut Frame, area: Rect, width: u16, height: u16) -> Rect {
    let modal_width = width.min(area.width.saturating_sub(4));
    let modal_height = height.min(area.height.saturating_sub(4));
    let modal_x = area.x + (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = area.y + (area.height.saturating_sub(modal_height)) / 2;

    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);
    frame.render_widget(Clear, modal_area);
    modal_area
}

/// Render the footer area with either a notification or navigation text
pub fn render_footer(frame: &mut Frame, area: Rect, app: &App, nav_text: &str) {
    if let Some(ref n) = app.notification {
        let color = match n.level {
            NotificationLevel::Info => Color::Green,
            NotificationLevel::Warning => Color::Yellow,
            NotificationLevel::Error => Color::Red,
        };
        frame.render_widget(
            Paragraph::new(n.message.as_str())
                .centered()
                .style(Style::default().fg(color).bold()),
            area,
        );
    } else {
        let muted = Palette::for_theme(app.settings.theme).muted;
        frame.render_widget(Paragraph::new(nav_text).centered().fg(muted), area);
    }
}

/// Proportion of a bar filled by `value` against `max`
pub fn bar_ratio(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0)
}

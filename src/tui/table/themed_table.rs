use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct TableColors {
    pub header_fg: Color,
    pub header_bg: Color,
    pub row_fg: Color,
    /// Text colour while a fetch is in flight.
    pub loading_fg: Color,
    pub normal_row_color: Color,
    pub alt_row_color: Color,
    pub selected_row_style: Style,
    pub active_row_style: Style,
    pub focused_header_style: Style,
    pub enabled_control: Color,
    pub disabled_control: Color,
    pub footer_border_color: Color,
    pub error_fg: Color,
}

impl Default for TableColors {
    fn default() -> Self {
        Self {
            header_fg: Color::White,
            header_bg: Color::Blue,
            row_fg: Color::White,
            loading_fg: Color::Gray,
            normal_row_color: Color::Reset,
            alt_row_color: Color::Rgb(30, 30, 40),
            selected_row_style: Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::Cyan),
            active_row_style: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            focused_header_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            enabled_control: Color::Gray,
            disabled_control: Color::DarkGray,
            footer_border_color: Color::Blue,
            error_fg: Color::Red,
        }
    }
}

impl TableColors {
    /// Applies the configured text colour; unknown names keep the default.
    pub fn with_text_color(mut self, text_color: Option<&str>) -> Self {
        if let Some(name) = text_color {
            match Color::from_str(name) {
                Ok(color) => self.row_fg = color,
                Err(_) => log::warn!("⚠️ Unknown text colour '{name}', keeping default"),
            }
        }
        self
    }

    pub fn control(&self, enabled: bool) -> Style {
        Style::default().fg(if enabled {
            self.enabled_control
        } else {
            self.disabled_control
        })
    }
}

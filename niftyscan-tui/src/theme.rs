//! Colour tokens for the niftyscan dashboard.
//!
//! Neon accents on a dark terminal: cyan for focus, green for the CALL side,
//! pink for the PUT side, orange for warnings.

use ratatui::style::{Color, Modifier, Style};

use niftyscan_core::domain::Side;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Theme {
    pub const fn neon() -> Self {
        Self {
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
        }
    }

    pub fn side_color(&self, side: Side) -> Color {
        match side {
            Side::Call => self.positive,
            Side::Put => self.negative,
        }
    }

    /// Accent for narrow bands, muted when the width is missing.
    pub fn band_width_color(&self, width: Option<f64>) -> Color {
        match width {
            Some(w) if w < 10.0 => self.accent,
            Some(w) if w < 25.0 => self.text_primary,
            Some(_) => self.neutral,
            None => self.muted,
        }
    }
}

const THEME: Theme = Theme::neon();

pub fn accent() -> Style {
    Style::default().fg(THEME.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(THEME.muted)
}

pub fn warning() -> Style {
    Style::default().fg(THEME.warning)
}

pub fn negative() -> Style {
    Style::default().fg(THEME.negative)
}

pub fn side(side: Side) -> Style {
    Style::default()
        .fg(THEME.side_color(side))
        .add_modifier(Modifier::BOLD)
}

pub fn band_width(width: Option<f64>) -> Style {
    Style::default().fg(THEME.band_width_color(width))
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn selected_row() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

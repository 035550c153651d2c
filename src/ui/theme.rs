use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub factor: String,
    pub factor_bg: String,
    pub cell_empty: String,
    pub cell_answer: String,
    pub cell_cursor_bg: String,
    pub cell_cursor_fg: String,
    pub correct: String,
    pub correct_bg: String,
    pub incorrect: String,
    pub incorrect_bg: String,
    pub accent: String,
    pub muted: String,
    pub border: String,
    pub border_focused: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub warning: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // Try user themes dir
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("timestable")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                match toml::from_str::<Theme>(&content) {
                    Ok(theme) => return Some(theme),
                    Err(e) => log::warn!("theme {} is invalid: {e}", user_theme_path.display()),
                }
            }
        }

        // Try bundled themes
        let filename = format!("{name}.toml");
        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("catppuccin-mocha").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            factor: "#f9e2af".to_string(),
            factor_bg: "#313244".to_string(),
            cell_empty: "#585b70".to_string(),
            cell_answer: "#cdd6f4".to_string(),
            cell_cursor_bg: "#f5e0dc".to_string(),
            cell_cursor_fg: "#1e1e2e".to_string(),
            correct: "#1e1e2e".to_string(),
            correct_bg: "#a6e3a1".to_string(),
            incorrect: "#1e1e2e".to_string(),
            incorrect_bg: "#f38ba8".to_string(),
            accent: "#89b4fa".to_string(),
            muted: "#6c7086".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            bar_filled: "#89b4fa".to_string(),
            bar_empty: "#313244".to_string(),
            warning: "#f9e2af".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn factor(&self) -> Color { Self::parse_color(&self.factor) }
    pub fn factor_bg(&self) -> Color { Self::parse_color(&self.factor_bg) }
    pub fn cell_empty(&self) -> Color { Self::parse_color(&self.cell_empty) }
    pub fn cell_answer(&self) -> Color { Self::parse_color(&self.cell_answer) }
    pub fn cell_cursor_bg(&self) -> Color { Self::parse_color(&self.cell_cursor_bg) }
    pub fn cell_cursor_fg(&self) -> Color { Self::parse_color(&self.cell_cursor_fg) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn correct_bg(&self) -> Color { Self::parse_color(&self.correct_bg) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn incorrect_bg(&self) -> Color { Self::parse_color(&self.incorrect_bg) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
}

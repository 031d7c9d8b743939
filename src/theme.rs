//! Color themes
//!
//! Twelve light themes that only change the accent color, and four dark
//! themes that also paint the background.

use ratatui::style::Color;

pub const DEFAULT_THEME: &str = "wine";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub accent: Color,
    /// Background for dark themes
    pub background: Option<Color>,
}

const fn light(id: &'static str, name: &'static str, r: u8, g: u8, b: u8) -> Theme {
    Theme {
        id,
        name,
        accent: Color::Rgb(r, g, b),
        background: None,
    }
}

const fn dark(id: &'static str, name: &'static str, accent: (u8, u8, u8), bg: (u8, u8, u8)) -> Theme {
    Theme {
        id,
        name,
        accent: Color::Rgb(accent.0, accent.1, accent.2),
        background: Some(Color::Rgb(bg.0, bg.1, bg.2)),
    }
}

pub const THEMES: &[Theme] = &[
    light("sage", "Sage", 0x56, 0x7d, 0x56),
    light("graphite", "Graphite", 0x3f, 0x3f, 0x46),
    light("ocean", "Ocean", 0x3b, 0x82, 0xf6),
    light("rose", "Rose", 0xf4, 0x3f, 0x5e),
    light("midnight", "Midnight", 0x63, 0x66, 0xf1),
    light("ember", "Ember", 0xf9, 0x73, 0x16),
    light("teal", "Teal", 0x14, 0xb8, 0xa6),
    light("wine", "Wine", 0xbe, 0x18, 0x5d),
    light("forest", "Forest", 0x05, 0x96, 0x69),
    light("copper", "Copper", 0xb4, 0x53, 0x09),
    light("violet", "Violet", 0xa8, 0x55, 0xf7),
    light("slate", "Slate", 0x64, 0x74, 0x8b),
    dark("dark", "Dark", (0x0a, 0x84, 0xff), (0x1c, 0x1c, 0x1e)),
    dark("dark-ocean", "Dark Ocean", (0x60, 0xa5, 0xfa), (0x14, 0x1c, 0x2a)),
    dark("dark-forest", "Dark Emerald", (0x34, 0xd3, 0x99), (0x16, 0x20, 0x1c)),
    dark("dark-rose", "Dark Warm", (0xfb, 0x92, 0x3c), (0x20, 0x1c, 0x1a)),
];

impl Theme {
    /// Look up a theme; unknown ids get the default theme
    pub fn by_id(id: &str) -> Theme {
        Self::find(id).unwrap_or_else(Self::default_theme)
    }

    pub fn find(id: &str) -> Option<Theme> {
        THEMES.iter().find(|t| t.id == id).copied()
    }

    fn default_theme() -> Theme {
        THEMES
            .iter()
            .find(|t| t.id == DEFAULT_THEME)
            .copied()
            .unwrap_or(THEMES[0])
    }

    pub fn is_dark(&self) -> bool {
        self.background.is_some()
    }

    /// Next theme in catalog order, wrapping around
    pub fn next(&self) -> Theme {
        let index = THEMES.iter().position(|t| t.id == self.id).unwrap_or(0);
        THEMES[(index + 1) % THEMES.len()]
    }

    pub fn palette(&self) -> Palette {
        match self.background {
            Some(bg) => Palette {
                accent: self.accent,
                background: bg,
                text: Color::Rgb(0xf2, 0xf2, 0xf2),
                muted: Color::Rgb(0x9a, 0x9a, 0x9e),
                error: Color::Rgb(0xff, 0x6b, 0x6b),
                success: Color::Rgb(0x4a, 0xde, 0x80),
            },
            None => Palette {
                accent: self.accent,
                background: Color::Reset,
                text: Color::Reset,
                muted: Color::DarkGray,
                error: Color::Red,
                success: Color::Green,
            },
        }
    }
}

/// Resolved colors used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub error: Color,
    pub success: Color,
}

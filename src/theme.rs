//! Syntax colour themes
//!
//! Provides YAML-based themes with compile-time embedded built-ins and
//! user-defined themes from the config directory.
//!
//! Theme loading priority:
//! 1. User config: `~/.config/ftml-highlight/themes/{id}.yaml`
//! 2. Embedded: Built-in themes compiled into binary

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::syntax::highlights::StyleCategory;
use crate::syntax::style::{RenderStyle, StyleResolver, Underline};

// Embed theme YAML files at compile time
pub const DEFAULT_DARK_YAML: &str = include_str!("../themes/dark.yaml");
pub const DEFAULT_LIGHT_YAML: &str = include_str!("../themes/light.yaml");

/// Alpha of the background wash under an error span
pub const ERROR_BACKGROUND_ALPHA: u8 = 20;

/// A built-in theme entry
pub struct BuiltinTheme {
    /// Stable identifier for config (e.g. "default-dark")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "default-dark",
        yaml: DEFAULT_DARK_YAML,
    },
    BuiltinTheme {
        id: "default-light",
        yaml: DEFAULT_LIGHT_YAML,
    },
];

/// Load a theme from a YAML file
pub fn from_file(path: &Path) -> Result<Theme, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Theme::from_yaml(&content)
}

/// Load theme by id with priority: user themes dir, then builtin
pub fn load_theme(id: &str) -> Result<Theme, ConfigError> {
    load_theme_from(crate::config_paths::themes_dir().as_deref(), id)
}

/// Same as [`load_theme`] with an explicit user themes directory
pub fn load_theme_from(user_dir: Option<&Path>, id: &str) -> Result<Theme, ConfigError> {
    if let Some(user_dir) = user_dir {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            tracing::info!("Loading user theme from {}", user_path.display());
            return from_file(&user_path);
        }
    }

    tracing::debug!("Loading builtin theme: {}", id);
    Theme::from_builtin(id)
}

/// Load a theme, falling back to the built-in default on any failure
pub fn load_theme_or_default(id: &str) -> Theme {
    match load_theme(id) {
        Ok(theme) => theme,
        Err(e) => {
            tracing::warn!("Failed to load theme {:?}: {}, using default", id, e);
            Theme::default()
        }
    }
}

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Return a new color with the specified alpha value
    pub const fn with_alpha(&self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let hex = s.trim_start_matches('#');
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| ConfigError::Color(s.to_string()))
        };
        match hex.len() {
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => Err(ConfigError::Color(s.to_string())),
        }
    }

    /// Composite this color over an opaque `base`
    pub fn blend_over(&self, base: Color) -> Color {
        let a = self.a as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a)) / 255) as u8;
        Color::rgb(mix(self.r, base.r), mix(self.g, base.g), mix(self.b, base.b))
    }

    /// `#rrggbb` without alpha
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Raw theme data as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub editor: EditorThemeData,
    pub syntax: SyntaxThemeData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorThemeData {
    pub background: String,
    pub foreground: String,
}

/// Syntax palette roles (raw strings from YAML)
#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxThemeData {
    #[serde(alias = "keyword")]
    pub key: String,
    pub operator: String,
    pub string: String,
    pub number: String,
    pub boolean: String,
    pub null: String,
    pub symbol: String,
    pub comment: String,
    #[serde(rename = "docComment")]
    pub doc_comment: String,
    pub error: String,
}

/// Resolved syntax palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTheme {
    pub key: Color,
    pub operator: Color,
    pub string: Color,
    pub number: Color,
    pub boolean: Color,
    pub null: Color,
    pub symbol: Color,
    pub comment: Color,
    pub doc_comment: Color,
    pub error: Color,
}

impl SyntaxTheme {
    pub fn color(&self, category: StyleCategory) -> Color {
        match category {
            StyleCategory::Key => self.key,
            StyleCategory::Operator => self.operator,
            StyleCategory::String => self.string,
            StyleCategory::Number => self.number,
            StyleCategory::Boolean => self.boolean,
            StyleCategory::Null => self.null,
            StyleCategory::Symbol => self.symbol,
            StyleCategory::Comment => self.comment,
            StyleCategory::DocComment => self.doc_comment,
            StyleCategory::Error => self.error,
        }
    }
}

/// Resolved theme with parsed colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    pub foreground: Color,
    pub syntax: SyntaxTheme,
}

impl Theme {
    /// Load theme from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let data: ThemeData = serde_yaml::from_str(yaml)?;
        Self::from_data(data)
    }

    /// Load a built-in theme by id
    pub fn from_builtin(id: &str) -> Result<Self, ConfigError> {
        let entry = BUILTIN_THEMES
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ConfigError::UnknownTheme(id.to_string()))?;
        Theme::from_yaml(entry.yaml)
    }

    /// Convert raw theme data to resolved theme
    pub fn from_data(data: ThemeData) -> Result<Self, ConfigError> {
        let s = &data.syntax;
        Ok(Theme {
            name: data.name,
            background: Color::from_hex(&data.editor.background)?,
            foreground: Color::from_hex(&data.editor.foreground)?,
            syntax: SyntaxTheme {
                key: Color::from_hex(&s.key)?,
                operator: Color::from_hex(&s.operator)?,
                string: Color::from_hex(&s.string)?,
                number: Color::from_hex(&s.number)?,
                boolean: Color::from_hex(&s.boolean)?,
                null: Color::from_hex(&s.null)?,
                symbol: Color::from_hex(&s.symbol)?,
                comment: Color::from_hex(&s.comment)?,
                doc_comment: Color::from_hex(&s.doc_comment)?,
                error: Color::from_hex(&s.error)?,
            },
        })
    }

    /// Default dark theme (YAML-backed with Rust fallback)
    pub fn default_dark() -> Self {
        match Theme::from_yaml(DEFAULT_DARK_YAML) {
            Ok(theme) => theme,
            Err(_) => Theme {
                name: "Default Dark".to_string(),
                background: Color::rgb(0x1E, 0x1E, 0x1E),
                foreground: Color::rgb(0xD4, 0xD4, 0xD4),
                syntax: SyntaxTheme {
                    key: Color::rgb(0x56, 0x9C, 0xD6),
                    operator: Color::rgb(0xD4, 0xD4, 0xD4),
                    string: Color::rgb(0xCE, 0x91, 0x78),
                    number: Color::rgb(0xB5, 0xCE, 0xA8),
                    boolean: Color::rgb(0x56, 0x9C, 0xD6),
                    null: Color::rgb(0x56, 0x9C, 0xD6),
                    symbol: Color::rgb(0xD4, 0xD4, 0xD4),
                    comment: Color::rgb(0x6A, 0x99, 0x55),
                    doc_comment: Color::rgb(0x5E, 0x9D, 0xD6),
                    error: Color::rgb(0xF1, 0x4C, 0x4C),
                },
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_dark()
    }
}

impl StyleResolver for Theme {
    fn resolve(&self, category: StyleCategory) -> RenderStyle {
        let color = self.syntax.color(category);
        match category {
            StyleCategory::Key
            | StyleCategory::Operator
            | StyleCategory::Boolean
            | StyleCategory::Null => RenderStyle::fg(color).bold(),
            StyleCategory::Comment | StyleCategory::DocComment => RenderStyle::fg(color).italic(),
            StyleCategory::Error => RenderStyle {
                foreground: None,
                background: Some(color.with_alpha(ERROR_BACKGROUND_ALPHA)),
                bold: false,
                italic: false,
                underline: Underline::Wave(color),
            },
            StyleCategory::String | StyleCategory::Number | StyleCategory::Symbol => {
                RenderStyle::fg(color)
            }
        }
    }
}

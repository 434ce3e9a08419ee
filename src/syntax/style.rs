//! Style lookup injected into the engine

use serde::Serialize;

use super::highlights::StyleCategory;
use crate::theme::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Underline {
    #[default]
    None,
    /// Squiggly underline in the given colour
    Wave(Color),
}

/// How a category should be painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RenderStyle {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
}

impl RenderStyle {
    pub fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Maps a style category to concrete rendering attributes
pub trait StyleResolver {
    fn resolve(&self, category: StyleCategory) -> RenderStyle;
}

/// Resolver that paints nothing; useful for headless hosts
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyles;

impl StyleResolver for PlainStyles {
    fn resolve(&self, _category: StyleCategory) -> RenderStyle {
        RenderStyle::default()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_BACKGROUND_OPACITY: u8 = 100;
pub const MAX_STROKE_WIDTH: u8 = 10;
pub const MAX_POSITION_BOTTOM: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitlePreset {
    #[default]
    Classic,
    Modern,
    Outline,
    /// Style fields no longer match any named preset
    Custom,
}

impl SubtitlePreset {
    pub const NAMED: [SubtitlePreset; 3] = [
        SubtitlePreset::Classic,
        SubtitlePreset::Modern,
        SubtitlePreset::Outline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Outline => "outline",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "modern" => Some(Self::Modern),
            "outline" => Some(Self::Outline),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Classic => "White text on a translucent black box",
            Self::Modern => "Bold sans-serif text without background",
            Self::Outline => "White text with a black outline",
            Self::Custom => "Individually edited style fields",
        }
    }

    /// Field values defined by a named preset. `Custom` defines none.
    pub fn style(&self) -> Option<PresetStyle> {
        let style = match self {
            Self::Classic => PresetStyle {
                font_family: "Noto Sans SC",
                text_color: "#ffffff",
                background_color: "#000000",
                background_opacity: 60,
                stroke_color: "#000000",
                stroke_width: 0,
                is_bold: false,
            },
            Self::Modern => PresetStyle {
                font_family: "Noto Sans SC",
                text_color: "#ffffff",
                background_color: "#000000",
                background_opacity: 0,
                stroke_color: "#000000",
                stroke_width: 0,
                is_bold: true,
            },
            Self::Outline => PresetStyle {
                font_family: "Noto Serif SC",
                text_color: "#ffffff",
                background_color: "#000000",
                background_opacity: 0,
                stroke_color: "#000000",
                stroke_width: 2,
                is_bold: false,
            },
            Self::Custom => return None,
        };
        Some(style)
    }
}

impl fmt::Display for SubtitlePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The bundle of fields a named preset overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetStyle {
    pub font_family: &'static str,
    pub text_color: &'static str,
    pub background_color: &'static str,
    pub background_opacity: u8,
    pub stroke_color: &'static str,
    pub stroke_width: u8,
    pub is_bold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    pub show: bool,
    pub preset: SubtitlePreset,
    pub font_family: String,
    pub font_size: u32,
    pub text_color: String,
    pub background_color: String,
    /// 0 to 100
    pub background_opacity: u8,
    pub stroke_color: String,
    /// 0 to 10
    pub stroke_width: u8,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    /// Distance from the bottom edge, percent of frame height (0 to 50)
    pub position_bottom: u8,
    pub line_spacing: f32,
    pub letter_spacing: f32,
    pub alignment: Alignment,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            show: true,
            preset: SubtitlePreset::Classic,
            font_family: "Noto Sans SC".to_string(),
            font_size: 10,
            text_color: "#ffffff".to_string(),
            background_color: "#000000".to_string(),
            background_opacity: 60,
            stroke_color: "#000000".to_string(),
            stroke_width: 0,
            is_bold: false,
            is_italic: false,
            is_underline: false,
            position_bottom: 5,
            line_spacing: 0.0,
            letter_spacing: 0.0,
            alignment: Alignment::Center,
        }
    }
}

/// A single edit of [`SubtitleSettings`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubtitleUpdate {
    Show(bool),
    Preset(SubtitlePreset),
    FontFamily(String),
    FontSize(u32),
    TextColor(String),
    BackgroundColor(String),
    BackgroundOpacity(u8),
    StrokeColor(String),
    StrokeWidth(u8),
    Bold(bool),
    Italic(bool),
    Underline(bool),
    PositionBottom(u8),
    LineSpacing(f32),
    LetterSpacing(f32),
    Alignment(Alignment),
}

impl SubtitleUpdate {
    /// Style edits drop the active preset to `Custom`.
    pub fn is_style_edit(&self) -> bool {
        !matches!(self, Self::Show(_) | Self::Preset(_))
    }
}

impl SubtitleSettings {
    /// Return a copy with `update` applied.
    pub fn apply(&self, update: SubtitleUpdate) -> Self {
        let mut next = self.clone();
        if update.is_style_edit() {
            next.preset = SubtitlePreset::Custom;
        }

        match update {
            SubtitleUpdate::Show(show) => next.show = show,
            SubtitleUpdate::Preset(preset) => {
                next.preset = preset;
                if let Some(style) = preset.style() {
                    next.font_family = style.font_family.to_string();
                    next.text_color = style.text_color.to_string();
                    next.background_color = style.background_color.to_string();
                    next.background_opacity = style.background_opacity;
                    next.stroke_color = style.stroke_color.to_string();
                    next.stroke_width = style.stroke_width;
                    next.is_bold = style.is_bold;
                }
            }
            SubtitleUpdate::FontFamily(family) => next.font_family = family,
            SubtitleUpdate::FontSize(size) => next.font_size = size,
            SubtitleUpdate::TextColor(color) => next.text_color = color,
            SubtitleUpdate::BackgroundColor(color) => next.background_color = color,
            SubtitleUpdate::BackgroundOpacity(opacity) => {
                next.background_opacity = opacity.min(MAX_BACKGROUND_OPACITY)
            }
            SubtitleUpdate::StrokeColor(color) => next.stroke_color = color,
            SubtitleUpdate::StrokeWidth(width) => next.stroke_width = width.min(MAX_STROKE_WIDTH),
            SubtitleUpdate::Bold(bold) => next.is_bold = bold,
            SubtitleUpdate::Italic(italic) => next.is_italic = italic,
            SubtitleUpdate::Underline(underline) => next.is_underline = underline,
            SubtitleUpdate::PositionBottom(percent) => {
                next.position_bottom = percent.min(MAX_POSITION_BOTTOM)
            }
            SubtitleUpdate::LineSpacing(spacing) => next.line_spacing = spacing,
            SubtitleUpdate::LetterSpacing(spacing) => next.letter_spacing = spacing,
            SubtitleUpdate::Alignment(alignment) => next.alignment = alignment,
        }
        next
    }

    /// Whether the style fields match the active named preset.
    pub fn matches_preset(&self) -> bool {
        match self.preset.style() {
            Some(style) => {
                self.font_family == style.font_family
                    && self.text_color == style.text_color
                    && self.background_color == style.background_color
                    && self.background_opacity == style.background_opacity
                    && self.stroke_color == style.stroke_color
                    && self.stroke_width == style.stroke_width
                    && self.is_bold == style.is_bold
            }
            None => false,
        }
    }
}

//! The format catalogue: every output asset logocraft knows how to produce.
//!
//! | Identifier | Size | Background | Transparency |
//! |---|---|---|---|
//! | `APPICON` | 1024×1024 | transparent | yes |
//! | `LOGO` | 1024×1024 | transparent | yes |
//! | `LOGO_WIDE` | 1024×500 | transparent | yes |
//! | `FEATURE_GRAPHIC` | 1024×500 | opaque white | no |
//! | `DEFAULT` | 1242×1902 | opaque white | no |
//! | `DEFAULT_LG` | 1242×2208 | opaque white | no |
//! | `DEFAULT_XL` | 1242×2688 | opaque white | no |
//! | `PUSH` | 96×96 | white, alpha 0 | yes (stylized glyph) |
//!
//! The catalogue is built once ([`FormatCatalog::standard`]) and only ever
//! handed out by shared reference.

use crate::imaging::Quality;
use image::Rgba;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Closed set of output format identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatId {
    AppIcon,
    Logo,
    LogoWide,
    FeatureGraphic,
    Default,
    DefaultLg,
    DefaultXl,
    Push,
}

impl FormatId {
    /// Catalogue order. Batches are processed in this order.
    pub const ALL: [FormatId; 8] = [
        FormatId::AppIcon,
        FormatId::Logo,
        FormatId::LogoWide,
        FormatId::FeatureGraphic,
        FormatId::Default,
        FormatId::DefaultLg,
        FormatId::DefaultXl,
        FormatId::Push,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatId::AppIcon => "APPICON",
            FormatId::Logo => "LOGO",
            FormatId::LogoWide => "LOGO_WIDE",
            FormatId::FeatureGraphic => "FEATURE_GRAPHIC",
            FormatId::Default => "DEFAULT",
            FormatId::DefaultLg => "DEFAULT_LG",
            FormatId::DefaultXl => "DEFAULT_XL",
            FormatId::Push => "PUSH",
        }
    }

    /// Output file name inside the caller's output directory.
    pub fn file_name(self) -> String {
        format!("{}.PNG", self.as_str())
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown format identifier: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatId {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FormatId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Target size, background and encoding settings for one output format.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    pub id: FormatId,
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
    pub quality: Quality,
    pub supports_transparency: bool,
    pub description: &'static str,
}

impl FormatSpec {
    /// Channel count of the final encoded PNG.
    ///
    /// Formats with a see-through background or transparency support keep
    /// RGBA; everything else is flattened onto its opaque background.
    pub fn channels(&self) -> u8 {
        if self.background[3] < 255 || self.supports_transparency {
            4
        } else {
            3
        }
    }

    pub fn is_push(&self) -> bool {
        self.id == FormatId::Push
    }
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const WHITE_CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Immutable lookup table from [`FormatId`] to [`FormatSpec`].
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    specs: [FormatSpec; 8],
}

static STANDARD: LazyLock<FormatCatalog> = LazyLock::new(FormatCatalog::build_standard);

impl FormatCatalog {
    /// The process-wide standard catalogue.
    pub fn standard() -> &'static FormatCatalog {
        &STANDARD
    }

    fn build_standard() -> Self {
        let spec = |id, width, height, background, supports_transparency, description| {
            FormatSpec {
                id,
                width,
                height,
                background,
                quality: Quality::new(95),
                supports_transparency,
                description,
            }
        };

        Self {
            specs: [
                spec(
                    FormatId::AppIcon,
                    1024,
                    1024,
                    TRANSPARENT,
                    true,
                    "Application icon with optional transparency",
                ),
                spec(
                    FormatId::Logo,
                    1024,
                    1024,
                    TRANSPARENT,
                    true,
                    "High-resolution square logo with transparency",
                ),
                spec(
                    FormatId::LogoWide,
                    1024,
                    500,
                    TRANSPARENT,
                    true,
                    "High-resolution wide logo with transparency",
                ),
                spec(
                    FormatId::FeatureGraphic,
                    1024,
                    500,
                    WHITE,
                    false,
                    "Feature graphic banner for store listings",
                ),
                spec(
                    FormatId::Default,
                    1242,
                    1902,
                    WHITE,
                    false,
                    "Standard splash screen",
                ),
                spec(
                    FormatId::DefaultLg,
                    1242,
                    2208,
                    WHITE,
                    false,
                    "Large splash screen for higher resolution devices",
                ),
                spec(
                    FormatId::DefaultXl,
                    1242,
                    2688,
                    WHITE,
                    false,
                    "Extra large splash screen for modern devices",
                ),
                spec(
                    FormatId::Push,
                    96,
                    96,
                    WHITE_CLEAR,
                    true,
                    "Notification icon glyph with transparency",
                ),
            ],
        }
    }

    pub fn get(&self, id: FormatId) -> &FormatSpec {
        // Entries are stored in `FormatId::ALL` order.
        &self.specs[id as usize]
    }

    /// Look up by identifier string (case-insensitive).
    pub fn lookup(&self, identifier: &str) -> Result<&FormatSpec, UnknownFormat> {
        identifier.parse::<FormatId>().map(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatSpec> {
        self.specs.iter()
    }
}

//! Gathering form input into the query parameters of a conversion request.

use std::ops::RangeInclusive;
use std::path::Path;

use crate::error::ClientError;

pub const DEFAULT_COLORS: u32 = 9;
pub const DEFAULT_MAX_SIZE: u32 = 1024;
pub const DEFAULT_THICKNESS: u32 = 2;
pub const DEFAULT_MIN_AREA: u32 = 80;
pub const DEFAULT_MERGE_AREA: u32 = 200;
pub const DEFAULT_OUTLINE_MODE: &str = "union";

/// Outline modes the service is known to accept. Other values are still sent.
pub const KNOWN_OUTLINE_MODES: &[&str] = &["labels", "union"];

const COLORS_RANGE: RangeInclusive<u32> = 2..=24;
const MAX_SIZE_RANGE: RangeInclusive<u32> = 128..=4096;
const THICKNESS_RANGE: RangeInclusive<u32> = 1..=10;
const MIN_AREA_RANGE: RangeInclusive<u32> = 1..=10_000;
const MERGE_AREA_RANGE: RangeInclusive<u32> = 1..=100_000;

/// Image file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new<N: Into<String>>(file_name: N, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for_name(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for_name(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Raw state of the conversion form at submit time. `None` means the field was left empty.
#[derive(Debug, Clone, Default)]
pub struct ConversionForm {
    pub file: Option<SourceImage>,
    pub colors: Option<u32>,
    pub max_size: Option<u32>,
    pub thickness: Option<u32>,
    pub min_area: Option<u32>,
    pub merge_area: Option<u32>,
    pub outline_mode: Option<String>,
    pub include_preview: bool,
}

impl ConversionForm {
    /// Applies the literal defaults to every empty field.
    pub fn to_request(&self) -> ConversionRequest {
        let outline_mode = self
            .outline_mode
            .as_deref()
            .map(str::trim)
            .filter(|mode| !mode.is_empty())
            .unwrap_or(DEFAULT_OUTLINE_MODE)
            .to_string();

        ConversionRequest {
            colors: self.colors.unwrap_or(DEFAULT_COLORS),
            max_size: self.max_size.unwrap_or(DEFAULT_MAX_SIZE),
            thickness: self.thickness.unwrap_or(DEFAULT_THICKNESS),
            min_area: self.min_area.unwrap_or(DEFAULT_MIN_AREA),
            merge_area: self.merge_area.unwrap_or(DEFAULT_MERGE_AREA),
            outline_mode,
            include_preview: self.include_preview,
            return_pdf: false,
        }
    }
}

/// Query parameters for one conversion. Built fresh on every submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub colors: u32,
    pub max_size: u32,
    pub thickness: u32,
    pub min_area: u32,
    pub merge_area: u32,
    pub outline_mode: String,
    pub include_preview: bool,
    pub return_pdf: bool,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        ConversionForm::default().to_request()
    }
}

impl ConversionRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("colors", self.colors.to_string()),
            ("max_size", self.max_size.to_string()),
            ("thickness", self.thickness.to_string()),
            ("min_area", self.min_area.to_string()),
            ("merge_area", self.merge_area.to_string()),
            ("outline_mode", self.outline_mode.clone()),
            ("include_preview", self.include_preview.to_string()),
            ("return_pdf", self.return_pdf.to_string()),
        ]
    }

    pub fn query_string(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Values the service is likely to reject. Never blocks the request.
    pub fn advisories(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let numeric = [
            ("colors", self.colors, COLORS_RANGE),
            ("max_size", self.max_size, MAX_SIZE_RANGE),
            ("thickness", self.thickness, THICKNESS_RANGE),
            ("min_area", self.min_area, MIN_AREA_RANGE),
            ("merge_area", self.merge_area, MERGE_AREA_RANGE),
        ];
        for (name, value, range) in numeric {
            if !range.contains(&value) {
                warnings.push(format!(
                    "{name}={value} is outside the accepted range {}..={}",
                    range.start(),
                    range.end()
                ));
            }
        }
        if !KNOWN_OUTLINE_MODES.contains(&self.outline_mode.as_str()) {
            warnings.push(format!(
                "outline_mode '{}' is not one of: {}",
                self.outline_mode,
                KNOWN_OUTLINE_MODES.join(", ")
            ));
        }
        warnings
    }
}

//! Status and metadata strings shown to the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::response::ImageMeta;

/// Language of the user-visible texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    pub fn in_progress(self) -> &'static str {
        match self {
            Locale::Fr => "En cours...",
            Locale::En => "In progress...",
        }
    }

    pub fn select_image(self) -> &'static str {
        match self {
            Locale::Fr => "Sélectionne une image.",
            Locale::En => "Select an image.",
        }
    }

    pub fn busy(self) -> &'static str {
        match self {
            Locale::Fr => "Une conversion est déjà en cours.",
            Locale::En => "A conversion is already in progress.",
        }
    }

    pub fn done(self) -> &'static str {
        match self {
            Locale::Fr => "Terminé",
            Locale::En => "Done",
        }
    }

    pub fn error(self, message: &str) -> String {
        match self {
            Locale::Fr => format!("Erreur: {message}"),
            Locale::En => format!("Error: {message}"),
        }
    }

    pub fn meta(self, meta: &ImageMeta) -> String {
        let mut line = match self {
            Locale::Fr => format!(
                "Taille: {}x{} • Couleurs: {}",
                meta.width, meta.height, meta.colors
            ),
            Locale::En => format!(
                "Size: {}x{} • Colors: {}",
                meta.width, meta.height, meta.colors
            ),
        };
        if let Some(regions) = meta.num_regions {
            match self {
                Locale::Fr => line.push_str(&format!(" • Régions: {regions}")),
                Locale::En => line.push_str(&format!(" • Regions: {regions}")),
            }
        }
        line
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" | "french" => Ok(Locale::Fr),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}' (expected fr or en)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(num_regions: Option<u32>) -> ImageMeta {
        ImageMeta {
            width: 640,
            height: 480,
            colors: 9,
            num_regions,
        }
    }

    #[test]
    fn meta_line_matches_page_format() {
        assert_eq!(Locale::Fr.meta(&meta(None)), "Taille: 640x480 • Couleurs: 9");
        assert_eq!(Locale::En.meta(&meta(None)), "Size: 640x480 • Colors: 9");
    }

    #[test]
    fn meta_line_mentions_regions_when_reported() {
        assert_eq!(
            Locale::En.meta(&meta(Some(42))),
            "Size: 640x480 • Colors: 9 • Regions: 42"
        );
    }

    #[test]
    fn error_status_prefixes_message() {
        assert_eq!(Locale::Fr.error("HTTP 500: boom"), "Erreur: HTTP 500: boom");
        assert_eq!(Locale::En.error("HTTP 500: boom"), "Error: HTTP 500: boom");
    }

    #[test]
    fn locale_parses_codes() {
        assert_eq!("FR".parse::<Locale>(), Ok(Locale::Fr));
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert!("de".parse::<Locale>().is_err());
    }
}

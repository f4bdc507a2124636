use serde::{Deserialize, Serialize};

/// Body returned by `POST /magic/convert` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub worksheet_png: String,
    #[serde(default)]
    pub preview_png: Option<String>,
    #[serde(default)]
    pub labels_png: Option<String>,
    pub meta: ImageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    pub colors: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_regions: Option<u32>,
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_artifacts_may_be_absent_or_null() {
        let absent: ConversionResponse = serde_json::from_str(
            r#"{"worksheet_png":"AA==","meta":{"width":2,"height":3,"colors":4}}"#,
        )
        .unwrap();
        assert!(absent.preview_png.is_none());
        assert!(absent.labels_png.is_none());
        assert_eq!(absent.meta.num_regions, None);

        let null: ConversionResponse = serde_json::from_str(
            r#"{"worksheet_png":"AA==","preview_png":null,"labels_png":null,
                "meta":{"width":2,"height":3,"colors":4,"num_regions":7}}"#,
        )
        .unwrap();
        assert!(null.preview_png.is_none());
        assert_eq!(null.meta.num_regions, Some(7));
    }

    #[test]
    fn worksheet_is_required() {
        let missing = serde_json::from_str::<ConversionResponse>(
            r#"{"meta":{"width":2,"height":3,"colors":4}}"#,
        );
        assert!(missing.is_err());
    }
}

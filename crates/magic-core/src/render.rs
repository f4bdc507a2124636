//! Turning a conversion response into display updates.

use std::sync::Arc;

use crate::artifact::{
    ArtifactKind, BlobStore, DownloadAction, ImageSource, PNG_MIME, decode_base64,
};
use crate::error::ClientError;
use crate::messages::Locale;
use crate::response::ConversionResponse;
use crate::targets::DisplayTargets;

/// A decoded artifact together with the download action for it.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub kind: ArtifactKind,
    pub source: ImageSource,
    pub download: DownloadAction,
}

impl RenderedArtifact {
    fn decode(kind: ArtifactKind, payload: &str, store: &BlobStore) -> Result<Self, ClientError> {
        let bytes = decode_base64(payload)?;
        Ok(Self {
            kind,
            source: ImageSource::new(PNG_MIME, bytes),
            download: DownloadAction::new(kind, Arc::from(payload), store.clone()),
        })
    }
}

/// Everything a successful response puts on screen.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub worksheet: RenderedArtifact,
    pub preview: Option<RenderedArtifact>,
    pub labels: Option<RenderedArtifact>,
    pub meta_text: String,
}

/// Decodes every present artifact. Nothing is displayed until all of them decoded.
///
/// An empty optional payload counts as absent.
pub fn render(
    response: &ConversionResponse,
    store: &BlobStore,
    locale: Locale,
) -> Result<Rendered, ClientError> {
    let worksheet =
        RenderedArtifact::decode(ArtifactKind::Worksheet, &response.worksheet_png, store)?;
    let preview = response
        .preview_png
        .as_deref()
        .filter(|payload| !payload.trim().is_empty())
        .map(|payload| RenderedArtifact::decode(ArtifactKind::Preview, payload, store))
        .transpose()?;
    let labels = response
        .labels_png
        .as_deref()
        .filter(|payload| !payload.trim().is_empty())
        .map(|payload| RenderedArtifact::decode(ArtifactKind::Labels, payload, store))
        .transpose()?;

    Ok(Rendered {
        worksheet,
        preview,
        labels,
        meta_text: locale.meta(&response.meta),
    })
}

impl Rendered {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&RenderedArtifact> {
        match kind {
            ArtifactKind::Worksheet => Some(&self.worksheet),
            ArtifactKind::Preview => self.preview.as_ref(),
            ArtifactKind::Labels => self.labels.as_ref(),
        }
    }

    pub fn apply<T: DisplayTargets + ?Sized>(self, targets: &mut T) {
        let Rendered {
            worksheet,
            preview,
            labels,
            meta_text,
        } = self;

        show(targets, ArtifactKind::Worksheet, Some(worksheet));
        show(targets, ArtifactKind::Preview, preview);
        show(targets, ArtifactKind::Labels, labels);

        targets.set_meta(&meta_text);
        targets.reveal_results();
    }
}

fn show<T: DisplayTargets + ?Sized>(
    targets: &mut T,
    kind: ArtifactKind,
    artifact: Option<RenderedArtifact>,
) {
    match artifact {
        Some(artifact) => {
            targets.set_image(kind, Some(artifact.source));
            targets.set_download(kind, Some(artifact.download));
        }
        None => {
            targets.set_image(kind, None);
            targets.set_download(kind, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    use super::*;
    use crate::response::ImageMeta;
    use crate::targets::ResultsPanel;

    fn response(preview: Option<&[u8]>, labels: Option<&[u8]>) -> ConversionResponse {
        ConversionResponse {
            worksheet_png: STANDARD.encode(b"worksheet-bytes"),
            preview_png: preview.map(|b| STANDARD.encode(b)),
            labels_png: labels.map(|b| STANDARD.encode(b)),
            meta: ImageMeta {
                width: 800,
                height: 600,
                colors: 9,
                num_regions: None,
            },
        }
    }

    #[test]
    fn worksheet_only_clears_optional_slots() {
        let store = BlobStore::new();
        let mut panel = ResultsPanel::new();
        let stale = ImageSource::new(PNG_MIME, vec![9]);
        panel.set_image(ArtifactKind::Preview, Some(stale));

        render(&response(None, None), &store, Locale::Fr)
            .unwrap()
            .apply(&mut panel);

        assert_eq!(
            panel.image(ArtifactKind::Worksheet).unwrap().bytes(),
            b"worksheet-bytes"
        );
        assert_eq!(
            panel.download(ArtifactKind::Worksheet).unwrap().file_name(),
            "worksheet.png"
        );
        assert!(panel.image(ArtifactKind::Preview).is_none());
        assert!(panel.image(ArtifactKind::Labels).is_none());
        assert!(panel.download(ArtifactKind::Preview).is_none());
        assert!(panel.download(ArtifactKind::Labels).is_none());
        assert_eq!(panel.meta, "Taille: 800x600 • Couleurs: 9");
        assert!(panel.results_visible);
    }

    #[test]
    fn every_artifact_gets_its_own_named_download() {
        let store = BlobStore::new();
        let full = response(Some(&b"pv"[..]), Some(&b"lb"[..]));
        let rendered = render(&full, &store, Locale::En).unwrap();
        let preview = rendered.artifact(ArtifactKind::Preview).unwrap();
        let labels = rendered.artifact(ArtifactKind::Labels).unwrap();
        assert_eq!(preview.source.bytes(), b"pv");
        assert_eq!(labels.source.bytes(), b"lb");

        let mut panel = ResultsPanel::new();
        rendered.apply(&mut panel);
        let names: Vec<_> = ArtifactKind::ALL
            .iter()
            .map(|kind| panel.download(*kind).unwrap().file_name())
            .collect();
        assert_eq!(names, ["worksheet.png", "preview.png", "labels.png"]);
    }

    #[test]
    fn empty_optional_payloads_count_as_absent() {
        let store = BlobStore::new();
        let mut empty = response(None, None);
        empty.preview_png = Some(String::new());
        empty.labels_png = Some("  ".to_string());

        let rendered = render(&empty, &store, Locale::Fr).unwrap();
        assert!(rendered.preview.is_none());
        assert!(rendered.labels.is_none());

        let mut panel = ResultsPanel::new();
        panel.set_image(ArtifactKind::Labels, Some(ImageSource::new(PNG_MIME, vec![1])));
        rendered.apply(&mut panel);
        assert!(panel.image(ArtifactKind::Preview).is_none());
        assert!(panel.image(ArtifactKind::Labels).is_none());
        assert!(panel.download(ArtifactKind::Preview).is_none());
        assert!(panel.download(ArtifactKind::Labels).is_none());
        assert!(panel.image(ArtifactKind::Worksheet).is_some());
    }

    #[test]
    fn malformed_optional_artifact_fails_render() {
        let store = BlobStore::new();
        let mut bad = response(None, None);
        bad.labels_png = Some("%%%".to_string());

        let err = render(&bad, &store, Locale::Fr).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}

use std::collections::BTreeMap;

use crate::artifact::{ArtifactKind, DownloadAction, ImageSource};

/// The display surface a host exposes to the client: a status line, three
/// image slots with their download controls, a metadata line and a results
/// section that starts hidden.
pub trait DisplayTargets {
    fn set_status(&mut self, text: &str);

    /// `None` clears the slot so no image is shown.
    fn set_image(&mut self, kind: ArtifactKind, source: Option<ImageSource>);

    /// `None` detaches whatever action was attached before.
    fn set_download(&mut self, kind: ArtifactKind, action: Option<DownloadAction>);

    fn set_meta(&mut self, text: &str);

    fn reveal_results(&mut self);
}

/// In-memory display surface for headless hosts and tests.
#[derive(Debug, Default)]
pub struct ResultsPanel {
    pub status: String,
    pub status_history: Vec<String>,
    pub images: BTreeMap<ArtifactKind, ImageSource>,
    pub downloads: BTreeMap<ArtifactKind, DownloadAction>,
    pub meta: String,
    pub results_visible: bool,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self, kind: ArtifactKind) -> Option<&ImageSource> {
        self.images.get(&kind)
    }

    pub fn download(&self, kind: ArtifactKind) -> Option<&DownloadAction> {
        self.downloads.get(&kind)
    }
}

impl DisplayTargets for ResultsPanel {
    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
        self.status_history.push(text.to_string());
    }

    fn set_image(&mut self, kind: ArtifactKind, source: Option<ImageSource>) {
        match source {
            Some(source) => {
                self.images.insert(kind, source);
            }
            None => {
                self.images.remove(&kind);
            }
        }
    }

    fn set_download(&mut self, kind: ArtifactKind, action: Option<DownloadAction>) {
        match action {
            Some(action) => {
                self.downloads.insert(kind, action);
            }
            None => {
                self.downloads.remove(&kind);
            }
        }
    }

    fn set_meta(&mut self, text: &str) {
        self.meta = text.to_string();
    }

    fn reveal_results(&mut self) {
        self.results_visible = true;
    }
}

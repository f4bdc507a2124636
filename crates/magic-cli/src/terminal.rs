//! Terminal rendition of the display targets.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use magic_core::{
    ArtifactKind, ClientError, DisplayTargets, DownloadAction, DownloadTarget, ImageSource,
    ObjectUrl,
};
use tracing::{debug, warn};

/// Prints status and metadata lines and keeps the attached download actions
/// until the caller decides where to save them.
pub struct TerminalView<W: Write> {
    out: W,
    images: BTreeMap<ArtifactKind, usize>,
    downloads: BTreeMap<ArtifactKind, DownloadAction>,
    results_visible: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            images: BTreeMap::new(),
            downloads: BTreeMap::new(),
            results_visible: false,
        }
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn downloads(&self) -> impl Iterator<Item = &DownloadAction> {
        self.downloads.values()
    }

    /// Triggers every attached download against `target`, in artifact order.
    pub fn save_downloads<T: DownloadTarget>(
        &mut self,
        target: &mut T,
    ) -> Result<Vec<String>, ClientError> {
        let mut saved = Vec::with_capacity(self.downloads.len());
        for action in self.downloads.values() {
            let location = action.trigger(target)?;
            writeln!(self.out, "Saved {} -> {}", action.file_name(), location)?;
            saved.push(location);
        }
        Ok(saved)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            warn!(error = %err, line = text, "failed to write to terminal");
        }
    }
}

impl<W: Write> DisplayTargets for TerminalView<W> {
    fn set_status(&mut self, text: &str) {
        self.print_line(text);
    }

    fn set_image(&mut self, kind: ArtifactKind, source: Option<ImageSource>) {
        match source {
            Some(source) => {
                debug!(artifact = %kind, bytes = source.bytes().len(), "image ready");
                self.images.insert(kind, source.bytes().len());
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
        self.print_line(text);
    }

    fn reveal_results(&mut self) {
        self.results_visible = true;
        let lines: Vec<String> = self
            .images
            .iter()
            .map(|(kind, size)| format!("  {:<10} {:>10} bytes", kind.label(), size))
            .collect();
        for line in lines {
            self.print_line(&line);
        }
    }
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadTarget for DirectoryTarget {
    fn download(&mut self, file_name: &str, object: &ObjectUrl) -> Result<String, ClientError> {
        fs::create_dir_all(&self.dir).map_err(|err| ClientError::download(file_name, err))?;
        let path = self.dir.join(file_name);
        fs::write(&path, object.bytes()).map_err(|err| ClientError::download(file_name, err))?;
        debug!(url = object.as_str(), path = %path.display(), "download written");
        Ok(path.display().to_string())
    }
}

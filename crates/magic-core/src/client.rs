//! The conversion form client: one multipart request per submit.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error, info, warn};

use crate::artifact::BlobStore;
use crate::config::{ClientConfig, normalize_api_base};
use crate::error::ClientError;
use crate::params::{ConversionForm, ConversionRequest, SourceImage};
use crate::render::render;
use crate::response::{ConversionResponse, HealthStatus};
use crate::targets::DisplayTargets;

const CONVERT_PATH: &str = "/magic/convert";
const HEALTH_PATH: &str = "/health";

pub struct ConversionClient {
    config: ClientConfig,
    http: Client,
    store: BlobStore,
    in_flight: AtomicBool,
}

impl ConversionClient {
    pub fn new(mut config: ClientConfig) -> Result<Self, ClientError> {
        config.api_base = normalize_api_base(&config.api_base);
        let mut builder =
            Client::builder().user_agent(concat!("magic-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            config,
            http: builder.build()?,
            store: BlobStore::new(),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Registry backing the object URLs handed out by download actions.
    pub fn blob_store(&self) -> &BlobStore {
        &self.store
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn convert_url(&self, request: &ConversionRequest) -> String {
        format!(
            "{}{}?{}",
            self.config.api_base,
            CONVERT_PATH,
            request.query_string()
        )
    }

    /// Handles one form submission end to end.
    ///
    /// The status target always ends on the completion text or on an error
    /// text; the error is also returned so the host can pick an exit path.
    pub async fn submit<T>(
        &self,
        form: &ConversionForm,
        targets: &mut T,
    ) -> Result<(), ClientError>
    where
        T: DisplayTargets + ?Sized,
    {
        let locale = self.config.locale;
        targets.set_status(locale.in_progress());

        let Some(image) = form.file.as_ref() else {
            targets.set_status(locale.select_image());
            return Err(ClientError::MissingFile);
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("conversion requested while another one is in flight");
            targets.set_status(locale.busy());
            return Err(ClientError::Busy);
        };

        let request = form.to_request();
        for advisory in request.advisories() {
            warn!(%advisory, "request parameter outside the service range");
        }

        let outcome = match self.convert(&request, image).await {
            Ok(response) => render(&response, &self.store, locale),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(rendered) => {
                rendered.apply(targets);
                targets.set_status(locale.done());
                Ok(())
            }
            Err(err) => {
                error!(error = %err, kind = ?err.kind(), "conversion failed");
                targets.set_status(&locale.error(&err.to_string()));
                Err(err)
            }
        }
    }

    /// Sends the multipart request and parses the JSON body.
    pub async fn convert(
        &self,
        request: &ConversionRequest,
        image: &SourceImage,
    ) -> Result<ConversionResponse, ClientError> {
        let url = self.convert_url(request);
        info!(
            %url,
            file = %image.file_name,
            size = image.bytes.len(),
            "submitting conversion"
        );

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        let form = Form::new().part("file", part);

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: ConversionResponse = serde_json::from_slice(&body)?;
        info!(
            width = parsed.meta.width,
            height = parsed.meta.height,
            colors = parsed.meta.colors,
            preview = parsed.preview_png.is_some(),
            labels = parsed.labels_png.is_some(),
            "conversion succeeded"
        );
        Ok(parsed)
    }

    /// Queries the liveness endpoint of the service.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}{}", self.config.api_base, HEALTH_PATH);
        debug!(%url, "checking service health");
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Holds the in-flight flag for one submission and clears it on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::ResultsPanel;

    fn client() -> ConversionClient {
        ConversionClient::new(ClientConfig::default().with_api_base("http://127.0.0.1:9/"))
            .unwrap()
    }

    #[test]
    fn convert_url_carries_defaults() {
        let url = client().convert_url(&ConversionForm::default().to_request());
        assert_eq!(
            url,
            "http://127.0.0.1:9/magic/convert?colors=9&max_size=1024&thickness=2\
             &min_area=80&merge_area=200&outline_mode=union&include_preview=false\
             &return_pdf=false"
        );
    }

    #[test]
    fn api_base_is_normalized_when_built_directly() {
        let client = ConversionClient::new(ClientConfig {
            api_base: " http://h/ ".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.config().api_base, "http://h");
        assert!(
            client
                .convert_url(&ConversionRequest::default())
                .starts_with("http://h/magic/convert?colors=9")
        );
    }

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = InFlightGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn submit_without_file_reports_and_skips_network() {
        let client = client();
        let mut panel = ResultsPanel::new();
        let err = client
            .submit(&ConversionForm::default(), &mut panel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingFile));
        assert_eq!(panel.status, "Sélectionne une image.");
        assert!(!panel.results_visible);
        assert!(!client.is_busy());
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Executes dispatcher effects against the management server.
//!
//! Every call spawns its request on the runtime and returns at once; completions are
//! reported as [`ClientEvent`]s on the channel the UI loop drains.

use std::fmt;
use std::future::Future;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT};
use reqwest::StatusCode;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::protocol::{
    FormFragment, FormResponse, HttpMethod, PageSnapshot, StageRequest, FRAGMENT_HEADER,
    FRAGMENT_HEADER_VALUE, SESSION_HEADER,
};

use super::dispatcher::Effect;
use super::modal::FormSubmission;
use super::staging::{HttpStagingTransport, SelectionStagingClient};
use super::ClientEvent;

pub trait Browser {
    fn stage(&self, request: StageRequest);
    fn navigate(&self, method: HttpMethod, location: &str);
    fn open_fragment(&self, location: &str);
    fn submit_form(&self, submission: FormSubmission);

    fn run(&self, effect: Effect) {
        match effect {
            Effect::Stage(request) => self.stage(request),
            Effect::Navigate { method, url } => self.navigate(method, &url),
            Effect::OpenModal { url } => self.open_fragment(&url),
        }
    }
}

/// HTTP client carrying the session header and the configured timeout.
pub fn http_client(config: &ClientConfig) -> Result<reqwest::Client, BrowserError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SESSION_HEADER,
        HeaderValue::from_str(config.session_id().as_str())
            .map_err(BrowserError::InvalidSessionHeader)?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout())
        .build()
        .map_err(BrowserError::Client)
}

#[derive(Clone)]
pub struct HttpBrowser {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    client: reqwest::Client,
    runtime: Handle,
    events: Sender<ClientEvent>,
    staging: SelectionStagingClient,
}

impl HttpBrowser {
    pub fn new(
        config: ClientConfig,
        runtime: Handle,
        events: Sender<ClientEvent>,
    ) -> Result<Self, BrowserError> {
        let client = http_client(&config)?;
        let transport = HttpStagingTransport::new(client.clone(), config.staging_url());
        let staging =
            SelectionStagingClient::new(Arc::new(transport), runtime.clone(), events.clone());
        Ok(Self { inner: Arc::new(Inner { config, client, runtime, events, staging }) })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    fn spawn<F>(&self, task: impl FnOnce(Arc<Inner>) -> F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let future = task(Arc::clone(&self.inner));
        self.inner.runtime.spawn(future);
    }
}

impl Inner {
    fn send(&self, event: ClientEvent) {
        if self.events.send(event).is_err() {
            debug!("client event dropped: receiver is gone");
        }
    }

    async fn load_page(&self, method: HttpMethod, url: &str) -> Result<PageSnapshot, BrowserError> {
        let request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        let response = request.send().await.map_err(BrowserError::Client)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Status { status: status.as_u16() });
        }
        response.json::<PageSnapshot>().await.map_err(BrowserError::Client)
    }

    async fn navigate(&self, method: HttpMethod, url: String) {
        match self.load_page(method, &url).await {
            Ok(page) => self.send(ClientEvent::PageLoaded(page)),
            Err(err) => {
                warn!(method = %method, url = %url, error = %err, "navigation failed");
                self.send(ClientEvent::NavigationFailed { url, message: err.to_string() });
            }
        }
    }

    async fn load_fragment(&self, url: &str) -> Result<FormFragment, BrowserError> {
        let response = self
            .client
            .get(url)
            .header(FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE)
            .send()
            .await
            .map_err(BrowserError::Client)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Status { status: status.as_u16() });
        }
        response.json::<FormFragment>().await.map_err(BrowserError::Client)
    }

    async fn submit(
        &self,
        url: &str,
        submission: &FormSubmission,
    ) -> Result<FormResponse, BrowserError> {
        let fields = submission
            .fields
            .iter()
            .map(|field| (field.name.as_str(), field.value.as_str()))
            .collect::<Vec<_>>();
        let response = self
            .client
            .post(url)
            .header(FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE)
            .form(&fields)
            .send()
            .await
            .map_err(BrowserError::Client)?;
        match response.status() {
            StatusCode::OK | StatusCode::UNPROCESSABLE_ENTITY => {
                response.json::<FormResponse>().await.map_err(BrowserError::Client)
            }
            status => Err(BrowserError::Status { status: status.as_u16() }),
        }
    }
}

impl Browser for HttpBrowser {
    fn stage(&self, request: StageRequest) {
        self.inner.staging.stage(request);
    }

    fn navigate(&self, method: HttpMethod, location: &str) {
        let url = self.inner.config.url(location);
        self.spawn(move |inner| async move { inner.navigate(method, url).await });
    }

    /// Loads a form fragment; if that fails, falls back to a full-page load of the same
    /// location, whose page embeds the form.
    fn open_fragment(&self, location: &str) {
        let url = self.inner.config.url(location);
        self.spawn(move |inner| async move {
            match inner.load_fragment(&url).await {
                Ok(fragment) => inner.send(ClientEvent::FragmentLoaded(fragment)),
                Err(err) => {
                    warn!(
                        url = %url,
                        error = %err,
                        "fragment load failed, falling back to page load"
                    );
                    inner.navigate(HttpMethod::Get, url).await;
                }
            }
        });
    }

    fn submit_form(&self, submission: FormSubmission) {
        let url = self.inner.config.url(&submission.action);
        self.spawn(move |inner| async move {
            match inner.submit(&url, &submission).await {
                Ok(FormResponse::Done { location }) => {
                    inner.send(ClientEvent::FormCompleted { location })
                }
                Ok(FormResponse::Invalid { fragment }) => {
                    inner.send(ClientEvent::FormInvalid(fragment))
                }
                Err(err) => {
                    warn!(
                        url = %url,
                        attempt = submission.attempt,
                        error = %err,
                        "form submission failed"
                    );
                    inner.send(ClientEvent::FormFailed { message: err.to_string() });
                }
            }
        });
    }
}

#[derive(Debug)]
pub enum BrowserError {
    InvalidSessionHeader(InvalidHeaderValue),
    Client(reqwest::Error),
    Status { status: u16 },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSessionHeader(err) => {
                write!(f, "session id is not a valid header value: {err}")
            }
            Self::Client(err) => write!(f, "request failed: {err}"),
            Self::Status { status } => write!(f, "server answered with status {status}"),
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSessionHeader(err) => Some(err),
            Self::Client(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::Browser;
    use crate::client::dispatcher::Effect;
    use crate::client::modal::FormSubmission;
    use crate::protocol::{HttpMethod, StageRequest, TreeAction};

    #[derive(Default)]
    struct Log(RefCell<Vec<String>>);

    impl Browser for Log {
        fn stage(&self, request: StageRequest) {
            self.0.borrow_mut().push(format!("stage {}", request.action));
        }

        fn navigate(&self, method: HttpMethod, location: &str) {
            self.0.borrow_mut().push(format!("{method} {location}"));
        }

        fn open_fragment(&self, location: &str) {
            self.0.borrow_mut().push(format!("modal {location}"));
        }

        fn submit_form(&self, submission: FormSubmission) {
            self.0.borrow_mut().push(format!("submit {}", submission.action));
        }
    }

    #[test]
    fn effects_map_onto_browser_calls() {
        let log = Log::default();
        log.run(Effect::OpenModal { url: "/management/?a=1".to_owned() });
        log.run(Effect::Stage(StageRequest {
            element_id: "20".to_owned(),
            element_type: None,
            action: TreeAction::Detach,
            parent_link_id: None,
        }));
        log.run(Effect::Navigate { method: HttpMethod::Post, url: "/management/?b=2".to_owned() });

        assert_eq!(
            log.0.into_inner(),
            vec!["modal /management/?a=1", "stage detach", "POST /management/?b=2"]
        );
    }
}

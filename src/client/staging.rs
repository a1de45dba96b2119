// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Fire-and-forget staging of an element into the server's single selection slot.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::protocol::{Notice, StageRequest, TreeAction};

use super::ClientEvent;

pub type StagingFuture = Pin<Box<dyn Future<Output = Result<Notice, StagingError>> + Send>>;

/// Delivers one staging request to the server.
pub trait StagingTransport: Send + Sync + 'static {
    fn post(&self, request: StageRequest) -> StagingFuture;
}

pub struct HttpStagingTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpStagingTransport {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

impl StagingTransport for HttpStagingTransport {
    fn post(&self, request: StageRequest) -> StagingFuture {
        let builder = self.client.post(&self.url).form(&request);
        Box::pin(async move {
            let response = builder.send().await.map_err(StagingError::Http)?;
            let status = response.status();
            if !status.is_success() {
                return Err(StagingError::Status { status: status.as_u16() });
            }
            response.json::<Notice>().await.map_err(StagingError::Http)
        })
    }
}

/// Posts staging requests without waiting for them.
///
/// Calls are independent: two back-to-back calls race and the server keeps whichever
/// arrives last. Only the `select` action reports its notice back to the UI; failures
/// are logged and never retried.
#[derive(Clone)]
pub struct SelectionStagingClient {
    transport: Arc<dyn StagingTransport>,
    runtime: Handle,
    events: Sender<ClientEvent>,
}

impl SelectionStagingClient {
    pub fn new(
        transport: Arc<dyn StagingTransport>,
        runtime: Handle,
        events: Sender<ClientEvent>,
    ) -> Self {
        Self { transport, runtime, events }
    }

    pub fn stage(&self, request: StageRequest) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let action = request.action;
            let element_id = request.element_id.clone();
            match transport.post(request).await {
                Ok(notice) if action == TreeAction::Select => {
                    let _ = events.send(ClientEvent::Notice(notice));
                }
                Ok(_) => debug!(action = %action, element_id = %element_id, "staged"),
                Err(err) => {
                    warn!(
                        action = %action,
                        element_id = %element_id,
                        error = %err,
                        "staging failed"
                    );
                }
            }
        })
    }
}

#[derive(Debug)]
pub enum StagingError {
    Http(reqwest::Error),
    Status { status: u16 },
}

impl fmt::Display for StagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "staging request failed: {err}"),
            Self::Status { status } => write!(f, "staging endpoint answered with status {status}"),
        }
    }
}

impl std::error::Error for StagingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    use super::{SelectionStagingClient, StagingError, StagingFuture, StagingTransport};
    use crate::client::ClientEvent;
    use crate::protocol::{Notice, StageRequest, TreeAction};

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<StageRequest>>,
        fail: bool,
    }

    impl StagingTransport for Recording {
        fn post(&self, request: StageRequest) -> StagingFuture {
            let message = format!("Selected element : \"{}\"", request.element_id);
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request);
            }
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(StagingError::Status { status: 500 })
                } else {
                    Ok(Notice::success(message))
                }
            })
        }
    }

    fn request(element_id: &str, action: TreeAction) -> StageRequest {
        StageRequest {
            element_id: element_id.to_owned(),
            element_type: None,
            action,
            parent_link_id: None,
        }
    }

    #[tokio::test]
    async fn select_reports_the_notice() {
        let transport = Arc::new(Recording::default());
        let (tx, rx) = mpsc::channel();
        let client =
            SelectionStagingClient::new(transport.clone(), tokio::runtime::Handle::current(), tx);

        client.stage(request("20", TreeAction::Select)).await.expect("task");

        let Ok(ClientEvent::Notice(notice)) = rx.try_recv() else {
            panic!("expected a notice");
        };
        assert_eq!(notice.message, "Selected element : \"20\"");
    }

    #[tokio::test]
    async fn detach_and_move_staging_is_silent() {
        let transport = Arc::new(Recording::default());
        let (tx, rx) = mpsc::channel();
        let client =
            SelectionStagingClient::new(transport.clone(), tokio::runtime::Handle::current(), tx);

        client.stage(request("20", TreeAction::Detach)).await.expect("task");
        client.stage(request("21", TreeAction::Move)).await.expect("task");

        assert!(rx.try_recv().is_err());
        assert_eq!(transport.seen.lock().expect("lock").len(), 2);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let transport = Arc::new(Recording { fail: true, ..Recording::default() });
        let (tx, rx) = mpsc::channel();
        let client =
            SelectionStagingClient::new(transport.clone(), tokio::runtime::Handle::current(), tx);

        client.stage(request("20", TreeAction::Select)).await.expect("task");

        assert!(rx.try_recv().is_err());
        assert_eq!(transport.seen.lock().expect("lock").len(), 1);
    }
}

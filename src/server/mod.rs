// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Management server: staging endpoint, management endpoint and tree pages.
//!
//! Routes:
//! - `POST /staging/` stores the session's staged element (form body).
//! - `GET|POST /management/?<canonical query>` runs one tree action.
//! - `GET /tree/{root_id}` and `GET /tree/{root_id}/{element_id}?parent_link=<id>` render pages.

mod error;
mod handlers;
mod state;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{ServerConfig, DEFAULT_MANAGEMENT_PATH, DEFAULT_STAGING_PATH};
use crate::model::Program;

pub use error::ServerError;
pub use state::{ManagementState, StagedElement, StagedOrigin, NOTHING_STAGED, ROOT_NOT_DETACHABLE};

#[derive(Clone)]
pub struct ManagementServer {
    state: Arc<Mutex<ManagementState>>,
    management_path: Arc<str>,
}

impl ManagementServer {
    pub fn new(program: Program) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagementState::new(program))),
            management_path: Arc::from(DEFAULT_MANAGEMENT_PATH),
        }
    }

    pub fn state(&self) -> Arc<Mutex<ManagementState>> {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(DEFAULT_STAGING_PATH, post(handlers::stage))
            .route(
                DEFAULT_MANAGEMENT_PATH,
                get(handlers::management_get).post(handlers::management_post),
            )
            .route("/tree/{root_id}", get(handlers::tree_root))
            .route("/tree/{root_id}/{element_id}", get(handlers::tree_element))
            .with_state(self.clone())
    }

    /// Binds `config.addr()` and serves in a background task until shut down.
    pub async fn spawn(&self, config: &ServerConfig) -> io::Result<RunningServer> {
        let listener = TcpListener::bind(config.addr()).await?;
        let addr = listener.local_addr()?;
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let router = self.router();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = serve.await {
                error!(error = %err, "management server stopped");
            }
        });
        info!(%addr, "management server listening");

        Ok(RunningServer { addr, shutdown, handle })
    }
}

/// Handle on a server started with [`ManagementServer::spawn`].
pub struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

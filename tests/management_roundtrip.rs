// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use cursus::client::{Browser, ClientEvent, FormSubmission, HttpBrowser};
use cursus::config::{ClientConfig, ServerConfig, DEFAULT_MANAGEMENT_PATH};
use cursus::model::{
    demo_program, ElementId, ElementReference, ElementType, LinkId, ParentLink, SessionKey,
    DEMO_ROOT_ID,
};
use cursus::protocol::{
    build_action_request, FormFragment, FormResponse, HttpMethod, PageSnapshot, StageRequest,
    TreeAction, FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE, SESSION_HEADER,
};
use cursus::server::{ManagementServer, ManagementState, RunningServer, StagedOrigin};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

struct Harness {
    server: ManagementServer,
    running: RunningServer,
    config: ClientConfig,
    browser: HttpBrowser,
    events: Receiver<ClientEvent>,
}

impl Harness {
    async fn start(session: &str) -> Self {
        let server = ManagementServer::new(demo_program());
        let running = server.spawn(&ServerConfig::with_port(0)).await.expect("spawn server");
        let config = ClientConfig::for_local_port(running.port())
            .with_session_id(session)
            .expect("session id");
        let (tx, events) = mpsc::channel();
        let browser = HttpBrowser::new(config.clone(), tokio::runtime::Handle::current(), tx)
            .expect("browser");
        Self { server, running, config, browser, events }
    }

    fn session(&self) -> SessionKey {
        self.config.session_id().clone()
    }

    async fn next_event(&self) -> ClientEvent {
        let deadline = Instant::now() + EVENT_TIMEOUT;
        loop {
            match self.events.try_recv() {
                Ok(event) => return event,
                Err(TryRecvError::Disconnected) => panic!("event channel closed"),
                Err(TryRecvError::Empty) => {
                    assert!(Instant::now() < deadline, "no client event within {EVENT_TIMEOUT:?}");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    /// `true` when nothing else arrives for a short while.
    async fn wait_for_no_event(&self) -> bool {
        tokio::time::sleep(Duration::from_millis(100)).await;
        matches!(self.events.try_recv(), Err(TryRecvError::Empty))
    }

    async fn next_page(&self) -> PageSnapshot {
        match self.next_event().await {
            ClientEvent::PageLoaded(page) => page,
            other => panic!("expected a page, got {other:?}"),
        }
    }

    async fn wait_for_pending(&self, element_id: &str) -> StagedOrigin {
        let session = self.session();
        let deadline = Instant::now() + EVENT_TIMEOUT;
        loop {
            {
                let state = self.server.state();
                let state = state.lock().await;
                if let Some(staged) = state.pending(&session) {
                    if staged.element_id.as_str() == element_id {
                        return staged.origin.clone();
                    }
                }
            }
            assert!(Instant::now() < deadline, "element {element_id} was never staged");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn children_of(&self, parent: &str) -> Vec<String> {
        let state = self.server.state();
        let state = state.lock().await;
        let parent = ElementId::new(parent).expect("element id");
        state
            .program()
            .children_of(&parent)
            .into_iter()
            .map(|link| link.child().to_string())
            .collect()
    }

    fn raw_client(&self) -> reqwest::Client {
        cursus::client::http_client(&self.config).expect("http client")
    }
}

fn reference(element_id: &str, link: &str, element_type: ElementType) -> ElementReference {
    ElementReference::new(
        ElementId::new(element_id).expect("element id"),
        ParentLink::Link(LinkId::new(link).expect("link id")),
        element_type,
    )
}

fn management_location(
    element_id: &str,
    link: &str,
    element_type: ElementType,
    action: TreeAction,
) -> String {
    let root = ElementId::new(DEMO_ROOT_ID).expect("root id");
    let reference = reference(element_id, link, element_type);
    build_action_request(&root, &reference, action, "/tree/1").url(DEFAULT_MANAGEMENT_PATH)
}

/// A server that renders the detach page with its embedded form but refuses every
/// fragment load.
async fn spawn_page_only_server(page: PageSnapshot) -> (u16, tokio::task::JoinHandle<()>) {
    let app = axum::Router::new().route(
        DEFAULT_MANAGEMENT_PATH,
        axum::routing::get(move |headers: HeaderMap| {
            let page = page.clone();
            async move {
                if headers.contains_key(FRAGMENT_HEADER) {
                    return StatusCode::NOT_ACCEPTABLE.into_response();
                }
                axum::Json(page).into_response()
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (port, task)
}

fn submit(fragment: &FormFragment, attempt: u32) -> FormSubmission {
    FormSubmission { action: fragment.action.clone(), fields: fragment.fields.clone(), attempt }
}

#[tokio::test(flavor = "multi_thread")]
async fn tree_page_loads_through_the_browser() {
    let harness = Harness::start("tree-page").await;

    harness.browser.navigate(HttpMethod::Get, "/tree/1?tree=1");
    let page = harness.next_page().await;
    assert_eq!(page.root_id, DEMO_ROOT_ID);
    assert_eq!(page.location, "/tree/1?tree=1");
    assert_eq!(page.tree.root.children.len(), 2);
    assert!(page.form.is_none());

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn last_staging_request_wins() {
    let harness = Harness::start("last-wins").await;

    let first = reference("20", "104", ElementType::LearningUnit);
    let second = reference("23", "107", ElementType::LearningUnit);
    harness.browser.stage(StageRequest::for_reference(&first, TreeAction::Select));
    harness.wait_for_pending("20").await;
    harness.browser.stage(StageRequest::for_reference(&second, TreeAction::Move));

    let origin = harness.wait_for_pending("23").await;
    assert_eq!(origin, StagedOrigin::Moving { from_link: LinkId::new("107").expect("link id") });

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn select_notice_reaches_the_browser() {
    let harness = Harness::start("select-notice").await;

    let unit = reference("20", "104", ElementType::LearningUnit);
    harness.browser.stage(StageRequest::for_reference(&unit, TreeAction::Select));

    match harness.next_event().await {
        ClientEvent::Notice(notice) => {
            assert_eq!(notice.message, "Selected element : \"LBIR1100\"")
        }
        other => panic!("expected a notice, got {other:?}"),
    }

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn select_then_attach_follows_the_redirect() {
    let harness = Harness::start("select-attach").await;

    let unit = reference("23", "107", ElementType::LearningUnit);
    harness.browser.stage(StageRequest::for_reference(&unit, TreeAction::Select));
    let _ = harness.next_event().await;

    let attach = management_location("3", "102", ElementType::Group, TreeAction::Attach);
    harness.browser.navigate(HttpMethod::Get, &attach);
    let page = harness.next_page().await;

    assert_eq!(page.location, "/tree/1");
    assert!(page.messages.iter().any(|notice| notice.message.contains("LBIR101G")));
    assert_eq!(harness.children_of("3").await, vec!["20", "21", "23"]);
    assert_eq!(harness.children_of("4").await, vec!["22", "23"]);

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn detach_runs_through_the_fragment_endpoint() {
    let harness = Harness::start("detach").await;

    let detach = management_location("21", "105", ElementType::LearningUnit, TreeAction::Detach);
    harness.browser.open_fragment(&detach);
    let fragment = match harness.next_event().await {
        ClientEvent::FragmentLoaded(fragment) => fragment,
        other => panic!("expected a fragment, got {other:?}"),
    };
    assert_eq!(fragment.title, "Detach LBIR1101");
    assert!(!fragment.has_errors());

    harness.browser.submit_form(submit(&fragment, 1));
    match harness.next_event().await {
        ClientEvent::FormCompleted { location } => assert_eq!(location, "/tree/1"),
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(harness.children_of("3").await, vec!["20"]);

    // The link is gone now, so the same form comes back with an error.
    harness.browser.submit_form(submit(&fragment, 2));
    match harness.next_event().await {
        ClientEvent::FormInvalid(rerendered) => assert!(rerendered.has_errors()),
        other => panic!("expected an invalid form, got {other:?}"),
    }

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn form_post_answers_422_when_invalid() {
    let harness = Harness::start("detach-422").await;
    let client = harness.raw_client();

    let root = ElementId::new(DEMO_ROOT_ID).expect("root id");
    let root_reference = ElementReference::new(root.clone(), ParentLink::Root, ElementType::Group);
    let url = harness.config.url(
        &build_action_request(&root, &root_reference, TreeAction::Detach, "/tree/1")
            .url(DEFAULT_MANAGEMENT_PATH),
    );

    let response = client
        .post(&url)
        .header(FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE)
        .form(&[("confirm", "1")])
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    match response.json::<FormResponse>().await.expect("json") {
        FormResponse::Invalid { fragment } => {
            assert_eq!(fragment.errors, vec![cursus::server::ROOT_NOT_DETACHABLE.to_owned()]);
        }
        other => panic!("expected an invalid form, got {other:?}"),
    }

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn form_without_fragment_header_is_a_full_page() {
    let harness = Harness::start("fallback").await;
    let client = reqwest::Client::new();

    let detach = management_location("20", "104", ElementType::LearningUnit, TreeAction::Detach);
    let response = client
        .get(harness.config.url(&detach))
        .header(SESSION_HEADER, "fallback")
        .send()
        .await
        .expect("get");
    assert!(response.status().is_success());

    let page = response.json::<PageSnapshot>().await.expect("page json");
    assert_eq!(page.location, "/tree/1/20?parent_link=104");
    let form = page.form.expect("embedded form");
    assert_eq!(form.title, "Detach LBIR1100");
    assert_eq!(page.focus.expect("focus").element_id, "20");

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn move_completes_on_attach() {
    let harness = Harness::start("move").await;

    let confirm = management_location("20", "104", ElementType::LearningUnit, TreeAction::Move);
    harness.browser.open_fragment(&confirm);
    let fragment = match harness.next_event().await {
        ClientEvent::FragmentLoaded(fragment) => fragment,
        other => panic!("expected a fragment, got {other:?}"),
    };
    harness.browser.submit_form(submit(&fragment, 1));
    match harness.next_event().await {
        ClientEvent::FormCompleted { .. } => {}
        other => panic!("expected completion, got {other:?}"),
    }
    harness.wait_for_pending("20").await;

    let attach = management_location("4", "103", ElementType::Group, TreeAction::Attach);
    harness.browser.navigate(HttpMethod::Post, &attach);
    let _ = harness.next_page().await;

    assert_eq!(harness.children_of("3").await, vec!["21"]);
    assert_eq!(harness.children_of("4").await, vec!["22", "23", "20"]);
    let state = harness.server.state();
    assert!(state.lock().await.pending(&harness.session()).is_none());
    drop(state);

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn select_over_get_is_rejected() {
    let harness = Harness::start("select-get").await;
    let client = harness.raw_client();

    let select = management_location("20", "104", ElementType::LearningUnit, TreeAction::Select);
    let response = client.get(harness.config.url(&select)).send().await.expect("get");
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

    harness.running.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_fragment_falls_back_to_the_full_page() {
    let root = ElementId::new(DEMO_ROOT_ID).expect("root id");
    let unit = reference("20", "104", ElementType::LearningUnit);
    let request = build_action_request(&root, &unit, TreeAction::Detach, "/tree/1");
    let mut state = ManagementState::new(demo_program());
    let session = SessionKey::new("fallback").expect("session");
    let focus = Some((unit.element_id(), unit.parent_link()));
    let mut page =
        state.page(&session, &root, focus, "/tree/1/20?parent_link=104").expect("page");
    page.form = Some(state.form(&request, DEFAULT_MANAGEMENT_PATH).expect("form"));
    let (port, server) = spawn_page_only_server(page).await;

    let (tx, events) = mpsc::channel();
    let config = ClientConfig::for_local_port(port);
    let browser =
        HttpBrowser::new(config, tokio::runtime::Handle::current(), tx).expect("browser");
    browser.open_fragment(&request.url(DEFAULT_MANAGEMENT_PATH));

    let deadline = Instant::now() + EVENT_TIMEOUT;
    let event = loop {
        match events.try_recv() {
            Ok(event) => break event,
            Err(TryRecvError::Disconnected) => panic!("event channel closed"),
            Err(TryRecvError::Empty) => {
                assert!(Instant::now() < deadline, "no client event within {EVENT_TIMEOUT:?}");
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    };
    match event {
        ClientEvent::PageLoaded(page) => {
            assert_eq!(page.form.expect("embedded form").title, "Detach LBIR1100");
            assert_eq!(page.focus.expect("focus").element_id, "20");
        }
        other => panic!("expected the fallback page, got {other:?}"),
    }

    server.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn fragment_and_fallback_failing_report_a_navigation_failure() {
    let harness = Harness::start("broken-dialog").await;

    // Without an element_id the request is refused, as a fragment and as a page.
    let location = format!("{DEFAULT_MANAGEMENT_PATH}?root_id=1&action=detach");
    harness.browser.open_fragment(&location);
    match harness.next_event().await {
        ClientEvent::NavigationFailed { url, message } => {
            assert!(url.ends_with(&location), "{url}");
            assert_eq!(message, "server answered with status 400");
        }
        other => panic!("expected a navigation failure, got {other:?}"),
    }
    assert!(harness.wait_for_no_event().await);

    harness.running.shutdown().await;
}

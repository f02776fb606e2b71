#![allow(clippy::unwrap_used)]
// Integration tests for the session interceptor, token recovery and the
// dashboard views, against a wiremock wgrest server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wgdash_core::{
    ACCESS_TOKEN_MODAL, CoreError, Dashboard, MemoryTokenStore, ModalStore, Notice, NoticeLevel,
    Notifier, PromptError, Session, SessionConfig, SessionHooks, TokenPrompt, TokenStore, View,
    ViewData,
};

// ── Test doubles ────────────────────────────────────────────────────

/// Answers prompts from a script and records what the modal store showed
/// while each prompt was open.
struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<&'static str>>>,
    calls: AtomicUsize,
    modal: Arc<ModalStore>,
    modal_seen: Mutex<Vec<Option<String>>>,
    delay: Duration,
}

impl ScriptedPrompt {
    fn new(modal: &Arc<ModalStore>, answers: &[Option<&'static str>]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            calls: AtomicUsize::new(0),
            modal: Arc::clone(modal),
            modal_seen: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        })
    }

    fn slow(modal: &Arc<ModalStore>, answers: &[Option<&'static str>]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            calls: AtomicUsize::new(0),
            modal: Arc::clone(modal),
            modal_seen: Mutex::new(Vec::new()),
            delay: Duration::from_millis(200),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenPrompt for ScriptedPrompt {
    fn request_token(&self) -> Result<Option<SecretString>, PromptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modal_seen.lock().unwrap().push(self.modal.active());
        std::thread::sleep(self.delay);
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer.map(|t| SecretString::from(t.to_string()))),
            None => Err(PromptError("no more answers".into())),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

struct Harness {
    server: MockServer,
    session: Session,
    tokens: Arc<MemoryTokenStore>,
    prompt: Arc<ScriptedPrompt>,
    notifier: Arc<RecordingNotifier>,
    modal: Arc<ModalStore>,
}

async fn harness(answers: &[Option<&'static str>], notify_all_errors: bool) -> Harness {
    harness_with(answers, notify_all_errors, false).await
}

async fn harness_with(
    answers: &[Option<&'static str>],
    notify_all_errors: bool,
    slow_prompt: bool,
) -> Harness {
    let server = MockServer::start().await;
    let modal = Arc::new(ModalStore::new());
    let tokens = Arc::new(MemoryTokenStore::with_token(SecretString::from(
        "old".to_string(),
    )));
    let prompt = if slow_prompt {
        ScriptedPrompt::slow(&modal, answers)
    } else {
        ScriptedPrompt::new(&modal, answers)
    };
    let notifier = Arc::new(RecordingNotifier::default());

    let mut config = SessionConfig::new(Url::parse(&server.uri()).unwrap());
    config.notify_all_errors = notify_all_errors;

    let session = Session::new(
        &config,
        SessionHooks {
            tokens: tokens.clone(),
            prompt: prompt.clone(),
            notifier: notifier.clone(),
        },
        Arc::clone(&modal),
    )
    .unwrap();

    Harness {
        server,
        session,
        tokens,
        prompt,
        notifier,
        modal,
    }
}

fn device_json(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "listen_port": 51820,
        "public_key": "9jalV3EEBnVXahro0pRMQ+cHlmjE33Slo9tddzCVtCw=",
        "addresses": ["10.10.0.1/24"],
        "running": true,
        "peers_count": 1,
        "total_receive_bytes": 10,
        "total_transmit_bytes": 20
    })
}

async fn mount_devices_for(server: &MockServer, token: &str, names: &[&str]) {
    let body: Vec<_> = names.iter().map(|n| device_json(n)).collect();
    Mock::given(method("GET"))
        .and(path("/v1/devices/"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .with_priority(1)
        .mount(server)
        .await;
}

async fn mount_unauthorized(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "code": "unauthorized", "message": "invalid token" })),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

// ── Pass-through ────────────────────────────────────────────────────

#[tokio::test]
async fn non_auth_failure_is_returned_untouched() {
    let h = harness(&[], false).await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "wg_error",
            "message": "wireguard is not loaded"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.session.list_all_devices().await.unwrap_err();
    match err {
        CoreError::Api {
            status, code, message, ..
        } => {
            assert_eq!(status, Some(500));
            assert_eq!(code.as_deref(), Some("wg_error"));
            assert_eq!(message, "wireguard is not loaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(h.prompt.calls(), 0);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn not_found_keeps_the_server_response() {
    let h = harness(&[], false).await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/wg9/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "device_not_found",
            "message": "device wg9 does not exist",
            "detail": "no such interface"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.session.get_device("wg9").await.unwrap_err();

    assert!(matches!(err, CoreError::DeviceNotFound { ref name, .. } if name == "wg9"));
    assert_eq!(err.status(), Some(404));
    match err.api_error() {
        Some(wgdash_api::Error::Api {
            status,
            code,
            message,
            detail,
        }) => {
            assert_eq!(*status, 404);
            assert_eq!(code.as_deref(), Some("device_not_found"));
            assert_eq!(message, "device wg9 does not exist");
            assert_eq!(detail.as_deref(), Some("no such interface"));
        }
        other => panic!("expected the original Api error, got {other:?}"),
    }
    assert_eq!(h.prompt.calls(), 0);
}

#[tokio::test]
async fn every_failure_is_notified_when_enabled() {
    let h = harness(&[], true).await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/wg9/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "code": "not_found", "message": "device not found" })),
        )
        .mount(&h.server)
        .await;

    let err = h.session.get_device("wg9").await.unwrap_err();
    assert!(matches!(err, CoreError::DeviceNotFound { ref name, .. } if name == "wg9"));

    let notices = h.notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(h.prompt.calls(), 0);
}

// ── Recovery ────────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_prompts_stores_and_retries_with_new_token() {
    let h = harness(&[Some("fresh")], false).await;
    mount_devices_for(&h.server, "fresh", &["wg0", "wg1"]).await;
    mount_unauthorized(&h.server).await;
    let mut credentials = h.session.subscribe_credentials();

    let page = h
        .session
        .list_devices(wgdash_core::PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(h.prompt.calls(), 1);
    assert_eq!(
        h.tokens.load().unwrap().unwrap().expose_secret(),
        "fresh"
    );
    assert_eq!(h.session.client().token().current().expose_secret(), "fresh");

    assert!(credentials.has_changed().unwrap());
    assert_eq!(credentials.borrow_and_update().generation, 1);

    let notices = h.notifier.notices();
    assert_eq!(notices, vec![Notice::success("Your token is saved")]);

    // The prompt ran with the access-token modal open, which is closed again.
    assert_eq!(
        *h.prompt.modal_seen.lock().unwrap(),
        vec![Some(ACCESS_TOKEN_MODAL.to_string())]
    );
    assert_eq!(h.modal.active(), None);

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].headers.get("authorization").unwrap(),
        "Bearer fresh"
    );
}

#[tokio::test]
async fn invalid_key_message_counts_as_auth_failure() {
    let h = harness(&[Some("fresh")], false).await;
    mount_devices_for(&h.server, "fresh", &["wg0"]).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "code": "forbidden", "message": "invalid key provided" })),
        )
        .with_priority(10)
        .mount(&h.server)
        .await;

    let devices = h.session.list_all_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(h.prompt.calls(), 1);
}

#[tokio::test]
async fn cancelling_the_prompt_stores_nothing_and_does_not_retry() {
    let h = harness(&[None], false).await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "nope" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.session.list_all_devices().await.unwrap_err();
    match &err {
        CoreError::RecoveryCancelled { source } => assert_eq!(source.status(), Some(401)),
        other => panic!("expected RecoveryCancelled, got {other:?}"),
    }
    assert!(err.is_auth());

    assert_eq!(h.tokens.load().unwrap().unwrap().expose_secret(), "old");
    assert_eq!(h.session.generation(), 0);
    assert_eq!(h.notifier.notices(), vec![Notice::info("Input canceled")]);
    assert_eq!(h.modal.active(), None);
}

#[tokio::test]
async fn rejected_replacement_reopens_the_prompt() {
    let h = harness(&[Some("wrong"), Some("right")], false).await;
    mount_devices_for(&h.server, "right", &["wg0"]).await;
    mount_unauthorized(&h.server).await;

    let devices = h.session.list_all_devices().await.unwrap();

    assert_eq!(devices[0].name, "wg0");
    assert_eq!(h.prompt.calls(), 2);
    assert_eq!(h.session.generation(), 2);
    assert_eq!(h.tokens.load().unwrap().unwrap().expose_secret(), "right");
}

#[tokio::test]
async fn prompt_failure_surfaces_as_prompt_unavailable() {
    let h = harness(&[], false).await;
    mount_unauthorized(&h.server).await;

    let err = h.session.list_all_devices().await.unwrap_err();
    assert!(matches!(err, CoreError::PromptUnavailable { .. }));
    assert_eq!(h.modal.active(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_failures_share_one_prompt() {
    let h = harness_with(&[Some("fresh")], false, true).await;
    mount_devices_for(&h.server, "fresh", &["wg0"]).await;
    mount_unauthorized(&h.server).await;

    let (a, b) = tokio::join!(h.session.list_all_devices(), h.session.list_all_devices());

    assert_eq!(a.unwrap().len(), 1);
    assert_eq!(b.unwrap().len(), 1);
    assert_eq!(h.prompt.calls(), 1);
    assert_eq!(h.session.generation(), 1);
}

// ── Stores and views ────────────────────────────────────────────────

#[tokio::test]
async fn device_list_replaces_previous_contents() {
    let h = harness(&[], false).await;
    let mut dashboard = Dashboard::with_session(h.session.clone());
    dashboard.devices().upsert(wgdash_core::Device {
        name: "stale".into(),
        ..Default::default()
    });

    mount_devices_for(&h.server, "old", &["wg0", "wg1", "wg2"]).await;

    let screen = dashboard.open("/devices").await.unwrap();
    match screen.data {
        ViewData::DeviceList { devices } => {
            let names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, ["wg0", "wg1", "wg2"]);
        }
        other => panic!("expected device list, got {other:?}"),
    }
    assert_eq!(dashboard.devices().len(), 3);
    assert!(dashboard.devices().device("stale").is_none());
    assert!(dashboard.devices().last_refresh().is_some());
}

#[tokio::test]
async fn device_detail_loads_device_and_peers() {
    let h = harness(&[], false).await;
    let mut dashboard = Dashboard::with_session(h.session.clone());

    Mock::given(method("GET"))
        .and(path("/v1/devices/wg0/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_json("wg0")))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/wg0/peers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "public_key": "hSfT+FoPbW4S+Nh5EYyRNmhC1tFfLm7XNgRYn9qZtVA=",
            "url_safe_public_key": "hSfT-FoPbW4S-Nh5EYyRNmhC1tFfLm7XNgRYn9qZtVA=",
            "allowed_ips": ["10.10.0.2/32"],
            "receive_bytes": 100,
            "transmit_bytes": 200
        }])))
        .mount(&h.server)
        .await;

    let screen = dashboard.open("/devices/wg0/").await.unwrap();
    assert_eq!(
        screen.navigation.resolved.view,
        View::DeviceDetail { id: "wg0".into() }
    );
    match screen.data {
        ViewData::DeviceDetail { device, peers } => {
            assert_eq!(device.name, "wg0");
            assert_eq!(peers.len(), 1);
            assert_eq!(peers[0].allowed_ips, vec!["10.10.0.2/32".to_string()]);
        }
        other => panic!("expected device detail, got {other:?}"),
    }
}

#[tokio::test]
async fn unmapped_route_resolves_to_not_found_without_requests() {
    let h = harness(&[], false).await;
    let mut dashboard = Dashboard::with_session(h.session.clone());
    dashboard.devices().upsert(wgdash_core::Device {
        name: "wg0".into(),
        ..Default::default()
    });

    let screen = dashboard.open("/settings/advanced").await.unwrap();

    assert_eq!(screen.navigation.resolved.view, View::NotFound);
    assert!(matches!(screen.data, ViewData::NotFound { ref path } if path == "/404"));
    assert!(dashboard.devices().is_empty());
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rotation_is_announced_and_reload_keeps_the_view() {
    let h = harness(&[Some("fresh")], false).await;
    let mut dashboard = Dashboard::with_session(h.session.clone());
    let mut credentials = dashboard.subscribe_credentials();

    mount_devices_for(&h.server, "fresh", &["wg0"]).await;
    mount_unauthorized(&h.server).await;

    let first = dashboard.open("/devices").await.unwrap();
    assert!(credentials.has_changed().unwrap());
    assert_eq!(credentials.borrow_and_update().generation, 1);

    // Same navigation entry, same store, no second prompt.
    let again = dashboard.reload().await.unwrap().unwrap();
    assert_eq!(again.navigation.resolved, first.navigation.resolved);
    assert_eq!(dashboard.devices().len(), 1);
    assert_eq!(h.prompt.calls(), 1);
    assert!(!credentials.has_changed().unwrap());
}

#[tokio::test]
async fn all_peers_follows_next_links() {
    let h = harness(&[], false).await;
    let peer = |key: &str| json!({ "public_key": key, "allowed_ips": [] });

    Mock::given(method("GET"))
        .and(path("/v1/devices/wg0/peers/"))
        .and(wiremock::matchers::query_param("page", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Link",
                    "</v1/devices/wg0/peers/?page=1&per_page=1>; rel=\"next\"",
                )
                .set_body_json(json!([peer("a")])),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/wg0/peers/"))
        .and(wiremock::matchers::query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([peer("b")])))
        .mount(&h.server)
        .await;

    let query = wgdash_core::PeerQuery {
        page: wgdash_core::PageRequest::new(0, 1),
        ..Default::default()
    };
    let peers = h.session.list_all_peers("wg0", &query).await.unwrap();

    let keys: Vec<_> = peers.iter().map(|p| p.public_key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

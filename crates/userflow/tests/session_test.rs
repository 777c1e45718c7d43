use futures::channel::oneshot;
use serde_json::{Value, json};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use userflow::{Engine, Error, FlowClickEvent, FlowDataSource, FlowSession};

struct StaticSource(Value);

impl FlowDataSource for StaticSource {
    async fn fetch(&self) -> userflow::Result<Value> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

impl FlowDataSource for FailingSource {
    async fn fetch(&self) -> userflow::Result<Value> {
        Err(Error::source_failed("boom"))
    }
}

/// Completes only when the test fires the oneshot, so a second load can start
/// while this one's fetch is in flight.
struct GatedSource {
    rx: Mutex<Option<oneshot::Receiver<Value>>>,
}

impl FlowDataSource for GatedSource {
    async fn fetch(&self) -> userflow::Result<Value> {
        let rx = self
            .rx
            .lock()
            .expect("gate lock")
            .take()
            .expect("fetch called once");
        rx.await
            .map_err(|_| Error::source_failed("gate dropped"))
    }
}

fn two_step_payload() -> Value {
    json!({
        "nodes": [
            {"name": "Landing", "drop": 0},
            {"name": "Signup", "drop": 0},
            {"name": "dropout", "drop": 0}
        ],
        "links": [
            {"source": 0, "target": 1, "value": 900},
            {"source": 0, "target": 2, "value": 300}
        ]
    })
}

#[test]
fn load_renders_a_scene_and_svg() {
    let session = FlowSession::new(Engine::new());
    let source = StaticSource(two_step_payload());

    let rendered = futures::executor::block_on(session.load(&source))
        .expect("load ok")
        .expect("non-empty dataset");
    assert_eq!(rendered.scene.dropout_bars.len(), 1);
    assert_eq!(rendered.scene.ribbons.len(), 1);
    assert!(rendered.svg.contains("<svg"));
    assert!(!session.is_loading());
}

#[test]
fn empty_dataset_skips_rendering_without_error() {
    let session = FlowSession::new(Engine::new());
    let source = StaticSource(json!({"nodes": [], "links": []}));

    let rendered = futures::executor::block_on(session.load(&source)).expect("load ok");
    assert!(rendered.is_none());
}

#[test]
fn fetch_failure_clears_the_loading_flag_and_surfaces_the_error() {
    let session = FlowSession::new(Engine::new());
    let err = futures::executor::block_on(session.load(&FailingSource)).unwrap_err();
    assert!(matches!(err, Error::Source { .. }));
    assert!(!session.is_loading());
}

#[test]
fn malformed_payload_is_a_typed_error() {
    let session = FlowSession::new(Engine::new());
    let source = StaticSource(json!({"resource": "not an array"}));
    let err = futures::executor::block_on(session.load(&source)).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(userflow_core::Error::DataShape { .. })
    ));
}

#[test]
fn stale_load_is_discarded_when_a_newer_load_finishes_first() {
    let session = FlowSession::new(Engine::new());
    let (tx, rx) = oneshot::channel();
    let slow = GatedSource {
        rx: Mutex::new(Some(rx)),
    };

    // Start the slow load and park it at its fetch await.
    let mut slow_load = Box::pin(session.load(&slow));
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);
    assert!(matches!(slow_load.as_mut().poll(&mut cx), Poll::Pending));

    // A newer load completes in the meantime.
    let fast = StaticSource(two_step_payload());
    let newer = futures::executor::block_on(session.load(&fast))
        .expect("load ok")
        .expect("rendered");
    assert_eq!(newer.scene.interactions, 2);

    // The slow fetch now completes, but its generation is stale.
    tx.send(two_step_payload()).expect("gate open");
    let stale = futures::executor::block_on(slow_load).expect("load ok");
    assert!(stale.is_none(), "stale load must be discarded");
}

#[test]
fn stale_load_finishing_leaves_the_loading_flag_set() {
    let session = FlowSession::new(Engine::new());
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);

    let (old_tx, old_rx) = oneshot::channel();
    let old_source = GatedSource {
        rx: Mutex::new(Some(old_rx)),
    };
    let mut old_load = Box::pin(session.load(&old_source));
    assert!(matches!(old_load.as_mut().poll(&mut cx), Poll::Pending));

    let (new_tx, new_rx) = oneshot::channel();
    let new_source = GatedSource {
        rx: Mutex::new(Some(new_rx)),
    };
    let mut new_load = Box::pin(session.load(&new_source));
    assert!(matches!(new_load.as_mut().poll(&mut cx), Poll::Pending));

    // The stale load finishes while the newer one is still at its fetch.
    old_tx.send(two_step_payload()).expect("gate open");
    let stale = futures::executor::block_on(old_load).expect("load ok");
    assert!(stale.is_none());
    assert!(
        session.is_loading(),
        "loading flag must stay set while the newer load is in flight"
    );

    new_tx.send(two_step_payload()).expect("gate open");
    let newer = futures::executor::block_on(new_load).expect("load ok");
    assert!(newer.is_some());
    assert!(!session.is_loading());
}

#[test]
fn clicks_route_through_the_registry_with_the_dropout_flag() {
    let session = FlowSession::new(Engine::new());
    let source = StaticSource(two_step_payload());
    let rendered = futures::executor::block_on(session.load(&source))
        .expect("load ok")
        .expect("rendered");

    let events: Arc<Mutex<Vec<FlowClickEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    session.clicks().register(Arc::new(move |event: &FlowClickEvent| {
        sink.lock().unwrap().push(event.clone());
    }));

    let rect = &rendered.scene.node_rects[0];
    session.report_click(&rendered, rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);

    let bar = &rendered.scene.dropout_bars[0];
    session.report_click(&rendered, bar.x + bar.width / 2.0, bar.y + bar.height / 2.0);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(!events[0].is_dropout);
    assert!(events[1].is_dropout);
    assert_eq!(events[1].node.name, "dropout");

    session.clicks().unregister();
    assert!(!session.clicks().is_registered());
}

#[test]
fn missed_clicks_resolve_to_nothing() {
    let session = FlowSession::new(Engine::new());
    let source = StaticSource(two_step_payload());
    let rendered = futures::executor::block_on(session.load(&source))
        .expect("load ok")
        .expect("rendered");
    assert!(session.report_click(&rendered, -50.0, -50.0).is_none());
}

mod common;

use common::*;
use spawn_sdk::protocol::{self, ActorId, ActorInvocationResponse, StatusCode};
use spawn_sdk::{ActorBuilder, ErrorKind, Noop, SpawnError, Stateless, TypedAny, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn test_set_tag_without_prior_state() {
    let engine = engine(vec![greeter()]);
    let payload = TypedAny::pack(&Tag::new("x")).unwrap();

    let response = engine
        .dispatch(invocation(ActorId::new(SYSTEM, "Greeter"), "SetTag", payload))
        .await
        .unwrap();

    assert_eq!(response.actor_name, "Greeter");
    assert_eq!(response.actor_system, SYSTEM);
    assert!(!response.checkpoint);
    assert_eq!(response.status.status, StatusCode::Ok);
    let state: GreeterState = response.updated_context.state.unwrap().unpack().unwrap();
    assert_eq!(state.tags, vec!["x".to_string()]);
    let ack: Ack = response.value.unpack().unwrap();
    assert_eq!(ack.count, 1);
}

#[tokio::test]
async fn test_prior_state_is_threaded_into_handler() {
    let engine = engine(vec![greeter()]);
    let prior = TypedAny::pack(&GreeterState {
        tags: vec!["a".to_string(), "b".to_string()],
    })
    .unwrap();
    let request = with_state(
        invocation(
            ActorId::new(SYSTEM, "Greeter"),
            "SetTag",
            TypedAny::pack(&Tag::new("c")).unwrap(),
        ),
        prior,
    );

    let response = engine.dispatch(request).await.unwrap();
    let state: GreeterState = response.updated_context.state.unwrap().unpack().unwrap();
    assert_eq!(state.tags, vec!["a", "b", "c"]);
    assert_eq!(response.value.unpack::<Ack>().unwrap().count, 3);
}

#[tokio::test]
async fn test_unknown_action_is_action_not_found() {
    let engine = engine(vec![greeter()]);
    let err = engine
        .dispatch(invocation(ActorId::new(SYSTEM, "Greeter"), "Wave", TypedAny::empty()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SpawnError::ActionNotFound { ref actor, ref action } if actor == "Greeter" && action == "Wave"
    ));
}

#[tokio::test]
async fn test_unknown_actor_without_parent_is_actor_not_found() {
    let engine = engine(vec![greeter()]);
    let err = engine
        .dispatch(invocation(ActorId::new(SYSTEM, "Nobody"), "SetTag", TypedAny::empty()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ActorNotFound);
}

#[tokio::test]
async fn test_spawned_actor_resolves_through_parent() {
    let engine = engine(vec![greeter()]);
    let actor = ActorId::with_parent(SYSTEM, "greeter-7", "Greeter");
    let response = engine
        .dispatch(invocation(actor, "SetTag", TypedAny::pack(&Tag::new("x")).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.actor_name, "greeter-7");
    assert!(engine.instances().get(&spawn_sdk::ActorInstanceKey::new(SYSTEM, "greeter-7")).unwrap().is_some());
}

#[tokio::test]
async fn test_actor_lookup_ignores_case() {
    let engine = engine(vec![greeter()]);
    let response = engine
        .dispatch(invocation(
            ActorId::new(SYSTEM, "greeter"),
            "SetTag",
            TypedAny::pack(&Tag::new("x")).unwrap(),
        ))
        .await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn test_payload_of_wrong_type_is_deserialization_error() {
    let engine = engine(vec![greeter()]);
    let err = engine
        .dispatch(invocation(
            ActorId::new(SYSTEM, "Greeter"),
            "SetTag",
            TypedAny::pack(&Ack { count: 1 }).unwrap(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialization);
}

#[tokio::test]
async fn test_prior_state_of_wrong_type_is_deserialization_error() {
    let engine = engine(vec![greeter()]);
    let request = with_state(
        invocation(ActorId::new(SYSTEM, "Greeter"), "Tags", TypedAny::empty()),
        TypedAny::pack(&Tag::new("not state")).unwrap(),
    );
    let err = engine.dispatch(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialization);
}

#[tokio::test]
async fn test_no_args_action_ignores_payload() {
    let engine = engine(vec![greeter()]);
    let response = engine
        .dispatch(invocation(
            ActorId::new(SYSTEM, "Greeter"),
            "Tags",
            TypedAny::pack(&Ack { count: 9 }).unwrap(),
        ))
        .await
        .unwrap();
    let state: GreeterState = response.value.unpack().unwrap();
    assert!(state.tags.is_empty());
    assert!(response.updated_context.state.is_none());
}

#[tokio::test]
async fn test_payload_action_receives_typed_argument() {
    struct Recorder;
    let seen = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&seen);
    let recorder = ActorBuilder::stateless("Recorder", || Ok(Recorder))
        .action("Record", move |_, _, tag: Tag| {
            sink.lock().unwrap().push(tag.value);
            Ok(Value::<Stateless, Noop>::at())
        })
        .build()
        .unwrap();
    let engine = engine(vec![recorder]);

    let response = engine
        .dispatch(invocation(
            ActorId::new(SYSTEM, "Recorder"),
            "Record",
            TypedAny::pack(&Tag::new("hello")).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
    assert!(response.value.is::<Noop>());
}

static COUNTERS_BUILT: AtomicUsize = AtomicUsize::new(0);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_touch_constructs_one_instance() {
    struct Counter;
    let counter = ActorBuilder::stateless("Counter", || {
        COUNTERS_BUILT.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        Ok(Counter)
    })
    .action_no_args("Touch", |_, _| Ok(Value::<Stateless, Noop>::at()))
    .build()
    .unwrap();
    let engine = engine(vec![counter]);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .dispatch(invocation(ActorId::new("sysA", "Counter"), "Touch", TypedAny::empty()))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(COUNTERS_BUILT.load(Ordering::SeqCst), 1);
    assert_eq!(engine.instances().len().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_calls_to_one_actor_never_overlap() {
    struct Busy {
        inflight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }
    let inflight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (i, p) = (Arc::clone(&inflight), Arc::clone(&peak));
    let busy = ActorBuilder::stateless("Busy", move || {
        Ok(Busy {
            inflight: Arc::clone(&i),
            peak: Arc::clone(&p),
        })
    })
    .action_no_args("Work", |actor: &mut Busy, _| {
        let now = actor.inflight.fetch_add(1, Ordering::SeqCst) + 1;
        actor.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        actor.inflight.fetch_sub(1, Ordering::SeqCst);
        Ok(Value::<Stateless, Noop>::at())
    })
    .build()
    .unwrap();
    let engine = engine(vec![busy]);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .dispatch(invocation(ActorId::new(SYSTEM, "Busy"), "Work", TypedAny::empty()))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_construction_is_retried_next_time() {
    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
    struct Flaky;
    let flaky = ActorBuilder::stateless("Flaky", || {
        if ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(SpawnError::Invocation("first construction fails".to_string()))
        } else {
            Ok(Flaky)
        }
    })
    .action_no_args("Ping", |_, _| Ok(Value::<Stateless, Noop>::at()))
    .build()
    .unwrap();
    let engine = engine(vec![flaky]);
    let call = || invocation(ActorId::new(SYSTEM, "Flaky"), "Ping", TypedAny::empty());

    assert!(engine.dispatch(call()).await.is_err());
    assert_eq!(engine.instances().len().unwrap(), 0);
    assert!(engine.dispatch(call()).await.is_ok());
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_handle_rejects_malformed_envelope() {
    let engine = engine(vec![greeter()]);
    let err = engine.handle(&[0xc1, 0x00, 0x13]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decoding);
}

#[tokio::test]
async fn test_handle_encodes_dispatch_errors_as_status() {
    let engine = engine(vec![greeter()]);

    let missing_actor = protocol::encode(&invocation(
        ActorId::new(SYSTEM, "Nobody"),
        "SetTag",
        TypedAny::empty(),
    ))
    .unwrap();
    let reply: ActorInvocationResponse =
        protocol::decode(&engine.handle(&missing_actor).await.unwrap()).unwrap();
    assert_eq!(reply.status.status, StatusCode::ActorNotFound);
    assert!(reply.value.is::<Noop>());

    let missing_action = protocol::encode(&invocation(
        ActorId::new(SYSTEM, "Greeter"),
        "Wave",
        TypedAny::empty(),
    ))
    .unwrap();
    let reply: ActorInvocationResponse =
        protocol::decode(&engine.handle(&missing_action).await.unwrap()).unwrap();
    assert_eq!(reply.status.status, StatusCode::Error);
    assert!(reply.status.message.contains("Wave"));
}

//! # Scoped Context Walkthroughs
//!
//! End-to-end checks of the context facade as an adapter would drive it:
//! establishing context for a unit of work, temporary overrides, failure and
//! panic restoration, and isolation between tokio tasks.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use ctrk_context::{scope, ContextError, Establish, Field, Overrides, Tracker, TrackerConfig};
use ctrk_core::validate::{extract_timestamp, is_family};
use ctrk_core::Family;
use serde_json::json;

#[test]
fn scenario_override_is_undone_on_exit() {
    scope::reset();
    scope::set(Field::CorrelationId, "id-1");
    scope::set(Field::ActorId, 100);

    scope::run_scoped(
        &Overrides::new()
            .field(Field::CorrelationId, "id-2")
            .field(Field::ActorId, 200),
        || assert_eq!(scope::get(Field::ActorId), Some(json!(200))),
    );

    assert_eq!(scope::get(Field::ActorId), Some(json!(100)));
    assert_eq!(scope::get(Field::CorrelationId), Some(json!("id-1")));
}

#[test]
fn scenario_field_new_in_scope_is_absent_afterwards() {
    scope::reset();
    scope::run_scoped(&Overrides::new(), || scope::set(Field::QueueName, "payments"));
    assert_eq!(scope::get(Field::QueueName), None);
}

#[test]
fn request_lifecycle_through_tracker() {
    scope::reset();
    let tracker = Tracker::new(
        TrackerConfig::default()
            .with_family(Family::TimeOrdered)
            .with_service_name("checkout"),
    );

    let inbound = tracker.resolve_inbound(Some("garbage")).unwrap();
    assert!(is_family(&inbound, Family::TimeOrdered));
    assert!(extract_timestamp(&inbound).is_some());

    let id = tracker
        .establish(
            Establish::new()
                .correlation_id(inbound.clone())
                .field(Field::ActorId, 7)
                .metadata("path", "/cart"),
        )
        .unwrap();
    assert_eq!(id, inbound);

    let exported = tracker.export();
    assert_eq!(exported.get("correlation_id"), Some(&json!(inbound)));
    assert_eq!(exported.get("origin_type"), Some(&json!("http")));
    assert_eq!(exported.get("actor_id"), Some(&json!(7)));
    assert_eq!(exported.get("path"), Some(&json!("/cart")));
    assert!(!exported.contains_key("parent_id"));

    let _span = tracker.span().entered();

    tracker.reset();
    assert!(tracker.export().is_empty());
    assert_eq!(tracker.current_id(), None);
}

#[test]
fn nested_temporary_contexts_restore_in_order() {
    scope::reset();
    let tracker = Tracker::default();
    let root = tracker.establish(Establish::new().origin_type("job")).unwrap();

    tracker
        .with_temporary(Establish::new().parent_id(root.clone()), || {
            let child = tracker.current_id().unwrap();
            assert_ne!(child, root);
            assert_eq!(tracker.parent_id(), Some(root.clone()));
            assert_eq!(tracker.origin_type().as_deref(), Some("http"));

            tracker
                .with_temporary(Establish::new().parent_id(child.clone()), || {
                    assert_eq!(tracker.parent_id(), Some(child.clone()));
                })
                .unwrap();

            assert_eq!(tracker.current_id(), Some(child));
        })
        .unwrap();

    assert_eq!(tracker.current_id(), Some(root));
    assert_eq!(tracker.parent_id(), None);
    assert_eq!(tracker.origin_type().as_deref(), Some("job"));
}

#[test]
fn body_error_is_returned_unchanged() {
    #[derive(Debug, PartialEq)]
    struct PaymentDeclined(u32);

    scope::reset();
    scope::set(Field::CustomerId, "c-1");
    let before = scope::snapshot();

    let outcome = Tracker::default()
        .with_temporary(Establish::new().field(Field::CustomerId, "c-2"), || {
            Err::<(), _>(PaymentDeclined(402))
        })
        .unwrap();

    assert_eq!(outcome, Err(PaymentDeclined(402)));
    assert_eq!(scope::snapshot(), before);
}

#[test]
fn panic_inside_temporary_context_restores_state() {
    scope::reset();
    let tracker = Tracker::default();
    tracker.establish(Establish::new().correlation_id("steady")).unwrap();
    let before = scope::snapshot();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        tracker.with_temporary(Establish::new(), || {
            scope::set_metadata("half_written", true);
            panic!("handler crashed");
        })
    }));

    assert!(result.is_err());
    assert_eq!(scope::snapshot(), before);
}

#[test]
fn unknown_field_names_are_rejected_at_the_boundary() {
    scope::reset();
    let err = Establish::from_named([("favourite_colour", json!("teal"))]).unwrap_err();
    assert_eq!(err, ContextError::UnknownField("favourite_colour".into()));
    assert!(scope::is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_tasks_see_only_their_handoff() {
    let tracker = Tracker::default();
    let mut handles = Vec::new();

    for n in 0..16 {
        scope::reset();
        tracker
            .establish(Establish::new().correlation_id(format!("req-{n}")))
            .unwrap();
        let handoff = tracker.handoff();
        let worker = tracker.clone();
        handles.push(tokio::spawn(scope::in_task(handoff, async move {
            tokio::task::yield_now().await;
            worker.set(Field::TaskType, format!("task-{n}"));
            tokio::time::sleep(Duration::from_millis(1)).await;
            (n, worker.current_id(), worker.get(Field::TaskType))
        })));
    }

    for handle in handles {
        let (n, id, task) = handle.await.unwrap();
        assert_eq!(id, Some(format!("req-{n}")));
        assert_eq!(task, Some(json!(format!("task-{n}"))));
    }
}

#[tokio::test]
async fn async_temporary_context_survives_cancellation() {
    scope::reset();
    let tracker = Tracker::default();
    tracker.establish(Establish::new().correlation_id("outer")).unwrap();
    let before = scope::snapshot();

    let slow = tracker.with_temporary_async(Establish::new(), async {
        scope::set(Field::JobName, "never-finishes");
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    let timed_out = tokio::time::timeout(Duration::from_millis(5), slow).await;

    assert!(timed_out.is_err());
    assert_eq!(scope::snapshot(), before);
    assert_eq!(tracker.current_id().as_deref(), Some("outer"));
}

#[tokio::test]
async fn async_temporary_context_returns_body_output() {
    scope::reset();
    let tracker = Tracker::new(TrackerConfig::default().with_default_origin_type("queue"));
    let seen = tracker
        .with_temporary_async(Establish::new().correlation_id("msg-1"), async {
            tokio::task::yield_now().await;
            (tracker.current_id(), tracker.origin_type())
        })
        .await
        .unwrap();

    assert_eq!(seen, (Some("msg-1".into()), Some("queue".into())));
    assert!(scope::is_empty());
}

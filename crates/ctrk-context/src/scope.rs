//! # Scoped Context — Per-Execution-Unit Store
//!
//! The live [`ContextState`] is bound to the current execution unit:
//!
//! - **Threads** get a lazily created store through `thread_local!`.
//! - **Tokio tasks** get their own store when the future runs under
//!   [`in_task`] (or [`run_scoped_async`]), through `tokio::task_local!`.
//!   A task-bound store takes precedence over the thread's, so a task that
//!   migrates between worker threads keeps its context and never sees the
//!   worker thread's.
//!
//! No store is ever shared between units. Propagation to another unit is by
//! value: take a [`snapshot`] and install it on the other side with
//! [`in_task`].
//!
//! ## Scoping
//!
//! [`run_scoped`] takes a snapshot, applies the overrides, runs the body, and
//! restores the snapshot from a drop guard. The guard runs on normal return,
//! on early return through `?`, and during panic unwinding, so the store after
//! the call always equals the store before it. The body's outcome is returned
//! untouched.
//!
//! [`run_scoped_async`] never mutates the enclosing store at all. It binds a
//! fresh task store seeded with the enclosing contents plus the overrides and
//! drives the body inside it. Whatever the body writes disappears with that
//! store, whether the future completes, fails, or is dropped mid-flight.
//!
//! ## Caveats
//!
//! Outside [`in_task`] every task polled on a worker thread shares that
//! thread's store. Async adapters must wrap each unit of work (each request,
//! job, or consumed message) in [`in_task`] before touching the context.

use std::cell::RefCell;
use std::future::Future;

use serde_json::{Map, Value};

use crate::field::Field;
use crate::state::{ContextSnapshot, ContextState, Overrides};

thread_local! {
    static THREAD_STATE: RefCell<ContextState> = RefCell::new(ContextState::new());
}

tokio::task_local! {
    static TASK_STATE: RefCell<ContextState>;
}

/// Whether the caller is running inside a task-bound store.
pub fn in_task_scope() -> bool {
    TASK_STATE.try_with(|_| ()).is_ok()
}

/// Run `f` against the current unit's store.
///
/// `f` must not call back into this module; the store is mutably borrowed for
/// its duration.
///
/// # Caveats
///
/// When no task store is bound this falls back to the thread store, which
/// every task on the same worker thread sees. Async callers must be running
/// under [`in_task`] for per-task isolation.
pub(crate) fn with_current<R>(f: impl FnOnce(&mut ContextState) -> R) -> R {
    if in_task_scope() {
        TASK_STATE.with(|cell| f(&mut cell.borrow_mut()))
    } else {
        THREAD_STATE.with(|cell| f(&mut cell.borrow_mut()))
    }
}

// ─── Store operations ────────────────────────────────────────────────

/// Read a named field.
pub fn get(field: Field) -> Option<Value> {
    with_current(|state| state.get(field).cloned())
}

/// Write a named field. `Value::Null` clears it.
pub fn set(field: Field, value: impl Into<Value>) {
    let value = value.into();
    with_current(|state| state.set(field, value));
}

/// Remove a named field.
pub fn clear(field: Field) {
    with_current(|state| state.clear(field));
}

/// Read a metadata entry.
pub fn metadata(key: &str) -> Option<Value> {
    with_current(|state| state.metadata(key).cloned())
}

/// Write a metadata entry. `Value::Null` removes it.
pub fn set_metadata(key: impl Into<String>, value: impl Into<Value>) {
    let (key, value) = (key.into(), value.into());
    with_current(|state| state.set_metadata(key, value));
}

/// Apply a batch of writes outside of any scope.
pub fn merge(overrides: &Overrides) {
    with_current(|state| state.merge(overrides));
}

/// Copy the current store.
pub fn snapshot() -> ContextSnapshot {
    with_current(|state| state.snapshot())
}

/// Replace the current store with exactly the snapshot's contents.
pub fn restore(snapshot: ContextSnapshot) {
    with_current(|state| state.restore(snapshot));
}

/// Clear every field and the metadata map. Idempotent.
pub fn reset() {
    with_current(ContextState::reset);
}

/// True in the Empty state.
pub fn is_empty() -> bool {
    with_current(|state| state.is_empty())
}

/// Flat map of metadata plus every present field.
pub fn export() -> Map<String, Value> {
    // Export may log; release the borrow first so subscribers can read the store.
    with_current(|state| state.clone()).export()
}

// ─── Scopes ──────────────────────────────────────────────────────────

/// Restores a snapshot into the current store when dropped.
struct RestoreGuard {
    saved: Option<ContextSnapshot>,
}

impl RestoreGuard {
    fn enter(overrides: &Overrides) -> Self {
        let saved = with_current(|state| {
            let saved = state.snapshot();
            state.merge(overrides);
            saved
        });
        tracing::trace!(has_overrides = !overrides.is_empty(), "context scope enter");
        Self { saved: Some(saved) }
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            with_current(|state| state.restore(saved));
            tracing::trace!(panicking = std::thread::panicking(), "context scope exit");
        }
    }
}

/// Run `body` with `overrides` applied, then restore the prior store.
///
/// Restoration happens on every exit path, including unwinding. The body's
/// return value (or error, if it returns a `Result`) is passed through as-is.
pub fn run_scoped<T>(overrides: &Overrides, body: impl FnOnce() -> T) -> T {
    let guard = RestoreGuard::enter(overrides);
    let out = body();
    drop(guard);
    out
}

/// Async counterpart of [`run_scoped`].
///
/// The body runs in its own task-bound store seeded from the current store
/// plus `overrides`. The enclosing store is never written, so it is unchanged
/// after completion, failure, or cancellation.
pub async fn run_scoped_async<F: Future>(overrides: &Overrides, body: F) -> F::Output {
    let seeded = with_current(|state| {
        let mut seeded = state.clone();
        seeded.merge(overrides);
        seeded
    });
    tracing::trace!(has_overrides = !overrides.is_empty(), "async context scope enter");
    let out = TASK_STATE.scope(RefCell::new(seeded), body).await;
    tracing::trace!("async context scope exit");
    out
}

/// Drive `fut` with its own store initialised from `snapshot`.
///
/// This is how context crosses into a spawned task:
///
/// ```ignore
/// let handoff = ctrk_context::scope::snapshot();
/// tokio::spawn(ctrk_context::scope::in_task(handoff, async move { /* ... */ }));
/// ```
pub fn in_task<F: Future>(snapshot: ContextSnapshot, fut: F) -> impl Future<Output = F::Output> {
    TASK_STATE.scope(RefCell::new(snapshot.into_state()), fut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_scope_override_then_restore() {
        reset();
        set(Field::CorrelationId, "id-1");
        set(Field::ActorId, 100);

        let inner = run_scoped(
            &Overrides::new()
                .field(Field::CorrelationId, "id-2")
                .field(Field::ActorId, 200),
            || get(Field::ActorId),
        );

        assert_eq!(inner, Some(json!(200)));
        assert_eq!(get(Field::ActorId), Some(json!(100)));
        assert_eq!(get(Field::CorrelationId), Some(json!("id-1")));
    }

    #[test]
    fn test_field_first_set_inside_scope_is_absent_after() {
        reset();
        run_scoped(&Overrides::new(), || {
            set(Field::QueueName, "orders");
            set_metadata("retry", 3);
            assert_eq!(get(Field::QueueName), Some(json!("orders")));
        });
        assert_eq!(get(Field::QueueName), None);
        assert_eq!(metadata("retry"), None);
        assert!(is_empty());
    }

    #[test]
    fn test_error_propagates_and_state_restored() {
        reset();
        set(Field::JobName, "Outer");
        let before = snapshot();

        let result: Result<(), String> = run_scoped(
            &Overrides::new().field(Field::JobName, "Inner"),
            || {
                set(Field::TaskType, "cleanup");
                Err("boom".to_string())
            },
        );

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(snapshot(), before);
    }

    #[test]
    fn test_panic_restores_state() {
        reset();
        set(Field::CorrelationId, "stable");
        let before = snapshot();

        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            run_scoped(&Overrides::new().field(Field::CorrelationId, "doomed"), || {
                set(Field::DeviceId, "phone");
                panic!("body failed");
            })
        }));

        assert!(caught.is_err());
        assert_eq!(snapshot(), before);
    }

    #[test]
    fn test_nested_scopes_unwind_like_a_stack() {
        reset();
        set(Field::OriginType, "http");
        let outer_before = snapshot();

        run_scoped(&Overrides::new().field(Field::OriginType, "job"), || {
            let inner_before = snapshot();
            let seen = run_scoped(&Overrides::new().field(Field::OriginType, "queue"), || {
                get(Field::OriginType)
            });
            assert_eq!(seen, Some(json!("queue")));
            assert_eq!(snapshot(), inner_before);
        });

        assert_eq!(snapshot(), outer_before);
    }

    #[test]
    fn test_reset_twice_is_empty() {
        set(Field::EmailType, "receipt");
        reset();
        let once = snapshot();
        reset();
        assert_eq!(snapshot(), once);
        assert!(is_empty());
    }

    #[test]
    fn test_threads_do_not_share_stores() {
        reset();
        set(Field::CorrelationId, "main-thread");
        let other = std::thread::spawn(|| get(Field::CorrelationId)).join().unwrap();
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn test_async_scope_leaves_enclosing_store_untouched() {
        reset();
        set(Field::CorrelationId, "outer");
        let before = snapshot();

        let seen = run_scoped_async(
            &Overrides::new().field(Field::ActorId, 9),
            async {
                tokio::task::yield_now().await;
                set(Field::QueueName, "inner-only");
                (get(Field::CorrelationId), get(Field::ActorId))
            },
        )
        .await;

        assert_eq!(seen, (Some(json!("outer")), Some(json!(9))));
        assert_eq!(snapshot(), before);
    }

    #[tokio::test]
    async fn test_in_task_binds_snapshot() {
        reset();
        set(Field::CorrelationId, "handed-off");
        let handoff = snapshot();
        reset();

        let seen = tokio::spawn(in_task(handoff, async {
            assert!(in_task_scope());
            get(Field::CorrelationId)
        }))
        .await
        .unwrap();

        assert_eq!(seen, Some(json!("handed-off")));
        assert!(!in_task_scope());
        assert!(is_empty());
    }

    #[tokio::test]
    async fn test_unbound_tasks_share_worker_thread_store() {
        reset();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                tokio::task::spawn_local(async { set(Field::CorrelationId, "leaked") })
                    .await
                    .unwrap();
                let unbound = tokio::task::spawn_local(async { get(Field::CorrelationId) })
                    .await
                    .unwrap();
                let bound = tokio::task::spawn_local(in_task(ContextSnapshot::default(), async {
                    get(Field::CorrelationId)
                }))
                .await
                .unwrap();

                assert_eq!(unbound, Some(json!("leaked")));
                assert_eq!(bound, None);
            })
            .await;
        reset();
    }
}

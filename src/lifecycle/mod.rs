//! Record lifecycle callbacks.
//!
//! Persistence layers expose their lifecycle points through [`LifecycleHooks`];
//! [`HookRegistry`] is the implementation used by [`RecordModel`](crate::RecordModel).

use crate::core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{Level, event};

/// Points in a record's life at which callbacks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// An in-memory instance was constructed or loaded from storage.
    AfterInitialize,
    /// The first create of the instance is about to be sent to storage.
    BeforeCreate,
    /// An update of an already stored instance is about to be sent.
    BeforeUpdate,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AfterInitialize => "after_initialize",
            Self::BeforeCreate => "before_create",
            Self::BeforeUpdate => "before_update",
        };
        f.write_str(name)
    }
}

pub type LifecycleCallback<R> = Arc<dyn Fn(&mut R) -> Result<()> + Send + Sync>;

/// Capability to attach callbacks to lifecycle events of records of type `R`.
///
/// Callbacks are identified by key. Registering a key that already exists
/// replaces the earlier callback, whatever event it was bound to.
pub trait LifecycleHooks<R> {
    /// Registers `callback` for `event`. Returns the event the replaced
    /// callback was bound to, if any.
    fn register_hook(
        &mut self,
        key: String,
        event: LifecycleEvent,
        callback: LifecycleCallback<R>,
    ) -> Option<LifecycleEvent>;

    /// Removes the callback registered under `key`.
    fn remove_hook(&mut self, key: &str) -> bool;
}

struct RegisteredHook<R> {
    key: String,
    event: LifecycleEvent,
    callback: LifecycleCallback<R>,
}

impl<R> Clone for RegisteredHook<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            event: self.event,
            callback: Arc::clone(&self.callback),
        }
    }
}

/// Ordered set of keyed lifecycle callbacks.
pub struct HookRegistry<R> {
    hooks: Vec<RegisteredHook<R>>,
}

impl<R> Default for HookRegistry<R> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<R> Clone for HookRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<R> fmt::Debug for HookRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| (&hook.key, hook.event)))
            .finish()
    }
}

impl<R> HookRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Event the callback under `key` is bound to.
    pub fn event_of(&self, key: &str) -> Option<LifecycleEvent> {
        self.hooks
            .iter()
            .find(|hook| hook.key == key)
            .map(|hook| hook.event)
    }

    /// Keys bound to `event`, in run order.
    pub fn keys_for(&self, event: LifecycleEvent) -> Vec<&str> {
        self.hooks
            .iter()
            .filter(|hook| hook.event == event)
            .map(|hook| hook.key.as_str())
            .collect()
    }

    /// Runs every callback bound to `event` in registration order, stopping at
    /// the first error.
    pub fn run(&self, lifecycle_event: LifecycleEvent, record: &mut R) -> Result<()> {
        for hook in self.hooks.iter().filter(|hook| hook.event == lifecycle_event) {
            event!(Level::TRACE, hook = %hook.key, event = %lifecycle_event, "running lifecycle hook");
            (hook.callback)(&mut *record)?;
        }
        Ok(())
    }
}

impl<R> LifecycleHooks<R> for HookRegistry<R> {
    fn register_hook(
        &mut self,
        key: String,
        event: LifecycleEvent,
        callback: LifecycleCallback<R>,
    ) -> Option<LifecycleEvent> {
        let existing = self.hooks.iter().position(|hook| hook.key == key);
        let replaced = existing.map(|index| self.hooks.remove(index).event);

        self.hooks.push(RegisteredHook {
            key,
            event,
            callback,
        });
        replaced
    }

    fn remove_hook(&mut self, key: &str) -> bool {
        let len_before = self.hooks.len();
        self.hooks.retain(|hook| hook.key != key);
        len_before != self.hooks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TokenError;

    fn push(label: &'static str) -> LifecycleCallback<Vec<&'static str>> {
        Arc::new(move |log: &mut Vec<&'static str>| {
            log.push(label);
            Ok(())
        })
    }

    #[test]
    fn test_runs_only_matching_event_in_order() {
        let mut hooks = HookRegistry::new();
        hooks.register_hook("a".into(), LifecycleEvent::BeforeCreate, push("a"));
        hooks.register_hook("b".into(), LifecycleEvent::AfterInitialize, push("b"));
        hooks.register_hook("c".into(), LifecycleEvent::BeforeCreate, push("c"));

        let mut log = Vec::new();
        hooks.run(LifecycleEvent::BeforeCreate, &mut log).unwrap();
        assert_eq!(log, vec!["a", "c"]);

        log.clear();
        hooks.run(LifecycleEvent::BeforeUpdate, &mut log).unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_register_same_key_replaces() {
        let mut hooks = HookRegistry::new();
        assert_eq!(
            hooks.register_hook("k".into(), LifecycleEvent::BeforeCreate, push("first")),
            None
        );
        assert_eq!(
            hooks.register_hook("k".into(), LifecycleEvent::AfterInitialize, push("second")),
            Some(LifecycleEvent::BeforeCreate)
        );
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks.event_of("k"), Some(LifecycleEvent::AfterInitialize));

        let mut log = Vec::new();
        hooks.run(LifecycleEvent::BeforeCreate, &mut log).unwrap();
        hooks.run(LifecycleEvent::AfterInitialize, &mut log).unwrap();
        assert_eq!(log, vec!["second"]);
    }

    #[test]
    fn test_remove_hook() {
        let mut hooks = HookRegistry::new();
        hooks.register_hook("k".into(), LifecycleEvent::BeforeCreate, push("k"));
        assert!(hooks.remove_hook("k"));
        assert!(!hooks.remove_hook("k"));
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_stops_at_first_error() {
        let mut hooks: HookRegistry<Vec<&'static str>> = HookRegistry::new();
        hooks.register_hook("a".into(), LifecycleEvent::BeforeCreate, push("a"));
        hooks.register_hook(
            "fail".into(),
            LifecycleEvent::BeforeCreate,
            Arc::new(|_: &mut Vec<&'static str>| {
                Err(TokenError::RandomSource("exhausted".into()))
            }),
        );
        hooks.register_hook("b".into(), LifecycleEvent::BeforeCreate, push("b"));

        let mut log = Vec::new();
        let err = hooks.run(LifecycleEvent::BeforeCreate, &mut log).unwrap_err();
        assert!(matches!(err, TokenError::RandomSource(_)));
        assert_eq!(log, vec!["a"]);
        assert_eq!(hooks.keys_for(LifecycleEvent::BeforeCreate), vec!["a", "fail", "b"]);
    }
}

//! The process-wide awaiting-response table.
//!
//! Commands that ask a question ("type /yes to confirm") park a one-shot
//! handler here under the token they expect. A later command line whose name
//! matches no registered command is delivered to that handler instead.

use super::Invocation;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// A one-shot reply handler.
pub type ResponseHandler = Box<dyn FnOnce(Invocation) -> anyhow::Result<()> + Send>;

#[derive(Default)]
pub struct AwaitingResponses {
    pending: Mutex<HashMap<String, ResponseHandler>>,
}

impl AwaitingResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `handler` under `key`, replacing any handler already waiting there.
    pub fn register(
        &self,
        key: impl Into<String>,
        handler: impl FnOnce(Invocation) -> anyhow::Result<()> + Send + 'static,
    ) {
        let key = key.into().to_lowercase();
        self.lock().insert(key, Box::new(handler));
    }

    /// Removes the handler for `key` and hands it to the caller.
    pub fn take(&self, key: &str) -> Option<ResponseHandler> {
        self.lock().remove(&key.to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ResponseHandler>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Actor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn invocation() -> Invocation {
        Invocation {
            raw: "yes".into(),
            silent: false,
            actor: Actor::console(),
            args: Vec::new(),
            log: false,
        }
    }

    #[test]
    fn take_removes_the_entry() {
        let table = AwaitingResponses::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        table.register("yes", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(table.contains("YES"));
        let handler = table.take("yes").expect("handler registered");
        handler(invocation()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(table.take("yes").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn register_replaces_previous_handler() {
        let table = AwaitingResponses::new();
        table.register("yes", |_| anyhow::bail!("old"));
        table.register("yes", |_| Ok(()));
        assert_eq!(table.len(), 1);
        let handler = table.take("yes").expect("handler registered");
        assert!(handler(invocation()).is_ok());
    }
}

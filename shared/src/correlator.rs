use std::collections::HashMap;

use log::warn;

use crate::types::RequestId;

/// Work to run when a request completes. The context is handed back in at
/// invocation time, so continuations only ever capture owned state.
pub type Continuation<C, T> = Box<dyn FnOnce(&mut C, T)>;

/// Maps in-flight [`RequestId`]s to the continuation waiting on each of them.
///
/// Every registered continuation runs at most once: it is removed from the
/// map before it is invoked, so a continuation is free to register new
/// requests on the same correlator.
pub struct RequestCorrelator<C, T> {
    label: &'static str,
    pending: HashMap<RequestId, Continuation<C, T>>,
}

impl<C, T> RequestCorrelator<C, T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            pending: HashMap::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Registers `continuation` for `request_id`, replacing (and dropping)
    /// any continuation already registered under the same id
    pub fn register(&mut self, request_id: RequestId, continuation: Continuation<C, T>) {
        if self.pending.insert(request_id, continuation).is_some() {
            warn!(
                "{}: request {} was registered twice, the earlier continuation is dropped",
                self.label, request_id
            );
        }
    }

    /// Removes and returns the continuation for `request_id`
    pub fn take(&mut self, request_id: RequestId) -> Option<Continuation<C, T>> {
        let continuation = self.pending.remove(&request_id);
        if continuation.is_none() {
            warn!(
                "{}: received unexpected completion for request {}",
                self.label, request_id
            );
        }
        continuation
    }

    /// Invokes the continuation registered for `request_id` with `result`.
    /// Returns false when nothing was registered.
    pub fn resolve(&mut self, context: &mut C, request_id: RequestId, result: T) -> bool {
        match self.take(request_id) {
            Some(continuation) => {
                continuation(context, result);
                true
            }
            None => false,
        }
    }

    /// Forgets `request_id` without invoking its continuation
    pub fn drop_request(&mut self, request_id: RequestId) -> bool {
        self.pending.remove(&request_id).is_some()
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.pending.contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn request_ids(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.pending.keys().copied()
    }

    /// Drops every pending continuation, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Per-request state threaded through the hook pipeline. Hooks communicate
/// with hooks that run after them by setting typed entries here rather than
/// through a request/response field, since not every entry applies to every
/// request kind.
#[derive(Default)]
pub struct Context {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: ContextKey>(&mut self, value: K::Value) {
        self.entries.insert(TypeId::of::<K>(), Box::new(value));
    }

    #[must_use]
    pub fn get<K: ContextKey>(&self) -> Option<&K::Value> {
        self.entries.get(&TypeId::of::<K>()).and_then(|v| v.downcast_ref::<K::Value>())
    }

    #[must_use]
    pub fn flag<K: ContextKey<Value = bool>>(&self) -> bool {
        self.get::<K>().copied().unwrap_or(false)
    }
}

/// A typed key into a [`Context`]. Implementors are zero-sized marker types;
/// the key's identity is its `TypeId`, and `Value` fixes what can be stored
/// under it.
pub trait ContextKey: 'static {
    type Value: Send + Sync + 'static;
}

/// Set by a hook to suppress the swarm-interaction post-hook, e.g. when a
/// client-approval rejection means the request never reached the store.
pub struct SkipSwarmInteractionKey;
impl ContextKey for SkipSwarmInteractionKey {
    type Value = bool;
}

/// Set by a hook to suppress the response-assembly pre-hook.
pub struct SkipResponseHookKey;
impl ContextKey for SkipResponseHookKey {
    type Value = bool;
}

/// Populated by the frontend ahead of a scrape to tell hooks which address
/// family's swarm to read.
pub struct ScrapeIsIPv6Key;
impl ContextKey for ScrapeIsIPv6Key {
    type Value = bool;
}

/// Set by the sanitize hook to the clamped, defaulted `num_want` so that the
/// response hook doesn't need to re-derive it from the raw request field.
pub struct NumWantKey;
impl ContextKey for NumWantKey {
    type Value = usize;
}

#[cfg(test)]
mod tests {
    use super::{Context, ContextKey, SkipResponseHookKey, SkipSwarmInteractionKey};

    #[test]
    fn unset_flags_default_to_false() {
        let ctx = Context::new();
        assert!(!ctx.flag::<SkipSwarmInteractionKey>());
        assert!(!ctx.flag::<SkipResponseHookKey>());
    }

    #[test]
    fn a_hook_can_signal_a_downstream_hook_through_the_context() {
        let mut ctx = Context::new();
        ctx.set::<SkipResponseHookKey>(true);
        assert!(ctx.flag::<SkipResponseHookKey>());
        assert!(!ctx.flag::<SkipSwarmInteractionKey>());
    }

    struct CountKey;
    impl ContextKey for CountKey {
        type Value = u32;
    }

    #[test]
    fn non_boolean_values_round_trip_through_get() {
        let mut ctx = Context::new();
        ctx.set::<CountKey>(7);
        assert_eq!(ctx.get::<CountKey>(), Some(&7));
    }
}

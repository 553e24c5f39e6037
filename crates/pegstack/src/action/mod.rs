//! Semantic actions
//!
//! An [`Action`] is user code embedded in a grammar. It runs synchronously
//! when the engine reaches it inside a sequence, after every element before
//! it matched, and works on the parse's [`ValueStack`] through an
//! [`ActionContext`].
//!
//! Actions return `Ok(true)` to continue, `Ok(false)` to make the enclosing
//! sequence fail like a mismatch, or an [`ActionError`](crate::ActionError)
//! to abort the whole parse.
//!
//! Stack changes made by actions in a failed choice alternative stay in
//! place; only lookahead probes (`Not`/`Test`) roll the stack back.
//!
//! Besides the stack, actions can keep state in [`RuleVar`]s. Every rule
//! invocation starts with all of them unset, and an action sees the ones of
//! the innermost rule it runs in, so recursive rules do not share values.

mod context;
mod stack;
mod vars;

pub use context::ActionContext;
pub use stack::ValueStack;
pub use vars::RuleVar;
pub(crate) use vars::RuleVars;

use std::fmt;
use std::sync::Arc;

use crate::error::ActionError;

/// Outcome of running an action
pub type ActionResult = Result<bool, ActionError>;

type ActionFn<V> = dyn Fn(&mut ActionContext<'_, V>) -> ActionResult + Send + Sync;

/// A shareable action callback
pub struct Action<V> {
    run: Arc<ActionFn<V>>,
}

impl<V> Action<V> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, V>) -> ActionResult + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    pub(crate) fn call(&self, ctx: &mut ActionContext<'_, V>) -> ActionResult {
        (self.run)(ctx)
    }
}

impl<V> Clone for Action<V> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<V> fmt::Debug for Action<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

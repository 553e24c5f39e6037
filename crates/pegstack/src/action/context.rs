use std::any::type_name;

use super::vars::{RuleVar, RuleVars};
use super::ValueStack;
use crate::error::ActionError;
use crate::input::Span;

/// What an action sees when it runs
///
/// Inside a sequence, the "match" is the text consumed by the element right
/// before the action. An action at the start of a sequence, or outside one,
/// sees an empty match at the current position.
pub struct ActionContext<'a, V> {
    stack: &'a mut ValueStack<V>,
    vars: &'a mut RuleVars,
    text: &'a str,
    matched: Span,
    synthetic: bool,
    recovering: bool,
}

impl<'a, V> ActionContext<'a, V> {
    pub(crate) fn new(
        stack: &'a mut ValueStack<V>,
        vars: &'a mut RuleVars,
        text: &'a str,
        matched: Span,
        synthetic: bool,
        recovering: bool,
    ) -> Self {
        Self {
            stack,
            vars,
            text,
            matched,
            synthetic,
            recovering,
        }
    }

    /// Text consumed by the preceding element
    #[must_use]
    pub fn match_text(&self) -> &'a str {
        self.matched.slice(self.text)
    }

    /// The preceding element's text, or `default` if that element was
    /// stood in for during error recovery.
    ///
    /// Number conversions written as `match_or_default("0")` keep working on
    /// recovered input where the digits are missing.
    #[must_use]
    pub fn match_or_default<'d>(&self, default: &'d str) -> &'d str
    where
        'a: 'd,
    {
        if self.synthetic {
            default
        } else {
            self.match_text()
        }
    }

    /// First character of the preceding match
    #[must_use]
    pub fn matched_char(&self) -> Option<char> {
        self.match_text().chars().next()
    }

    #[must_use]
    pub const fn match_range(&self) -> Span {
        self.matched
    }

    /// Whether the preceding element was stood in for during error recovery
    #[must_use]
    pub const fn match_is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Current offset in the parsed text
    #[must_use]
    pub const fn position(&self) -> usize {
        self.matched.end()
    }

    /// Whether this action runs during the error-recovery pass
    #[must_use]
    pub const fn in_recovery(&self) -> bool {
        self.recovering
    }

    /// The whole text being parsed
    #[must_use]
    pub const fn input(&self) -> &'a str {
        self.text
    }

    /// Value of `var` in the current rule invocation, if set
    #[must_use]
    pub fn get<T: 'static>(&self, var: RuleVar<T>) -> Option<&T> {
        self.vars.get(var)
    }

    /// Set `var` for the rest of the current rule invocation.
    pub fn set<T: 'static>(&mut self, var: RuleVar<T>, value: T) {
        self.vars.set(var, value);
    }

    pub fn take<T: 'static>(&mut self, var: RuleVar<T>) -> Option<T> {
        self.vars.take(var)
    }

    #[must_use]
    pub fn stack(&self) -> &ValueStack<V> {
        &*self.stack
    }

    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, value: V) {
        self.stack.push(value);
    }

    pub fn push_all(&mut self, values: impl IntoIterator<Item = V>) {
        self.stack.push_all(values);
    }

    /// # Errors
    ///
    /// Underflow if the stack holds fewer than `down` values.
    pub fn push_at(&mut self, down: usize, value: V) -> Result<(), ActionError> {
        self.stack.push_at(down, value)
    }

    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn peek(&self) -> Result<&V, ActionError> {
        self.stack.peek()
    }

    /// # Errors
    ///
    /// Underflow if the stack holds `down` values or fewer.
    pub fn peek_at(&self, down: usize) -> Result<&V, ActionError> {
        self.stack.peek_at(down)
    }

    /// # Errors
    ///
    /// Underflow with fewer than two values.
    pub fn swap(&mut self) -> Result<(), ActionError> {
        self.stack.swap()
    }

    /// # Errors
    ///
    /// Underflow with fewer than three values.
    pub fn swap3(&mut self) -> Result<(), ActionError> {
        self.stack.swap3()
    }

    /// # Errors
    ///
    /// Underflow if the stack holds fewer than `count` values.
    pub fn reverse_top(&mut self, count: usize) -> Result<(), ActionError> {
        self.stack.reverse_top(count)
    }
}

impl<V: Clone> ActionContext<'_, V> {
    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn pop(&mut self) -> Result<V, ActionError> {
        self.stack.pop()
    }

    /// # Errors
    ///
    /// Underflow if the stack holds `down` values or fewer.
    pub fn pop_at(&mut self, down: usize) -> Result<V, ActionError> {
        self.stack.pop_at(down)
    }

    /// Pop the top value and convert it.
    ///
    /// # Errors
    ///
    /// Underflow on an empty stack, or a type mismatch when the conversion
    /// fails.
    pub fn pop_as<T>(&mut self) -> Result<T, ActionError>
    where
        T: TryFrom<V>,
        T::Error: std::fmt::Display,
    {
        let value = self.stack.pop()?;
        T::try_from(value).map_err(|err| ActionError::TypeMismatch {
            expected: type_name::<T>(),
            detail: err.to_string(),
        })
    }

    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn poke(&mut self, value: V) -> Result<V, ActionError> {
        self.stack.poke(value)
    }

    /// # Errors
    ///
    /// Underflow if the stack holds `down` values or fewer.
    pub fn poke_at(&mut self, down: usize, value: V) -> Result<V, ActionError> {
        self.stack.poke_at(down, value)
    }

    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn dup(&mut self) -> Result<(), ActionError> {
        self.stack.dup()
    }

    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn discard(&mut self) -> Result<(), ActionError> {
        self.stack.discard()
    }
}

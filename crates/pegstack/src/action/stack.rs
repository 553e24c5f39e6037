use crate::error::ActionError;

/// Inverse of one stack mutation
#[derive(Debug)]
enum Undo<V> {
    Pop,
    Push(V),
    Insert(usize, V),
    Remove(usize),
    Set(usize, V),
    Reverse(usize, usize),
}

/// Opened by [`ValueStack::begin_probe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProbeMark(usize);

/// The value stack of one parse
///
/// Actions push and pop values as their matchers succeed; whatever is left
/// when the parse ends is its result. Depth arguments count from the top:
/// `0` is the most recently pushed value.
///
/// Mutations made while a lookahead probe is open are journaled and undone
/// when the probe closes, so `Not`/`Test` never leave values behind.
#[derive(Debug)]
pub struct ValueStack<V> {
    values: Vec<V>,
    journal: Vec<Undo<V>>,
    probes: usize,
}

impl<V> Default for ValueStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ValueStack<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            journal: Vec::new(),
            probes: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from the bottom of the stack to the top
    #[must_use]
    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<V> {
        self.values
    }

    /// Index from the bottom of the value `down` entries below the top
    fn index_of(&self, operation: &'static str, down: usize) -> Result<usize, ActionError> {
        let len = self.values.len();
        if down < len {
            Ok(len - 1 - down)
        } else {
            Err(ActionError::underflow(operation, down + 1, len))
        }
    }

    fn record(&mut self, undo: Undo<V>) {
        if self.probes > 0 {
            self.journal.push(undo);
        }
    }

    pub fn push(&mut self, value: V) {
        self.values.push(value);
        self.record(Undo::Pop);
    }

    pub fn push_all(&mut self, values: impl IntoIterator<Item = V>) {
        for value in values {
            self.push(value);
        }
    }

    /// Insert `value` so that it ends up `down` entries below the top.
    ///
    /// # Errors
    ///
    /// Underflow if the stack holds fewer than `down` values.
    pub fn push_at(&mut self, down: usize, value: V) -> Result<(), ActionError> {
        let len = self.values.len();
        if down > len {
            return Err(ActionError::underflow("push_at", down, len));
        }
        let index = len - down;
        self.values.insert(index, value);
        self.record(Undo::Remove(index));
        Ok(())
    }

    /// The top value
    ///
    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn peek(&self) -> Result<&V, ActionError> {
        self.peek_at(0)
    }

    /// The value `down` entries below the top
    ///
    /// # Errors
    ///
    /// Underflow if the stack holds `down` values or fewer.
    pub fn peek_at(&self, down: usize) -> Result<&V, ActionError> {
        let index = self.index_of("peek", down)?;
        Ok(&self.values[index])
    }

    /// Reverse the order of the top `count` values.
    ///
    /// # Errors
    ///
    /// Underflow if the stack holds fewer than `count` values.
    pub fn reverse_top(&mut self, count: usize) -> Result<(), ActionError> {
        let len = self.values.len();
        if count > len {
            return Err(ActionError::underflow("swap", count, len));
        }
        let start = len - count;
        self.values[start..].reverse();
        self.record(Undo::Reverse(start, count));
        Ok(())
    }

    /// Exchange the top two values.
    ///
    /// # Errors
    ///
    /// Underflow with fewer than two values.
    pub fn swap(&mut self) -> Result<(), ActionError> {
        self.reverse_top(2)
    }

    /// Reverse the top three values.
    ///
    /// # Errors
    ///
    /// Underflow with fewer than three values.
    pub fn swap3(&mut self) -> Result<(), ActionError> {
        self.reverse_top(3)
    }

    pub(crate) fn begin_probe(&mut self) -> ProbeMark {
        self.probes += 1;
        ProbeMark(self.journal.len())
    }

    /// Close a probe keeping its changes.
    pub(crate) fn commit_probe(&mut self, mark: ProbeMark) {
        self.probes = self.probes.saturating_sub(1);
        if self.probes == 0 {
            self.journal.truncate(mark.0);
        }
    }

    /// Undo everything recorded since `mark` and close the probe.
    pub(crate) fn end_probe(&mut self, mark: ProbeMark) {
        while self.journal.len() > mark.0 {
            let Some(undo) = self.journal.pop() else {
                break;
            };
            match undo {
                Undo::Pop => {
                    self.values.pop();
                }
                Undo::Push(value) => self.values.push(value),
                Undo::Insert(index, value) => self.values.insert(index, value),
                Undo::Remove(index) => {
                    self.values.remove(index);
                }
                Undo::Set(index, value) => self.values[index] = value,
                Undo::Reverse(start, count) => self.values[start..start + count].reverse(),
            }
        }
        self.probes = self.probes.saturating_sub(1);
    }
}

impl<V: Clone> ValueStack<V> {
    /// Remove and return the top value.
    ///
    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn pop(&mut self) -> Result<V, ActionError> {
        let value = self
            .values
            .pop()
            .ok_or(ActionError::underflow("pop", 1, 0))?;
        if self.probes > 0 {
            self.journal.push(Undo::Push(value.clone()));
        }
        Ok(value)
    }

    /// Remove and return the value `down` entries below the top.
    ///
    /// # Errors
    ///
    /// Underflow if the stack holds `down` values or fewer.
    pub fn pop_at(&mut self, down: usize) -> Result<V, ActionError> {
        let index = self.index_of("pop", down)?;
        let value = self.values.remove(index);
        if self.probes > 0 {
            self.journal.push(Undo::Insert(index, value.clone()));
        }
        Ok(value)
    }

    /// Replace the top value, returning the old one.
    ///
    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn poke(&mut self, value: V) -> Result<V, ActionError> {
        self.poke_at(0, value)
    }

    /// Replace the value `down` entries below the top, returning the old one.
    ///
    /// # Errors
    ///
    /// Underflow if the stack holds `down` values or fewer.
    pub fn poke_at(&mut self, down: usize, value: V) -> Result<V, ActionError> {
        let index = self.index_of("poke", down)?;
        let old = std::mem::replace(&mut self.values[index], value);
        if self.probes > 0 {
            self.journal.push(Undo::Set(index, old.clone()));
        }
        Ok(old)
    }

    /// Push a copy of the top value.
    ///
    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn dup(&mut self) -> Result<(), ActionError> {
        let top = self.peek().map_err(|_| ActionError::underflow("dup", 1, 0))?.clone();
        self.push(top);
        Ok(())
    }

    /// Pop the top value and throw it away.
    ///
    /// # Errors
    ///
    /// Underflow on an empty stack.
    pub fn discard(&mut self) -> Result<(), ActionError> {
        self.pop().map(drop)
    }
}

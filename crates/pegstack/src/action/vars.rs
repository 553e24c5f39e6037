use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// A typed variable scoped to one rule invocation
///
/// Handed out by [`GrammarBuilder::var`](crate::GrammarBuilder::var) and
/// read or written by actions through
/// [`ActionContext::get`](crate::ActionContext::get) and
/// [`ActionContext::set`](crate::ActionContext::set).
pub struct RuleVar<T> {
    id: u32,
    _type: PhantomData<fn() -> T>,
}

impl<T> RuleVar<T> {
    pub(crate) const fn new(id: u32) -> Self {
        Self {
            id,
            _type: PhantomData,
        }
    }
}

impl<T> Clone for RuleVar<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RuleVar<T> {}

impl<T> PartialEq for RuleVar<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for RuleVar<T> {}

impl<T> fmt::Debug for RuleVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleVar({})", self.id)
    }
}

/// Values of rule variables, one frame per active rule invocation
#[derive(Default)]
pub(crate) struct RuleVars {
    values: Vec<(u32, Box<dyn Any>)>,
    frames: Vec<usize>,
}

impl RuleVars {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&mut self) {
        self.frames.push(self.values.len());
    }

    pub(crate) fn exit(&mut self) {
        if let Some(start) = self.frames.pop() {
            self.values.truncate(start);
        }
    }

    fn frame(&self) -> &[(u32, Box<dyn Any>)] {
        let start = self.frames.last().copied().unwrap_or(0);
        &self.values[start..]
    }

    pub(crate) fn get<T: 'static>(&self, var: RuleVar<T>) -> Option<&T> {
        self.frame()
            .iter()
            .find(|(id, _)| *id == var.id)
            .and_then(|(_, value)| value.downcast_ref::<T>())
    }

    pub(crate) fn set<T: 'static>(&mut self, var: RuleVar<T>, value: T) {
        let start = self.frames.last().copied().unwrap_or(0);
        let value: Box<dyn Any> = Box::new(value);
        match self.values[start..].iter_mut().find(|(id, _)| *id == var.id) {
            Some(slot) => slot.1 = value,
            None => self.values.push((var.id, value)),
        }
    }

    pub(crate) fn take<T: 'static>(&mut self, var: RuleVar<T>) -> Option<T> {
        let start = self.frames.last().copied().unwrap_or(0);
        let index = self.values[start..].iter().position(|(id, _)| *id == var.id)?;
        let (_, value) = self.values.remove(start + index);
        value.downcast::<T>().ok().map(|value| *value)
    }
}

impl fmt::Debug for RuleVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleVars")
            .field("values", &self.values.len())
            .field("frames", &self.frames.len())
            .finish()
    }
}

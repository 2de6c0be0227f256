//! Replace vs. streaming update buffering.
//!
//! A directive pushes every new options array into an [`UpdateBuffer`]. In
//! replace mode the array becomes the whole working set; in streaming mode it
//! is appended. The next update pass drains the buffer with
//! [`UpdateBuffer::take_update`] and either swaps the provider-side set or
//! adds only what arrived since the last pass.

/// What an update pass has to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Update<T> {
    /// Swap the entire set
    Replace(Vec<T>),
    /// Add to the current set
    Append(Vec<T>),
}

impl<T> Update<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Self::Replace(items) | Self::Append(items) => items,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace(_))
    }

    /// Same kind of update over different items.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Update<U> {
        match self {
            Self::Replace(items) => Update::Replace(items.into_iter().map(f).collect()),
            Self::Append(items) => Update::Append(items.into_iter().map(f).collect()),
        }
    }

    pub fn with_items<U>(&self, items: Vec<U>) -> Update<U> {
        match self {
            Self::Replace(_) => Update::Replace(items),
            Self::Append(_) => Update::Append(items),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuffer<T> {
    cumulative: Vec<T>,
    pending: Option<Update<T>>,
    streaming: bool,
}

impl<T: Clone> UpdateBuffer<T> {
    pub fn new(streaming: bool) -> Self {
        Self {
            cumulative: Vec::new(),
            pending: None,
            streaming,
        }
    }

    /// Switch mode. Applies to the next push only; entities already applied
    /// are left as they are.
    pub fn set_streaming(&mut self, streaming: bool) {
        self.streaming = streaming;
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn push(&mut self, items: Vec<T>) {
        if !self.streaming {
            self.cumulative = items.clone();
            self.pending = Some(Update::Replace(items));
            return;
        }

        self.cumulative.extend(items.iter().cloned());
        self.pending = Some(match self.pending.take() {
            // a replace that has not been applied yet absorbs the new items
            Some(Update::Replace(mut pending)) => {
                pending.extend(items);
                Update::Replace(pending)
            }
            Some(Update::Append(mut pending)) => {
                pending.extend(items);
                Update::Append(pending)
            }
            None => Update::Append(items),
        });
    }

    /// Drain what the next update pass must apply.
    pub fn take_update(&mut self) -> Option<Update<T>> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Every item the working set holds once pending updates are applied.
    pub fn cumulative(&self) -> &[T] {
        &self.cumulative
    }
}

impl<T: Clone> Default for UpdateBuffer<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

/// A value being edited, with the snapshot it can be reverted to.
///
/// Edits go straight into the value; `begin_edit` records the snapshot,
/// `commit` keeps the edits and `revert` restores the snapshot exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T> {
    value: T,
    saved: Option<T>,
}

impl<T: Clone + PartialEq> Draft<T> {
    pub fn new(value: T) -> Self {
        Self { value, saved: None }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable access for editing. Starts an edit if none is in progress.
    pub fn value_mut(&mut self) -> &mut T {
        self.begin_edit();
        &mut self.value
    }

    /// Snapshots the current value. A second call while editing keeps the
    /// original snapshot.
    pub fn begin_edit(&mut self) {
        if self.saved.is_none() {
            self.saved = Some(self.value.clone());
        }
    }

    pub fn is_editing(&self) -> bool {
        self.saved.is_some()
    }

    /// Whether the value differs from the snapshot.
    pub fn is_dirty(&self) -> bool {
        self.saved.as_ref().is_some_and(|saved| *saved != self.value)
    }

    /// Keeps the edits and drops the snapshot.
    pub fn commit(&mut self) -> &T {
        self.saved = None;
        &self.value
    }

    /// Restores the snapshot. Does nothing outside an edit.
    pub fn revert(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.value = saved;
        }
    }

    /// Replaces the value with a fresh server copy, discarding any edit.
    pub fn reset(&mut self, value: T) {
        self.value = value;
        self.saved = None;
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

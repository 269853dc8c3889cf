//! Drag-and-drop ordering.

/// Result of a reorder request on a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Nothing moved; no request was sent.
    Unchanged,
    /// The server accepted the new order and the list was refetched.
    Applied,
}

/// Moves the item at `from` to the drop position `to`, clamped to the list.
/// Returns `None` when the move is a no-op or `from` is out of range.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: isize) -> Option<Vec<T>> {
    if from >= items.len() {
        return None;
    }
    let last = items.len() as isize - 1;
    let to = to.clamp(0, last) as usize;
    if from == to {
        return None;
    }

    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}

/// Transient pointer state while an admin drags a row. It only reports the
/// move on drop; the list itself is never touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragSession {
    dragging: Option<usize>,
    over: Option<usize>,
}

impl DragSession {
    pub fn start(&mut self, index: usize) {
        self.dragging = Some(index);
        self.over = None;
    }

    pub fn enter(&mut self, index: usize) {
        if self.dragging.is_some() {
            self.over = Some(index);
        }
    }

    pub fn leave(&mut self) {
        self.over = None;
    }

    /// Ends the drag on `index`, yielding `(from, to)`.
    pub fn drop_on(&mut self, index: usize) -> Option<(usize, isize)> {
        let from = self.dragging.take()?;
        self.over = None;
        Some((from, index as isize))
    }

    /// Drag cancelled or finished outside any row.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Row currently hovered, for highlighting.
    pub fn over(&self) -> Option<usize> {
        self.over
    }
}

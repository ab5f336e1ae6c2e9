//! Patchable output buffers.
//!
//! Buffers and reservations live in one [`BufferArena`] and refer to each
//! other by index. A reservation remembers the byte offset its parent buffer
//! had when it was taken and owns a child buffer that may keep growing (and
//! take reservations of its own) until the tree is joined.

/// Handle of a buffer in a [`BufferArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u32);

/// Handle of a reservation in a [`BufferArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservationId(u32);

#[derive(Debug, Default)]
struct Buffer {
    text: String,
    reservations: Vec<ReservationId>,
    joined: bool,
}

#[derive(Debug)]
struct Reservation<T> {
    parent: BufferId,
    offset: usize,
    child: BufferId,
    task: Option<T>,
    resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("buffer has already been joined")]
    AlreadyJoined,
}

/// Arena of text buffers and the reservations between them.
///
/// `T` is the deferred task a reservation may carry.
#[derive(Debug)]
pub struct BufferArena<T> {
    buffers: Vec<Buffer>,
    reservations: Vec<Reservation<T>>,
}

impl<T> Default for BufferArena<T> {
    fn default() -> Self {
        Self {
            buffers: Vec::new(),
            reservations: Vec::new(),
        }
    }
}

impl<T> BufferArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_buffer(&mut self) -> BufferId {
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(Buffer::default());
        id
    }

    fn buffer(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.0 as usize]
    }

    fn buffer_mut(&mut self, id: BufferId) -> &mut Buffer {
        &mut self.buffers[id.0 as usize]
    }

    fn reservation(&self, id: ReservationId) -> &Reservation<T> {
        &self.reservations[id.0 as usize]
    }

    pub fn push_str(&mut self, id: BufferId, text: &str) {
        let buffer = self.buffer_mut(id);
        debug_assert!(!buffer.joined, "write to a joined buffer");
        buffer.text.push_str(text);
    }

    /// Text written directly into `id`, without any reserved content.
    pub fn text(&self, id: BufferId) -> &str {
        &self.buffer(id).text
    }

    pub fn len(&self, id: BufferId) -> usize {
        self.buffer(id).text.len()
    }

    pub fn is_joined(&self, id: BufferId) -> bool {
        self.buffer(id).joined
    }

    /// Reserve the current end of `parent`, optionally attaching a task.
    pub fn reserve(&mut self, parent: BufferId, task: Option<T>) -> ReservationId {
        let child = self.new_buffer();
        let offset = self.len(parent);
        let id = ReservationId(self.reservations.len() as u32);
        self.reservations.push(Reservation {
            parent,
            offset,
            child,
            task,
            resolved: false,
        });
        self.buffer_mut(parent).reservations.push(id);
        id
    }

    /// Attach a task to a reservation taken without one.
    pub fn attach(&mut self, id: ReservationId, task: T) {
        let reservation = &mut self.reservations[id.0 as usize];
        debug_assert!(!reservation.resolved, "attach to a resolved reservation");
        reservation.task = Some(task);
    }

    pub fn child(&self, id: ReservationId) -> BufferId {
        self.reservation(id).child
    }

    pub fn parent(&self, id: ReservationId) -> BufferId {
        self.reservation(id).parent
    }

    pub fn offset(&self, id: ReservationId) -> usize {
        self.reservation(id).offset
    }

    /// Reservations taken directly in `id`, in offset order.
    pub fn reservations(&self, id: BufferId) -> &[ReservationId] {
        &self.buffer(id).reservations
    }

    pub fn is_resolved(&self, id: ReservationId) -> bool {
        self.reservation(id).resolved
    }

    /// Mark `id` resolved and hand out its task.
    ///
    /// Returns `None` when the reservation was already resolved, so a task
    /// can never be taken twice.
    pub fn resolve(&mut self, id: ReservationId) -> Option<Option<T>> {
        let reservation = &mut self.reservations[id.0 as usize];
        if reservation.resolved {
            return None;
        }
        reservation.resolved = true;
        Some(reservation.task.take())
    }

    /// Splice every reservation under `root` into its parent, innermost first.
    ///
    /// Within one buffer reservations are spliced from the highest offset to
    /// the lowest, so no insertion shifts an offset still waiting to be used.
    pub fn join(&mut self, root: BufferId) -> Result<&str, BufferError> {
        if self.is_joined(root) {
            return Err(BufferError::AlreadyJoined);
        }

        // Post-order: a buffer is spliced only after all of its children.
        let mut stack = vec![(root, false)];
        while let Some((id, children_done)) = stack.pop() {
            if children_done {
                self.splice(id);
                continue;
            }
            stack.push((id, true));
            for &reservation in self.reservations(id) {
                stack.push((self.child(reservation), false));
            }
        }

        Ok(self.text(root))
    }

    fn splice(&mut self, id: BufferId) {
        let reservations = std::mem::take(&mut self.buffer_mut(id).reservations);
        let mut text = std::mem::take(&mut self.buffer_mut(id).text);
        for &reservation in reservations.iter().rev() {
            let (offset, child) = {
                let r = self.reservation(reservation);
                (r.offset, r.child)
            };
            let child_text = std::mem::take(&mut self.buffer_mut(child).text);
            text.insert_str(offset, &child_text);
        }
        let buffer = self.buffer_mut(id);
        buffer.text = text;
        buffer.joined = true;
        debug_assert!(buffer.reservations.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_without_reservations() {
        let mut arena: BufferArena<()> = BufferArena::new();
        let root = arena.new_buffer();
        arena.push_str(root, "hello");
        assert_eq!(arena.join(root).unwrap(), "hello");
    }

    #[test]
    fn test_join_is_invariant_to_child_growth() {
        let mut arena: BufferArena<()> = BufferArena::new();
        let root = arena.new_buffer();
        arena.push_str(root, "a");
        let first = arena.reserve(root, None);
        arena.push_str(root, "b");
        let second = arena.reserve(root, None);
        arena.push_str(root, "c");
        let third = arena.reserve(root, None);

        // Children grow by very different amounts after the fact.
        let long = "x".repeat(1000);
        arena.push_str(arena.child(first), &long);
        arena.push_str(arena.child(second), "");
        arena.push_str(arena.child(third), "zz");

        let joined = arena.join(root).unwrap().to_string();
        assert_eq!(joined, format!("a{}bczz", long));
    }

    #[test]
    fn test_reservations_at_same_offset_keep_order() {
        let mut arena: BufferArena<()> = BufferArena::new();
        let root = arena.new_buffer();
        let first = arena.reserve(root, None);
        let second = arena.reserve(root, None);
        arena.push_str(arena.child(second), "2");
        arena.push_str(arena.child(first), "1");
        assert_eq!(arena.join(root).unwrap(), "12");
    }

    #[test]
    fn test_nested_reservations_three_levels() {
        let mut arena: BufferArena<u32> = BufferArena::new();
        let root = arena.new_buffer();
        arena.push_str(root, "<");
        let outer = arena.reserve(root, Some(1));
        arena.push_str(root, ">");

        let level1 = arena.child(outer);
        arena.push_str(level1, "[");
        let middle = arena.reserve(level1, Some(2));
        arena.push_str(level1, "]");

        let level2 = arena.child(middle);
        arena.push_str(level2, "(");
        let inner = arena.reserve(level2, Some(3));
        arena.push_str(level2, ")");
        arena.push_str(arena.child(inner), "core");

        assert_eq!(arena.join(root).unwrap(), "<[(core)]>");
        assert!(arena.reservations(root).is_empty());
        assert!(arena.reservations(level1).is_empty());
    }

    #[test]
    fn test_resolve_hands_out_task_once() {
        let mut arena = BufferArena::new();
        let root = arena.new_buffer();
        let id = arena.reserve(root, Some("task"));
        assert_eq!(arena.resolve(id), Some(Some("task")));
        assert_eq!(arena.resolve(id), None);
        assert!(arena.is_resolved(id));
    }

    #[test]
    fn test_second_join_is_rejected() {
        let mut arena: BufferArena<()> = BufferArena::new();
        let root = arena.new_buffer();
        arena.push_str(root, "x");
        arena.join(root).unwrap();
        assert_eq!(arena.join(root), Err(BufferError::AlreadyJoined));
    }

    #[test]
    fn test_offset_recorded_at_reserve_time() {
        let mut arena: BufferArena<()> = BufferArena::new();
        let root = arena.new_buffer();
        arena.push_str(root, "abc");
        let id = arena.reserve(root, None);
        arena.push_str(root, "def");
        assert_eq!(arena.offset(id), 3);
        assert_eq!(arena.parent(id), root);
    }
}

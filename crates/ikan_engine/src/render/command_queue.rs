//! # Render Command Queue
//!
//! Deferred execution of GPU work. Any code path (resource constructors and
//! destructors included) submits closures; the owner of the graphics context
//! drains them once per frame, in submission order, against the backend.
//!
//! The queue is single-threaded on purpose: it is a submit-now/execute-later
//! buffer, not a producer/consumer channel.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::render::api::GraphicsBackend;

/// A deferred unit of GPU work
pub type RenderCommand = Box<dyn FnOnce(&mut dyn GraphicsBackend)>;

/// FIFO buffer of deferred render commands
#[derive(Default)]
pub struct RenderCommandQueue {
    commands: Vec<RenderCommand>,
    captured_bytes: usize,
}

impl RenderCommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a command for later execution; it does not run now
    pub fn submit<F>(&mut self, command: F)
    where
        F: FnOnce(&mut dyn GraphicsBackend) + 'static,
    {
        self.captured_bytes += std::mem::size_of::<F>();
        self.commands.push(Box::new(command));
    }

    /// Run every queued command in insertion order, then reset the queue
    pub fn execute(&mut self, backend: &mut dyn GraphicsBackend) {
        let mut commands = std::mem::take(&mut self.commands);
        self.captured_bytes = 0;
        for command in commands.drain(..) {
            command(backend);
        }
        // keep the allocation for next frame
        if self.commands.is_empty() {
            self.commands = commands;
        }
    }

    /// Number of commands waiting to run
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Total size of the state captured by the queued closures
    pub fn captured_bytes(&self) -> usize {
        self.captured_bytes
    }
}

impl std::fmt::Debug for RenderCommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCommandQueue")
            .field("commands", &self.commands.len())
            .field("captured_bytes", &self.captured_bytes)
            .finish()
    }
}

struct ContextInner {
    queue: RefCell<RenderCommandQueue>,
    next_id: Cell<u64>,
}

/// Shared handle to the command queue and the resource handle allocator
///
/// Cloning is cheap; resource wrappers keep a clone so they can queue their
/// own destruction when dropped.
#[derive(Clone)]
pub struct RenderContext {
    inner: Rc<ContextInner>,
}

impl RenderContext {
    /// Create a context with an empty queue
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                queue: RefCell::new(RenderCommandQueue::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Queue a command for the next drain
    pub fn submit<F>(&self, command: F)
    where
        F: FnOnce(&mut dyn GraphicsBackend) + 'static,
    {
        self.inner.queue.borrow_mut().submit(command);
    }

    /// Allocate a fresh resource id; ids are never reused
    pub fn allocate_id(&self) -> u64 {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        id
    }

    /// Drain the queue into the backend
    ///
    /// The queue is released before commands run, so a command that drops a
    /// resource queues the destruction for the following drain instead of
    /// re-entering the queue.
    pub fn execute(&self, backend: &mut dyn GraphicsBackend) {
        let mut pending = std::mem::take(&mut *self.inner.queue.borrow_mut());
        pending.execute(backend);

        let mut queue = self.inner.queue.borrow_mut();
        if queue.is_empty() {
            queue.commands = pending.commands;
        }
    }

    /// Number of commands waiting for the next drain
    pub fn pending_commands(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Captured closure state waiting for the next drain
    pub fn pending_bytes(&self) -> usize {
        self.inner.queue.borrow().captured_bytes()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("queue", &*self.inner.queue.borrow())
            .field("next_id", &self.inner.next_id.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn test_execute_runs_in_submission_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = RenderCommandQueue::new();

        for token in ["A", "B", "C"] {
            let log = Rc::clone(&log);
            queue.submit(move |_| log.borrow_mut().push(token));
        }
        assert_eq!(queue.len(), 3);
        assert!(log.borrow().is_empty());

        let mut backend = HeadlessBackend::new();
        queue.execute(&mut backend);
        assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
        assert!(queue.is_empty());

        queue.execute(&mut backend);
        assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_captured_size_is_tracked_and_reset() {
        let mut queue = RenderCommandQueue::new();
        let payload = [0u8; 64];
        queue.submit(move |_| {
            let _ = payload.len();
        });
        assert!(queue.captured_bytes() >= 64);

        queue.execute(&mut HeadlessBackend::new());
        assert_eq!(queue.captured_bytes(), 0);
    }

    #[test]
    fn test_context_commands_submitted_while_draining_wait_for_next_drain() {
        let context = RenderContext::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let inner_context = context.clone();
            let log = Rc::clone(&log);
            context.submit(move |_| {
                log.borrow_mut().push("outer");
                let log = Rc::clone(&log);
                inner_context.submit(move |_| log.borrow_mut().push("inner"));
            });
        }

        let mut backend = HeadlessBackend::new();
        context.execute(&mut backend);
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert_eq!(context.pending_commands(), 1);

        context.execute(&mut backend);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert_eq!(context.pending_commands(), 0);
    }

    #[test]
    fn test_allocated_ids_are_unique() {
        let context = RenderContext::new();
        let clone = context.clone();
        let a = context.allocate_id();
        let b = clone.allocate_id();
        assert_ne!(a, b);
    }
}

//! Deferred render-node mutations.
//!
//! Setters whose side effects need a consistent render tree do not touch
//! the node directly. They push an [`Effect`] onto the element's queue and
//! the container applies the queue at its per-frame sync point.
//!
//! ```text
//! any thread ── EffectSender::send ──┐
//! element setter ── enqueue ─────────┼──► [ unbounded channel ] ──► drain (sync point only)
//!                                    │                               └─► effect(&mut RenderNode)
//! ```
//!
//! Senders are refused while the element is detached: the node is rebuilt
//! from the element's fields on attach, so anything queued before is stale.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::render::RenderNode;

/// A queued mutation applied to an element's render node.
pub type Effect = Box<dyn FnOnce(&mut RenderNode) + Send + 'static>;

/// FIFO queue of effects owned by one element.
///
/// Only the owning element drains it; other contexts hold an
/// [`EffectSender`].
pub struct EffectQueue {
    sender: Sender<Effect>,
    receiver: Receiver<Effect>,
    attached: Arc<AtomicBool>,
}

impl EffectQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            attached: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true if the owning element has a render node.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Opens or closes the queue to senders. Closing drops anything pending.
    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::Release);
        if !attached {
            self.discard();
        }
    }

    /// Enqueues an effect.
    pub fn push(&self, effect: Effect) {
        // The queue owns the receiver, so the channel cannot be disconnected here.
        let _ = self.sender.send(effect);
    }

    /// Returns a handle that can enqueue from another context.
    #[must_use]
    pub fn sender(&self) -> EffectSender {
        EffectSender {
            sender: self.sender.clone(),
            attached: Arc::clone(&self.attached),
        }
    }

    /// Number of pending effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Applies every pending effect to `node` in FIFO order.
    ///
    /// Effects enqueued while draining are applied in the same call.
    /// Returns the number applied.
    pub fn drain_into(&self, node: &mut RenderNode) -> usize {
        let mut applied = 0;
        while let Ok(effect) = self.receiver.try_recv() {
            effect(node);
            applied += 1;
        }
        applied
    }

    /// Drops every pending effect. Returns the number dropped.
    pub fn discard(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl Default for EffectQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EffectQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Cloneable handle for enqueueing effects from any thread.
#[derive(Clone)]
pub struct EffectSender {
    sender: Sender<Effect>,
    attached: Arc<AtomicBool>,
}

impl EffectSender {
    /// Enqueues a mutation. Returns false, dropping the effect, if the
    /// element is detached or no longer exists.
    pub fn send<F>(&self, effect: F) -> bool
    where
        F: FnOnce(&mut RenderNode) + Send + 'static,
    {
        if !self.attached.load(Ordering::Acquire) {
            return false;
        }
        self.sender.send(Box::new(effect)).is_ok()
    }
}

impl std::fmt::Debug for EffectSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectSender")
            .field("attached", &self.attached.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::UiElement;
    use std::thread;

    fn label_node(text: &str) -> RenderNode {
        let element = UiElement::label(text);
        RenderNode::from_element(&element, None)
    }

    #[test]
    fn test_effects_apply_in_fifo_order() {
        let queue = EffectQueue::new();
        let mut node = label_node("");
        for word in ["a", "b", "c"] {
            let word = word.to_owned();
            queue.push(Box::new(move |node: &mut RenderNode| {
                let text = format!("{}{}", node.text().unwrap_or_default(), word);
                node.set_text(&text);
            }));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain_into(&mut node), 3);
        assert_eq!(node.text(), Some("abc"));
        // Nothing is applied twice.
        assert_eq!(queue.drain_into(&mut node), 0);
        assert_eq!(node.text(), Some("abc"));
    }

    #[test]
    fn test_sender_from_other_thread() {
        let queue = EffectQueue::new();
        queue.set_attached(true);
        let sender = queue.sender();
        thread::spawn(move || {
            assert!(sender.send(|node: &mut RenderNode| node.set_text("remote")));
        })
        .join()
        .expect("sender thread");

        let mut node = label_node("local");
        assert_eq!(queue.drain_into(&mut node), 1);
        assert_eq!(node.text(), Some("remote"));
    }

    #[test]
    fn test_sender_outliving_queue() {
        let queue = EffectQueue::new();
        queue.set_attached(true);
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.send(|_node: &mut RenderNode| {}));
    }

    #[test]
    fn test_discard_drops_pending() {
        let queue = EffectQueue::new();
        queue.push(Box::new(|node: &mut RenderNode| node.set_text("stale")));
        assert_eq!(queue.discard(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sender_refused_while_detached() {
        let queue = EffectQueue::new();
        let sender = queue.sender();
        for _ in 0..100 {
            assert!(!sender.send(|node: &mut RenderNode| node.set_text("lost")));
        }
        assert!(queue.is_empty());

        queue.set_attached(true);
        assert!(sender.send(|node: &mut RenderNode| node.set_text("kept")));
        assert_eq!(queue.len(), 1);

        queue.set_attached(false);
        assert!(queue.is_empty());
        assert!(!sender.send(|_node: &mut RenderNode| {}));
    }
}

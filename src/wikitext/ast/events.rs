//! User-visible mutation events
//!
//! Listeners are registered per node and event type. A dispatched event starts
//! at its target and bubbles through the ancestors until the root or until a
//! listener stops it. Dispatch is suppressed while the tree is in trusted mode,
//! so parsing itself never fires events.

use super::node::NodeId;
use super::tree::Tree;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Insert,
    Remove,
    Replace,
    Text,
}

/// Listener callback; receives the tree, the event and its payload
///
/// Listeners are `Send + Sync` so a finished tree can move to another thread.
pub type Listener = Arc<dyn Fn(&Tree, &mut Event, &EventData) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    /// Node the event was dispatched on
    pub target: NodeId,
    /// Node whose listeners are running
    pub current_target: NodeId,
    pub bubbles: bool,
    stopped: bool,
}

impl Event {
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            bubbles: true,
            stopped: false,
        }
    }

    /// Keep the event from reaching further ancestors
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// What changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventData {
    /// Child position affected
    pub position: Option<usize>,
    /// Inserted, removed or replacing child
    pub node: Option<NodeId>,
    /// Replaced child
    pub old_node: Option<NodeId>,
    /// Previous content of a text node
    pub old_text: Option<String>,
}

impl Tree {
    pub fn add_event_listener(&mut self, id: NodeId, event_type: EventType, listener: Listener) {
        self.node_mut(id).listeners.push((event_type, listener));
    }

    /// Remove every listener of `event_type` registered on `id`
    pub fn remove_event_listeners(&mut self, id: NodeId, event_type: EventType) {
        self.node_mut(id)
            .listeners
            .retain(|(registered, _)| *registered != event_type);
    }

    /// Run listeners from `target` up through its ancestors
    pub fn dispatch_event(&self, mut event: Event, data: &EventData) -> Event {
        let mut current = Some(event.target);
        while let Some(id) = current {
            event.current_target = id;
            let listeners: Vec<Listener> = self
                .node(id)
                .listeners
                .iter()
                .filter(|(registered, _)| *registered == event.event_type)
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            for listener in listeners {
                listener(self, &mut event, data);
            }
            if !event.bubbles || event.stopped {
                break;
            }
            current = self.parent(id);
        }
        event
    }

    pub(crate) fn emit(&self, event_type: EventType, target: NodeId, data: EventData) {
        if self.is_trusted() {
            return;
        }
        self.dispatch_event(Event::new(event_type, target), &data);
    }
}

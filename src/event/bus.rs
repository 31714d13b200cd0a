use std::cell::RefCell;
use std::collections::VecDeque;

use crate::event::ProjectEvent;

/// Queue of project events, drained once per frame by the app
#[derive(Default)]
pub struct EventBus {
    queue: RefCell<VecDeque<ProjectEvent>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProjectEvent) {
        log::trace!("event: {event:?}");
        self.queue.borrow_mut().push_back(event);
    }

    /// Takes every pending event in emission order
    pub fn drain(&self) -> Vec<ProjectEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerId;

    #[test]
    fn drain_returns_events_in_order_and_empties_queue() {
        let bus = EventBus::new();
        let id = LayerId::new();
        bus.emit(ProjectEvent::LayerAdded { id, index: 0 });
        bus.emit(ProjectEvent::LayerUpdated { id });

        assert_eq!(
            bus.drain(),
            vec![
                ProjectEvent::LayerAdded { id, index: 0 },
                ProjectEvent::LayerUpdated { id }
            ]
        );
        assert!(bus.is_empty());
    }
}

//! Sheet event dispatch
//!
//! Listeners are registered on the controller and called synchronously, in
//! registration order, whenever the sheet settles somewhere new.

use serde::{Deserialize, Serialize};

/// Events emitted by a sheet controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SheetEvent {
    /// The close transition completed and the sheet is hidden
    Close,
    /// The sheet settled on a snap point (including the first one after opening)
    SnapChange { index: usize },
}

/// Event handler function type
pub type SheetEventHandler = Box<dyn FnMut(&SheetEvent) + Send>;

/// Dispatches sheet events to registered handlers
#[derive(Default)]
pub struct SheetEventDispatcher {
    handlers: Vec<SheetEventHandler>,
}

impl SheetEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every event
    pub fn register<F>(&mut self, handler: F)
    where
        F: FnMut(&SheetEvent) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Register a handler for [`SheetEvent::Close`] only
    pub fn on_close<F>(&mut self, mut handler: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.register(move |event| {
            if let SheetEvent::Close = event {
                handler();
            }
        });
    }

    /// Register a handler for [`SheetEvent::SnapChange`] only
    pub fn on_snap_change<F>(&mut self, mut handler: F)
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.register(move |event| {
            if let SheetEvent::SnapChange { index } = event {
                handler(*index);
            }
        });
    }

    /// Dispatch an event to all registered handlers
    pub fn dispatch(&mut self, event: SheetEvent) {
        tracing::debug!(?event, handlers = self.handlers.len(), "sheet event");
        for handler in self.handlers.iter_mut() {
            handler(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_filtered_handlers() {
        let closes = Arc::new(Mutex::new(0));
        let snaps = Arc::new(Mutex::new(Vec::new()));
        let all = Arc::new(Mutex::new(0));

        let mut dispatcher = SheetEventDispatcher::new();
        {
            let closes = closes.clone();
            dispatcher.on_close(move || *closes.lock().unwrap() += 1);
        }
        {
            let snaps = snaps.clone();
            dispatcher.on_snap_change(move |index| snaps.lock().unwrap().push(index));
        }
        {
            let all = all.clone();
            dispatcher.register(move |_| *all.lock().unwrap() += 1);
        }
        assert_eq!(dispatcher.len(), 3);

        dispatcher.dispatch(SheetEvent::SnapChange { index: 1 });
        dispatcher.dispatch(SheetEvent::Close);
        dispatcher.dispatch(SheetEvent::SnapChange { index: 0 });

        assert_eq!(*closes.lock().unwrap(), 1);
        assert_eq!(*snaps.lock().unwrap(), vec![1, 0]);
        assert_eq!(*all.lock().unwrap(), 3);
    }
}

use crossterm::event::{KeyEvent, MouseEvent};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
    Resize(u16, u16),
    Render(RenderTask),
}

/// Work handed to the render loop from other threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTask {
    /// Redraw the request panel from the request log.
    RefreshRequest,
    Info(String),
    /// Leave the render loop with this error.
    Abort(String),
}

/// Fire-and-forget handle for scheduling work on the render loop. Tasks run
/// in submission order; there is no completion signal.
#[derive(Debug, Clone)]
pub struct RenderQueue {
    tx: UnboundedSender<Event>,
}

impl RenderQueue {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    pub fn submit(&self, task: RenderTask) {
        // The receiver only goes away on shutdown.
        let _ = self.tx.send(Event::Render(task));
    }
}

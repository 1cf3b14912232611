use std::sync::{Arc, PoisonError, RwLock};

use crate::event::{RenderQueue, RenderTask};
use crate::state::request_log::RequestLog;
use crate::state::response::Response;

/// State reachable from the HTTP handlers: the live response and the
/// request log.
///
/// The response is swapped whole behind a lock, so a handler sees either the
/// old or the new value, never a mix.
#[derive(Debug)]
pub struct Shared {
    response: RwLock<Arc<Response>>,
    pub requests: RequestLog,
    queue: RenderQueue,
}

impl Shared {
    pub fn new(response: Response, queue: RenderQueue) -> Self {
        Self {
            response: RwLock::new(Arc::new(response)),
            requests: RequestLog::new(queue.clone()),
            queue,
        }
    }

    /// The response to serve right now.
    pub fn response(&self) -> Arc<Response> {
        self.response.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn replace_response(&self, response: Response) {
        *self.response.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(response);
    }

    /// Logs an incoming request and announces it on the info bar.
    pub fn record_request(&self, host: &str, dump: Vec<u8>) {
        tracing::info!(host, bytes = dump.len(), "request recorded");
        self.queue.submit(RenderTask::Info(format!("New Request from {host}")));
        self.requests.append(dump);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use tokio::sync::mpsc;

    #[test]
    fn test_replace_is_seen_by_existing_readers_only_after_swap() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let shared = Shared::new(Response::default(), RenderQueue::new(tx));

        let before = shared.response();
        shared.replace_response(Response::parse("404", "", "gone").unwrap());
        assert_eq!(before.status, 200);
        assert_eq!(shared.response().status, 404);
    }

    #[test]
    fn test_record_request_queues_info_then_refresh() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shared = Shared::new(Response::default(), RenderQueue::new(tx));

        shared.record_request("localhost:10080", b"GET / HTTP/1.1\n".to_vec());
        assert_eq!(shared.requests.len(), 1);

        let tasks: Vec<RenderTask> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|event| match event {
                Event::Render(task) => Some(task),
                _ => None,
            })
            .collect();
        assert_eq!(
            tasks,
            vec![
                RenderTask::Info("New Request from localhost:10080".into()),
                RenderTask::RefreshRequest,
            ]
        );
    }
}

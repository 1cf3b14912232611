use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::event::{RenderQueue, RenderTask};

/// The dump under the cursor, with its 0-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub dump: Vec<u8>,
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
struct Inner {
    requests: Vec<Vec<u8>>,
    current: usize,
}

/// Append-only history of request dumps with a read cursor.
///
/// Shared between the HTTP handlers and the render loop. The lock covers the
/// log and cursor only; refreshing the request panel is queued after it is
/// released.
#[derive(Debug)]
pub struct RequestLog {
    inner: Mutex<Inner>,
    queue: RenderQueue,
}

impl RequestLog {
    pub fn new(queue: RenderQueue) -> Self {
        Self { inner: Mutex::new(Inner::default()), queue }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a dump. The cursor follows only when it was already on the
    /// newest entry.
    pub fn append(&self, dump: Vec<u8>) {
        {
            let mut inner = self.lock();
            if !inner.requests.is_empty() && inner.current == inner.requests.len() - 1 {
                inner.current += 1;
            }
            inner.requests.push(dump);
        }
        self.queue.submit(RenderTask::RefreshRequest);
    }

    pub fn prev(&self) {
        let moved = {
            let mut inner = self.lock();
            if inner.current == 0 {
                false
            } else {
                inner.current -= 1;
                true
            }
        };
        if moved {
            self.queue.submit(RenderTask::RefreshRequest);
        }
    }

    pub fn next(&self) {
        let moved = {
            let mut inner = self.lock();
            if inner.current + 1 >= inner.requests.len() {
                false
            } else {
                inner.current += 1;
                true
            }
        };
        if moved {
            self.queue.submit(RenderTask::RefreshRequest);
        }
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.requests.clear();
        inner.current = 0;
    }

    pub fn current(&self) -> Option<RequestSnapshot> {
        let inner = self.lock();
        inner.requests.get(inner.current).map(|dump| RequestSnapshot {
            dump: dump.clone(),
            index: inner.current,
            total: inner.requests.len(),
        })
    }

    pub fn index(&self) -> usize {
        self.lock().current
    }

    pub fn len(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().requests.is_empty()
    }

    #[cfg(test)]
    pub fn dumps(&self) -> Vec<Vec<u8>> {
        self.lock().requests.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    use crate::event::Event;

    fn log() -> (RequestLog, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RequestLog::new(RenderQueue::new(tx)), rx)
    }

    fn refreshes(rx: &mut mpsc::UnboundedReceiver<Event>) -> usize {
        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, Event::Render(RenderTask::RefreshRequest)) {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn test_append_keeps_order_and_follows_tail() {
        let (log, mut rx) = log();
        for i in 0..10 {
            log.append(format!("GET /{i} HTTP/1.1\n").into_bytes());
        }
        assert_eq!(log.len(), 10);
        for (i, dump) in log.dumps().iter().enumerate() {
            let text = String::from_utf8_lossy(dump);
            assert_eq!(text.split(' ').nth(1), Some(format!("/{i}").as_str()));
        }
        assert_eq!(log.index(), 9);
        assert_eq!(refreshes(&mut rx), 10);
    }

    #[test]
    fn test_scroll_back_stops_auto_follow() {
        let (log, mut rx) = log();
        for i in 0..10 {
            log.append(vec![i]);
        }
        refreshes(&mut rx);

        log.prev();
        assert_eq!(log.index(), 8);
        log.next();
        assert_eq!(log.index(), 9);
        assert_eq!(refreshes(&mut rx), 2);

        log.prev();
        log.append(vec![42]);
        assert_eq!(log.index(), 8);
        assert_eq!(log.current().unwrap().dump, vec![8]);
    }

    #[test]
    fn test_cursor_clamped_at_both_ends() {
        let (log, mut rx) = log();
        log.prev();
        log.next();
        assert_eq!(log.index(), 0);
        assert!(log.current().is_none());

        log.append(vec![1]);
        log.append(vec![2]);
        refreshes(&mut rx);
        log.next();
        assert_eq!(log.index(), 1);
        log.prev();
        log.prev();
        assert_eq!(log.index(), 0);
        assert_eq!(refreshes(&mut rx), 1);
    }

    #[test]
    fn test_reset() {
        let (log, _rx) = log();
        log.append(vec![1]);
        log.append(vec![2]);
        log.reset();
        assert!(log.is_empty());
        assert_eq!(log.index(), 0);
        log.append(vec![3]);
        assert_eq!(log.current().unwrap().dump, vec![3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_lose_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let log = Arc::new(RequestLog::new(RenderQueue::new(tx)));

        let handles: Vec<_> = (0..16)
            .map(|ctx| {
                let log = log.clone();
                tokio::spawn(async move {
                    for n in 0..50 {
                        log.append(format!("{ctx}:{n}").into_bytes());
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let dumps = log.dumps();
        assert_eq!(dumps.len(), 16 * 50);
        let mut last_seen = vec![None::<usize>; 16];
        for dump in &dumps {
            let text = String::from_utf8(dump.clone()).unwrap();
            let (ctx, n) = text.split_once(':').unwrap();
            let (ctx, n): (usize, usize) = (ctx.parse().unwrap(), n.parse().unwrap());
            if let Some(prev) = last_seen[ctx] {
                assert!(n > prev, "context {ctx} out of order");
            }
            last_seen[ctx] = Some(n);
        }
        assert!(last_seen.iter().all(|n| *n == Some(49)));
        assert_eq!(log.index(), dumps.len() - 1);
    }
}

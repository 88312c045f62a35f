use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use std::time::Duration;

/// Counts attempts per key within a sliding time span.
pub struct RateLimit {
    limit: usize,
    span: Duration,
    counter: Arc<DashMap<String, usize>>,
}

impl RateLimit {
    pub fn new(limit: usize, span: Duration) -> Self {
        Self {
            limit,
            span,
            counter: Arc::new(Default::default()),
        }
    }

    /// Returns true if the attempt should be rejected, false otherwise. Must be called from
    /// within a Tokio runtime.
    pub fn limit(&self, key: &str) -> bool {
        match self.counter.entry(key.to_owned()) {
            Entry::Occupied(mut count) => {
                let count = count.get_mut();
                if *count >= self.limit {
                    return true;
                }
                *count += 1;
            }
            Entry::Vacant(e) => {
                if self.limit == 0 {
                    return true;
                }
                e.insert(1);
            }
        }
        self.decrement_later(key.to_owned());
        false
    }

    fn decrement_later(&self, key: String) {
        let counter = Arc::clone(&self.counter);
        let span = self.span;
        tokio::spawn(async move {
            tokio::time::sleep(span).await;
            match counter.entry(key) {
                Entry::Occupied(mut e) => {
                    let v = e.get_mut();
                    *v -= 1;
                    if *v == 0 {
                        e.remove();
                    }
                }
                Entry::Vacant(e) => {
                    log::error!(
                        "entry should not be vacant, this is a bug. key {:?}",
                        e.key()
                    );
                }
            }
        });
    }
}

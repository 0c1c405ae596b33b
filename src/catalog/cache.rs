use std::sync::{Arc, Condvar, Mutex};

use crate::catalog::Catalog;
use crate::catalog::fetch::CatalogSource;

/// Externally visible cache lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Fetching,
    Populated,
    Failed,
}

enum State {
    Empty,
    Fetching,
    Populated(Arc<Catalog>),
    Failed,
}

/// Memoizing catalog cache: the document is fetched at most once per cache
/// lifetime. Concurrent callers arriving while the fetch is in flight block
/// on it and share the result instead of issuing duplicate requests.
///
/// A failed fetch resolves to an empty catalog from `load`. Callers that
/// need to distinguish "no loops published" from "fetch failed" read
/// `status()`, and `reset()` is the retry affordance.
pub struct CatalogCache {
    source: Box<dyn CatalogSource>,
    state: Mutex<State>,
    cond: Condvar,
}

impl CatalogCache {
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self {
            source,
            state: Mutex::new(State::Empty),
            cond: Condvar::new(),
        }
    }

    /// Return the catalog, fetching it on first use.
    pub fn load(&self) -> Arc<Catalog> {
        let mut state = self.state.lock().unwrap();
        loop {
            match &*state {
                State::Populated(catalog) => return Arc::clone(catalog),
                State::Failed => return Arc::new(Catalog::default()),
                State::Fetching => state = self.cond.wait(state).unwrap(),
                State::Empty => break,
            }
        }

        // This caller owns the fetch; only it may transition out of Fetching.
        *state = State::Fetching;
        drop(state);

        let fetched = self.source.fetch();

        let mut state = self.state.lock().unwrap();
        let result = match fetched {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                *state = State::Populated(Arc::clone(&catalog));
                catalog
            }
            Err(e) => {
                log::error!("Error fetching loops data: {e}");
                *state = State::Failed;
                Arc::new(Catalog::default())
            }
        };
        self.cond.notify_all();
        result
    }

    pub fn status(&self) -> CacheStatus {
        match &*self.state.lock().unwrap() {
            State::Empty => CacheStatus::Empty,
            State::Fetching => CacheStatus::Fetching,
            State::Populated(_) => CacheStatus::Populated,
            State::Failed => CacheStatus::Failed,
        }
    }

    /// Clear a populated or failed catalog so the next `load` fetches again.
    /// A no-op while a fetch is in flight.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        if matches!(&*state, State::Fetching) {
            log::debug!("reset ignored: fetch in flight");
            return;
        }
        *state = State::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fetch::{FetchError, Result as FetchResult};
    use crate::catalog::{LoopRecord, PackRecord};
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingSource {
        fn new(delay_ms: u64, fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(delay_ms),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CatalogSource for CountingSource {
        fn fetch(&self) -> FetchResult<Catalog> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            if self.fail {
                return Err(FetchError::Http(ureq::Error::StatusCode(500)));
            }
            Ok(Catalog::new(vec![PackRecord {
                pack_number: "39".to_string(),
                pack_url: None,
                loops: vec![LoopRecord {
                    url: "https://cdn.example/RIGHTER_PACK39/a.wav".to_string(),
                    title: "Riff A 90bpm Aminor".to_string(),
                }],
            }]))
        }
    }

    /// Adapter so tests can keep an `Arc` to the counting source after it's
    /// boxed into the cache.
    struct SharedSource(Arc<CountingSource>);

    impl CatalogSource for SharedSource {
        fn fetch(&self) -> FetchResult<Catalog> {
            self.0.fetch()
        }
    }

    #[test]
    fn test_load_memoizes() {
        let source = Arc::new(CountingSource::new(0, false));
        let cache = CatalogCache::new(Box::new(SharedSource(Arc::clone(&source))));
        let first = cache.load();
        let second = cache.load();
        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.status(), CacheStatus::Populated);
    }

    #[test]
    fn test_concurrent_loads_share_one_fetch() {
        let source = Arc::new(CountingSource::new(100, false));
        let cache = Arc::new(CatalogCache::new(Box::new(SharedSource(Arc::clone(&source)))));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.load()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(source.calls(), 1);
        assert_eq!(results[0], results[1]);
        assert!(!results[0].is_empty());
    }

    #[test]
    fn test_failure_yields_empty_catalog_and_failed_status() {
        let source = Arc::new(CountingSource::new(0, true));
        let cache = CatalogCache::new(Box::new(SharedSource(Arc::clone(&source))));
        let catalog = cache.load();
        assert!(catalog.is_empty());
        assert_eq!(cache.status(), CacheStatus::Failed);

        // Failure is sticky until reset
        let again = cache.load();
        assert!(again.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_reset_allows_refetch() {
        let source = Arc::new(CountingSource::new(0, false));
        let cache = CatalogCache::new(Box::new(SharedSource(Arc::clone(&source))));
        cache.load();
        cache.reset();
        assert_eq!(cache.status(), CacheStatus::Empty);
        cache.load();
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.status(), CacheStatus::Populated);
    }
}

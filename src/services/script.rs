//! Queued, keyed script loading
//!
//! A native mapping library is process-wide: it is loaded at most once no
//! matter how many maps ask for it. [`ScriptLoader`] hands every caller of a
//! key the same in-flight (or finished) load, bounds each load with a
//! timeout, and fails fast when the fetcher knows the browser is offline.

use crate::prelude::HashMap;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

/// Why a script could not be loaded. `Display` gives the provider-agnostic
/// status string handed to failure callbacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("timeout")]
    Timeout,
    #[error("offline")]
    Offline,
    #[error("error: {0}")]
    Failed(String),
}

impl LoadError {
    pub fn status(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRequest {
    /// Loads sharing a key share one fetch
    pub key: String,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ScriptRequest {
    pub fn new(key: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            params: Vec::new(),
            timeout,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// The URL with the parameters appended as a query string
    pub fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let query: Vec<String> = self
            .params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query.join("&"))
    }
}

/// Whatever actually puts the script on the page
#[async_trait]
pub trait ScriptFetcher: Send + Sync {
    async fn fetch(&self, request: &ScriptRequest) -> Result<(), LoadError>;

    /// False when the environment is known to be offline
    fn is_online(&self) -> bool {
        true
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<(), LoadError>>>;

pub struct ScriptLoader {
    fetcher: Arc<dyn ScriptFetcher>,
    loads: Mutex<HashMap<String, SharedLoad>>,
}

impl ScriptLoader {
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self {
            fetcher,
            loads: Mutex::new(HashMap::default()),
        }
    }

    /// Loads the script unless its key is already loaded or loading, in
    /// which case the caller shares that load's outcome. A failed key is
    /// forgotten so the next caller retries.
    pub async fn load(&self, request: ScriptRequest) -> Result<(), LoadError> {
        let shared = {
            let mut loads = self
                .loads
                .lock()
                .map_err(|_| LoadError::Failed("script loader lock poisoned".to_string()))?;
            match loads.get(&request.key) {
                Some(existing) => existing.clone(),
                None => {
                    if !self.fetcher.is_online() {
                        log::warn!("offline, not loading script {}", request.key);
                        return Err(LoadError::Offline);
                    }
                    log::debug!("loading script {} from {}", request.key, request.url);
                    let load = Self::start(self.fetcher.clone(), request.clone());
                    loads.insert(request.key.clone(), load.clone());
                    load
                }
            }
        };

        let result = shared.await;
        if let Err(e) = &result {
            log::warn!("script {} failed to load: {}", request.key, e);
            if let Ok(mut loads) = self.loads.lock() {
                let failed = loads
                    .get(&request.key)
                    .and_then(|l| l.peek())
                    .map_or(false, |r| r.is_err());
                if failed {
                    loads.remove(&request.key);
                }
            }
        }
        result
    }

    /// True once the key has loaded successfully
    pub fn is_loaded(&self, key: &str) -> bool {
        self.loads
            .lock()
            .ok()
            .and_then(|loads| loads.get(key).and_then(|l| l.peek().cloned()))
            .map_or(false, |r| r.is_ok())
    }

    fn start(fetcher: Arc<dyn ScriptFetcher>, request: ScriptRequest) -> SharedLoad {
        async move {
            match tokio::time::timeout(request.timeout, fetcher.fetch(&request)).await {
                Ok(result) => result,
                Err(_) => Err(LoadError::Timeout),
            }
        }
        .boxed()
        .shared()
    }
}

/// Fetcher that pretends to load scripts, for tests and headless use.
/// Counts calls so sharing can be observed.
pub struct HeadlessFetcher {
    delay: Duration,
    outcome: Result<(), LoadError>,
    online: bool,
    calls: AtomicUsize,
}

impl HeadlessFetcher {
    /// Succeeds immediately
    pub fn resident() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(()),
            online: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, error: LoadError) -> Self {
        self.outcome = Err(error);
        self
    }

    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptFetcher for HeadlessFetcher {
    async fn fetch(&self, request: &ScriptRequest) -> Result<(), LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("headless fetch of {}", request.full_url());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }

    fn is_online(&self) -> bool {
        self.online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(timeout_ms: u64) -> ScriptRequest {
        ScriptRequest::new("lib", "https://example.com/lib.js", Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_full_url() {
        let req = request(10).with_param("key", "abc").with_param("v", "3");
        assert_eq!(req.full_url(), "https://example.com/lib.js?key=abc&v=3");
        assert_eq!(request(10).full_url(), "https://example.com/lib.js");
    }

    #[tokio::test]
    async fn test_same_key_fetched_once() {
        let fetcher = Arc::new(HeadlessFetcher::resident().with_delay(Duration::from_millis(10)));
        let loader = ScriptLoader::new(fetcher.clone());

        let (a, b) = tokio::join!(loader.load(request(1000)), loader.load(request(1000)));
        assert_eq!(a, Ok(()));
        assert_eq!(b, Ok(()));
        assert_eq!(loader.load(request(1000)).await, Ok(()));

        assert_eq!(fetcher.calls(), 1);
        assert!(loader.is_loaded("lib"));
    }

    #[tokio::test]
    async fn test_slow_load_times_out() {
        let fetcher = Arc::new(HeadlessFetcher::resident().with_delay(Duration::from_millis(200)));
        let loader = ScriptLoader::new(fetcher);

        let result = loader.load(request(20)).await;
        assert_eq!(result, Err(LoadError::Timeout));
        assert_eq!(result.unwrap_err().status(), "timeout");
        assert!(!loader.is_loaded("lib"));
    }

    #[tokio::test]
    async fn test_failed_key_is_retried() {
        let fetcher = Arc::new(HeadlessFetcher::resident().failing(LoadError::Failed("404".into())));
        let loader = ScriptLoader::new(fetcher.clone());

        assert_eq!(
            loader.load(request(100)).await,
            Err(LoadError::Failed("404".to_string()))
        );
        let _ = loader.load(request(100)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_offline_fails_fast() {
        let fetcher = Arc::new(HeadlessFetcher::resident().offline());
        let loader = ScriptLoader::new(fetcher.clone());

        assert_eq!(loader.load(request(100)).await, Err(LoadError::Offline));
        assert_eq!(fetcher.calls(), 0);
    }
}

//! Lazily loaded, shared embedding model

use crate::error::{CvMatcherError, Result};
use crate::processing::embeddings::ModelLoader;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Observable lifecycle of a [`ModelHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    Uninitialized,
    Loading,
    Ready,
    /// Last load attempt failed; the next call retries.
    Failed(String),
}

/// Single-flight loader for an embedding model.
///
/// One caller at a time runs the loader on the blocking pool. Callers that
/// arrive while an attempt is running wait for it and share its outcome,
/// failure included. Only a caller arriving after a failed attempt has
/// finished starts a new one.
pub struct ModelHandle<L: ModelLoader> {
    loader: Arc<L>,
    cell: OnceCell<Arc<L::Model>>,
    /// Serializes load attempts.
    load_lock: tokio::sync::Mutex<()>,
    loading: AtomicBool,
    load_attempts: AtomicUsize,
    /// Attempts that have run to completion, successful or not.
    finished_attempts: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl<L: ModelLoader> ModelHandle<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            cell: OnceCell::new(),
            load_lock: tokio::sync::Mutex::new(()),
            loading: AtomicBool::new(false),
            load_attempts: AtomicUsize::new(0),
            finished_attempts: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// The loaded model, loading it first if needed.
    pub async fn get(&self) -> Result<Arc<L::Model>> {
        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }

        let seen = self.finished_attempts.load(Ordering::SeqCst);
        let _guard = self.load_lock.lock().await;

        if let Some(model) = self.cell.get() {
            return Ok(Arc::clone(model));
        }
        if self.finished_attempts.load(Ordering::SeqCst) > seen {
            // An attempt finished while this caller waited and it failed.
            let message = self
                .last_error()
                .unwrap_or_else(|| "model failed to load".to_string());
            debug!("Sharing failed load attempt: {}", message);
            return Err(CvMatcherError::EmbeddingUnavailable(message));
        }

        self.loading.store(true, Ordering::SeqCst);
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        info!("Loading embedding model {}", self.loader.describe());

        let loader = Arc::clone(&self.loader);
        let outcome = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| CvMatcherError::EmbeddingUnavailable(format!("model loader panicked: {}", e)))
            .and_then(|loaded| loaded.map(Arc::new));

        if let Ok(model) = &outcome {
            // Only the lock holder sets the cell, so this cannot already be filled.
            let _ = self.cell.set(Arc::clone(model));
        }
        self.record_outcome(&outcome);
        self.finished_attempts.fetch_add(1, Ordering::SeqCst);
        self.loading.store(false, Ordering::SeqCst);

        outcome
    }

    fn record_outcome(&self, outcome: &Result<Arc<L::Model>>) {
        let mut last_error = match self.last_error.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match outcome {
            Ok(_) => *last_error = None,
            Err(e) => {
                warn!("Embedding model failed to load: {}", e);
                *last_error = Some(match e {
                    CvMatcherError::EmbeddingUnavailable(message) => message.clone(),
                    other => other.to_string(),
                });
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        match self.last_error.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn state(&self) -> ModelState {
        if self.cell.initialized() {
            return ModelState::Ready;
        }
        if self.loading.load(Ordering::SeqCst) {
            return ModelState::Loading;
        }
        match self.last_error() {
            Some(message) => ModelState::Failed(message),
            None => ModelState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    /// Number of times the loader has been invoked.
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::EmbeddingModel;
    use std::time::Duration;

    struct ConstantModel;

    impl EmbeddingModel for ConstantModel {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    struct SlowLoader {
        calls: Arc<AtomicUsize>,
        fail_first: bool,
    }

    impl ModelLoader for SlowLoader {
        type Model = ConstantModel;

        fn load(&self) -> Result<ConstantModel> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            if self.fail_first && call == 0 {
                return Err(CvMatcherError::EmbeddingUnavailable("asset missing".to_string()));
            }
            Ok(ConstantModel)
        }

        fn describe(&self) -> String {
            "slow test loader".to_string()
        }
    }

    struct AlwaysFailingLoader {
        calls: Arc<AtomicUsize>,
    }

    impl ModelLoader for AlwaysFailingLoader {
        type Model = ConstantModel;

        fn load(&self) -> Result<ConstantModel> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            Err(CvMatcherError::EmbeddingUnavailable("asset missing".to_string()))
        }

        fn describe(&self) -> String {
            "always failing loader".to_string()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(ModelHandle::new(SlowLoader {
            calls: Arc::clone(&calls),
            fail_first: false,
        }));
        assert_eq!(handle.state(), ModelState::Uninitialized);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.get().await.map(|_| ()) })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.load_attempts(), 1);
        assert_eq!(handle.state(), ModelState::Ready);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = ModelHandle::new(SlowLoader {
            calls: Arc::clone(&calls),
            fail_first: true,
        });

        let first = handle.get().await;
        assert!(matches!(first, Err(CvMatcherError::EmbeddingUnavailable(_))));
        assert!(matches!(handle.state(), ModelState::Failed(_)));

        let second = handle.get().await;
        assert!(second.is_ok());
        assert_eq!(handle.state(), ModelState::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_failed_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(ModelHandle::new(AlwaysFailingLoader {
            calls: Arc::clone(&calls),
        }));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.get().await.map(|_| ()) })
            })
            .collect();

        let mut failures = 0;
        for task in tasks {
            let result = task.await.unwrap();
            assert!(matches!(result, Err(CvMatcherError::EmbeddingUnavailable(_))));
            failures += 1;
        }

        assert_eq!(failures, 8);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.load_attempts(), 1);
        assert_eq!(handle.state(), ModelState::Failed("asset missing".to_string()));

        // A caller arriving after the failed attempt starts a new one.
        assert!(handle.get().await.is_err());
        assert_eq!(handle.load_attempts(), 2);
    }

    #[tokio::test]
    async fn test_ready_model_is_reused() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = ModelHandle::new(SlowLoader {
            calls: Arc::clone(&calls),
            fail_first: false,
        });

        let a = handle.get().await.unwrap();
        let b = handle.get().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.embed("x").unwrap(), vec![1.0, 0.0]);
    }
}

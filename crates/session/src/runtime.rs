//! Verwaltung des Tokio-Runtimes für Session-Hosts, die selbst nicht async sind.

use std::{future::Future, sync::Arc};

use thiserror::Error;
use tokio::runtime::{Builder, Handle, Runtime};

/// Shared handle to the session runtime.
#[derive(Debug, Clone)]
pub struct SessionRuntime {
    runtime: Arc<Runtime>,
}

impl SessionRuntime {
    /// Builds a multi-thread runtime with `workers` worker threads.
    pub fn multi_thread(workers: usize) -> Result<Self, RuntimeError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers.max(1))
            .thread_name("session-runtime")
            .enable_all()
            .build()
            .map_err(RuntimeError::Build)?;
        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }

    /// Spawns a future onto the runtime.
    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// Runs `future` to completion on the calling thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Returns a clone of the internal [`Handle`].
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }
}

/// Errors that can be raised when constructing the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to build tokio runtime: {0}")]
    Build(std::io::Error),
}

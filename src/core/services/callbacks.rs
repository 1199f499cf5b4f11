use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::runtime::Handle;

use crate::core::errors::{ManagerError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::ConfiguredKey;
use crate::core::services::key_manager::KeyManager;
use crate::core::traits::key_decoder::KeyDecoder;
use crate::core::traits::keyring::Keyring;
use crate::core::traits::persistent_store::PersistentStore;

/// Callback-completed facade over a shared [`KeyManager`].
///
/// Every method returns immediately. The operation runs as a task on the
/// given runtime and the callback is invoked exactly once with its result.
/// If the task is dropped before it finishes, for example because the
/// runtime has shut down, the callback receives `ManagerError::Cancelled`.
pub struct CallbackManager<S, K, D> {
    manager: Arc<KeyManager<S, K, D>>,
    runtime: Handle,
}

/// Holds a pending callback and fires it with `Cancelled` if dropped unused.
struct Completion<T, F>
where
    F: FnOnce(Result<T>),
{
    callback: Option<F>,
    _result: PhantomData<fn(T)>,
}

impl<T, F> Completion<T, F>
where
    F: FnOnce(Result<T>),
{
    fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
            _result: PhantomData,
        }
    }

    fn complete(mut self, result: Result<T>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T, F> Drop for Completion<T, F>
where
    F: FnOnce(Result<T>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(Err(ManagerError::Cancelled));
        }
    }
}

impl<S, K, D> Clone for CallbackManager<S, K, D> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            runtime: self.runtime.clone(),
        }
    }
}

impl<S, K, D> CallbackManager<S, K, D>
where
    S: PersistentStore + 'static,
    K: Keyring + 'static,
    D: KeyDecoder + 'static,
{
    pub fn new(manager: KeyManager<S, K, D>, runtime: Handle) -> Self {
        Self::from_shared(Arc::new(manager), runtime)
    }

    /// Wrap a manager that is also used directly elsewhere.
    pub fn from_shared(manager: Arc<KeyManager<S, K, D>>, runtime: Handle) -> Self {
        Self { manager, runtime }
    }

    fn run<T, F, Fut>(&self, operation: Fut, callback: F)
    where
        T: Send + 'static,
        F: FnOnce(Result<T>) + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let completion = Completion::new(callback);
        self.runtime.spawn(async move {
            completion.complete(operation.await);
        });
    }

    pub fn add<F>(&self, name: impl Into<String>, pem_private_key: impl Into<String>, callback: F)
    where
        F: FnOnce(Result<KeyId>) + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        let name = name.into();
        let pem_private_key = pem_private_key.into();
        self.run(
            async move { manager.add(&name, &pem_private_key).await },
            callback,
        );
    }

    pub fn remove<F>(&self, id: KeyId, callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        self.run(async move { manager.remove(&id).await }, callback);
    }

    pub fn configured<F>(&self, callback: F)
    where
        F: FnOnce(Result<Vec<ConfiguredKey>>) + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        self.run(async move { manager.configured().await }, callback);
    }

    pub fn load<F>(&self, id: KeyId, passphrase: SecretString, callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        self.run(async move { manager.load(&id, passphrase).await }, callback);
    }

    pub fn unload<F>(&self, id: KeyId, callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        self.run(async move { manager.unload(&id).await }, callback);
    }

    pub fn loaded<F>(&self, callback: F)
    where
        F: FnOnce(Result<Vec<ConfiguredKey>>) + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        self.run(async move { manager.loaded().await }, callback);
    }
}

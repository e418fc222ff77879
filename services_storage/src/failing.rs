//! # Failing Backend
//!
//! A StorageBackend wrapper that can simulate failures for testing
//! partial-failure handling. Every call is recorded so tests can assert on
//! exactly which keys were touched and in what order.

use crate::backend::{ListPage, ListRequest, ObjectData, PutReceipt, StorageBackend};
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Backend primitive, used to target failures and label recorded calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    List,
    Get,
    Put,
    Delete,
}

impl BackendOp {
    fn is_write(self) -> bool {
        matches!(self, BackendOp::Put | BackendOp::Delete)
    }
}

impl fmt::Display for BackendOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendOp::List => write!(f, "list"),
            BackendOp::Get => write!(f, "get"),
            BackendOp::Put => write!(f, "put"),
            BackendOp::Delete => write!(f, "delete"),
        }
    }
}

/// Policy for when failures should occur
#[derive(Debug, Clone)]
pub enum FailurePolicy {
    /// Never fail (passthrough)
    Never,
    /// Fail every call of one operation
    Always(BackendOp),
    /// Fail one operation on specific keys (the prefix, for `list`)
    OnKeys { op: BackendOp, keys: Vec<String> },
    /// Fail every put or delete after N successful writes
    AfterWrites(usize),
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCall {
    /// Operation invoked
    pub op: BackendOp,
    /// Key, or list prefix
    pub key: String,
    /// Whether the call was failed by the policy
    pub injected_failure: bool,
}

#[derive(Debug)]
struct FailureState {
    policy: FailurePolicy,
    write_count: usize,
    calls: Vec<BackendCall>,
}

/// Wrapper around a StorageBackend that can simulate failures
pub struct FailingBackend<B: StorageBackend> {
    inner: B,
    state: Mutex<FailureState>,
}

impl<B: StorageBackend> FailingBackend<B> {
    /// Create a new failing backend with the given policy
    pub fn new(inner: B, policy: FailurePolicy) -> Self {
        Self {
            inner,
            state: Mutex::new(FailureState {
                policy,
                write_count: 0,
                calls: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FailureState> {
        // A panicking test thread must not hide the call log from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call and decides whether it fails
    fn check(&self, op: BackendOp, key: &str) -> StorageResult<()> {
        let mut state = self.state();
        let fail = match &state.policy {
            FailurePolicy::Never => false,
            FailurePolicy::Always(target) => *target == op,
            FailurePolicy::OnKeys { op: target, keys } => {
                *target == op && keys.iter().any(|k| k == key)
            }
            FailurePolicy::AfterWrites(n) => op.is_write() && state.write_count >= *n,
        };

        state.calls.push(BackendCall {
            op,
            key: key.to_string(),
            injected_failure: fail,
        });

        if fail {
            Err(StorageError::backend(
                "injected",
                format!("{} {} failed", op, key),
            ))
        } else {
            Ok(())
        }
    }

    fn record_write(&self) {
        self.state().write_count += 1;
    }

    /// Get the underlying backend (for inspection)
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Get the number of successful writes
    pub fn write_count(&self) -> usize {
        self.state().write_count
    }

    /// Returns every call made so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    /// Returns the keys passed to one operation, in call order
    pub fn keys_for(&self, op: BackendOp) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.key.clone())
            .collect()
    }

    /// Reset the failure policy and counters
    pub fn set_policy(&self, policy: FailurePolicy) {
        let mut state = self.state();
        state.policy = policy;
        state.write_count = 0;
        state.calls.clear();
    }
}

#[async_trait]
impl<B: StorageBackend> StorageBackend for FailingBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn list(&self, request: &ListRequest) -> StorageResult<ListPage> {
        self.check(BackendOp::List, &request.prefix)?;
        self.inner.list(request).await
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectData> {
        self.check(BackendOp::Get, key)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<PutReceipt> {
        self.check(BackendOp::Put, key)?;
        let receipt = self.inner.put(key, body, content_type).await?;
        self.record_write();
        Ok(receipt)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.check(BackendOp::Delete, key)?;
        self.inner.delete(key).await?;
        self.record_write();
        Ok(())
    }
}

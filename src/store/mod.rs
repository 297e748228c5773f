//! The local key-value store where the identity and the transactions are kept.
//!
//! Values are JSON strings under namespaced keys:
//! - `@gofinances:user` holds the signed-in `Identity`
//! - `@gofinances:transactions_user:<id>` holds the `TransactionRecord` list of one identity

mod file;
mod memory;

use crate::error::Res;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Prefix of every key written by this crate.
pub const NAMESPACE: &str = "@gofinances";

/// The key under which the signed-in identity is persisted.
pub fn user_key() -> String {
    format!("{NAMESPACE}:user")
}

/// The key under which the transactions of identity `id` are persisted.
pub fn transactions_key(id: &str) -> String {
    format!("{NAMESPACE}:transactions_user:{id}")
}

/// An asynchronous string key-value store. Implementations serialize individual calls; there are
/// no multi-key transactions.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none.
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// Reads the value under `key` and parses it as JSON.
pub(crate) async fn get_json<T>(storage: &dyn Storage, key: &str) -> Res<Option<T>>
where
    T: DeserializeOwned,
{
    debug!("Reading {key}");
    let Some(data) = storage.get_item(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&data)
        .with_context(|| format!("Unable to parse the value stored under '{key}'"))?;
    Ok(Some(value))
}

/// Serializes `value` as JSON and stores it under `key`.
pub(crate) async fn set_json<T>(storage: &dyn Storage, key: &str, value: &T) -> Res<()>
where
    T: Serialize + ?Sized,
{
    debug!("Writing {key}");
    let data = serde_json::to_string(value)
        .with_context(|| format!("Unable to serialize the value for '{key}'"))?;
    storage.set_item(key, &data).await
}

//! Redis store backend
//!
//! Thin adapter over a multiplexed async connection. Every call is bounded
//! by the configured deadline. There is no retry at this layer; retry
//! policy, if any, belongs to the caller.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisResult};
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::store::{BatchOp, Store};

/// Per-call limits for a [`RedisStore`]
#[derive(Debug, Clone)]
pub struct StorePolicy {
    /// Deadline applied to every store call, the connection handshake
    /// included
    pub timeout: Duration,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Production [`Store`] implementation over the `redis` crate
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    policy: StorePolicy,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `redis://127.0.0.1:6379/0`)
    pub async fn connect(url: &str, policy: StorePolicy) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = match timeout(policy.timeout, client.get_multiplexed_async_connection()).await {
            Ok(conn) => conn?,
            Err(_) => return Err(Error::Timeout),
        };
        Ok(Self { conn, policy })
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.policy.timeout, fut).await {
            Ok(reply) => reply.map_err(Error::from),
            Err(_) => Err(Error::Timeout),
        }
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.hset::<_, _, _, ()>(key, field, value).await })
            .await
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.hget::<_, _, Option<String>>(key, field).await })
            .await
    }

    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        let mut conn = self.conn.clone();
        let fields = self
            .bounded(async move {
                conn.hgetall::<_, std::collections::HashMap<String, String>>(key)
                    .await
            })
            .await?;
        Ok(fields.into_iter().collect())
    }

    async fn hash_len(&self, key: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.hlen::<_, usize>(key).await })
            .await
    }

    async fn hash_del(&self, key: &str, field: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.hdel::<_, _, ()>(key, field).await })
            .await
    }

    async fn hash_random_field(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded(async move {
            redis::cmd("HRANDFIELD")
                .arg(key)
                .query_async::<_, Option<String>>(&mut conn)
                .await
        })
        .await
    }

    async fn set_add(&self, key: &str, members: &[String]) -> Result<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.sadd::<_, _, ()>(key, members).await })
            .await
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> Result<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.srem::<_, _, ()>(key, members).await })
            .await
    }

    async fn set_union(&self, keys: &[String]) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.sunion::<_, Vec<String>>(keys).await })
            .await
    }

    async fn set_card(&self, key: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.scard::<_, usize>(key).await })
            .await
    }

    async fn delete_key(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.del::<_, ()>(key).await }).await
    }

    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);
        self.bounded(async move { conn.keys::<_, Vec<String>>(pattern).await })
            .await
    }

    async fn apply_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in &ops {
            match op {
                BatchOp::HashSet { key, field, value } => {
                    pipe.hset(key, field, value).ignore();
                }
                BatchOp::SetAdd { key, members } => {
                    if !members.is_empty() {
                        pipe.sadd(key, &members[..]).ignore();
                    }
                }
            }
        }
        let mut conn = self.conn.clone();
        self.bounded(async move { pipe.query_async::<_, ()>(&mut conn).await })
            .await
    }
}

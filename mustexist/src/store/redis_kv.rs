//! `RedisKeyValueStore` - Records Cached as JSON Strings in Redis
//!
//! `TigerStyle`: Real cache lookups, read-only, proper error mapping.
//!
//! Records live under `prefix + id` as JSON strings. Identifier lookups are
//! a single `EXISTS`; property lookups walk `SCAN MATCH prefix*` and fetch
//! each page with `MGET` (non-string keys come back as nil and never match).

use async_trait::async_trait;
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::AsyncCommands;

use super::adapter::StoreAdapter;
use super::error::{StoreError, StoreResult};
use super::keyvalue::{raw_value_matches, record_key};
use crate::constants::REDIS_SCAN_COUNT_DEFAULT;
use crate::expectation::{EntityId, PropertyMatcher};

/// Key-value store backed by Redis.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    name: String,
    prefix: String,
    scan_count: usize,
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKeyValueStore")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("scan_count", &self.scan_count)
            .finish_non_exhaustive()
    }
}

impl RedisKeyValueStore {
    /// Open a managed connection to `url`.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidConfig` for a malformed URL and
    /// `StoreError::Connection` if Redis cannot be reached.
    pub async fn connect(name: impl Into<String>, url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::invalid_config(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::connection(format!("failed to connect: {e}")))?;

        Ok(Self::from_connection(name, conn))
    }

    /// Wrap an existing managed connection.
    #[must_use]
    pub fn from_connection(name: impl Into<String>, conn: ConnectionManager) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            scan_count: REDIS_SCAN_COUNT_DEFAULT,
            conn,
        }
    }

    /// Only consider keys under `prefix`; ids are looked up as `prefix + id`.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Keys requested per `SCAN` round-trip.
    ///
    /// # Panics
    /// Panics if `count` is zero.
    #[must_use]
    pub fn with_scan_count(mut self, count: usize) -> Self {
        assert!(count > 0, "scan count must be positive");
        self.scan_count = count;
        self
    }

    fn scan_pattern(&self) -> String {
        format!("{}*", escape_glob(&self.prefix))
    }
}

/// Escape Redis glob metacharacters so the prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_redis_error(err: &redis::RedisError, operation: &'static str) -> StoreError {
    if err.is_timeout() {
        StoreError::timeout(operation)
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        StoreError::connection(format!("{operation}: {err}"))
    } else {
        StoreError::query(format!("{operation}: {err}"))
    }
}

fn scan_cmd(cursor: u64, pattern: &str, count: usize) -> redis::Cmd {
    let mut cmd = redis::cmd("SCAN");
    cmd.arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(count);
    cmd
}

async fn key_exists<C>(conn: &mut C, key: String) -> StoreResult<bool>
where
    C: ConnectionLike + Send + Sync,
{
    conn.exists(key)
        .await
        .map_err(|e| map_redis_error(&e, "exists_by_id"))
}

/// Walk every key matching `pattern` until one holds a matching record.
async fn any_record_matches<C>(
    conn: &mut C,
    pattern: &str,
    scan_count: usize,
    matcher: &PropertyMatcher,
) -> StoreResult<bool>
where
    C: ConnectionLike + Send + Sync,
{
    let mut cursor: u64 = 0;

    loop {
        let (next, keys): (u64, Vec<String>) = scan_cmd(cursor, pattern, scan_count)
            .query_async(conn)
            .await
            .map_err(|e| map_redis_error(&e, "exists_by_props"))?;

        if !keys.is_empty() {
            let values: Vec<Option<String>> = redis::cmd("MGET")
                .arg(&keys)
                .query_async(conn)
                .await
                .map_err(|e| map_redis_error(&e, "exists_by_props"))?;

            if values
                .iter()
                .flatten()
                .any(|raw| raw_value_matches(raw, matcher))
            {
                return Ok(true);
            }
        }

        if next == 0 {
            return Ok(false);
        }
        cursor = next;
    }
}

#[async_trait]
impl StoreAdapter for RedisKeyValueStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(store = %self.name))]
    async fn exists_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        key_exists(&mut conn, record_key(&self.prefix, id)).await
    }

    #[tracing::instrument(skip(self, matcher), fields(store = %self.name, fields = matcher.len()))]
    async fn exists_by_props(&self, matcher: &PropertyMatcher) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        any_record_matches(&mut conn, &self.scan_pattern(), self.scan_count, matcher).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use futures::future::BoxFuture;
    use redis::{Arg, ErrorKind, RedisError, RedisResult, Value};

    /// Connection that answers from a script and records every command.
    #[derive(Default)]
    struct ScriptedConnection {
        replies: VecDeque<RedisResult<Value>>,
        sent: Vec<Vec<String>>,
    }

    impl ScriptedConnection {
        fn reply(mut self, value: Value) -> Self {
            self.replies.push_back(Ok(value));
            self
        }

        fn fail(mut self, err: RedisError) -> Self {
            self.replies.push_back(Err(err));
            self
        }
    }

    impl ConnectionLike for ScriptedConnection {
        fn req_packed_command<'a>(&'a mut self, cmd: &'a redis::Cmd) -> BoxFuture<'a, RedisResult<Value>> {
            self.sent.push(
                cmd.args_iter()
                    .map(|arg| match arg {
                        Arg::Simple(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                        Arg::Cursor => "<cursor>".to_string(),
                    })
                    .collect(),
            );
            let reply = self
                .replies
                .pop_front()
                .unwrap_or_else(|| Err(RedisError::from((ErrorKind::ClientError, "script exhausted"))));
            Box::pin(async move { reply })
        }

        fn req_packed_commands<'a>(
            &'a mut self,
            _cmd: &'a redis::Pipeline,
            _offset: usize,
            _count: usize,
        ) -> BoxFuture<'a, RedisResult<Vec<Value>>> {
            Box::pin(async { Err(RedisError::from((ErrorKind::ClientError, "pipelines unused"))) })
        }

        fn get_db(&self) -> i64 {
            0
        }
    }

    fn bulk(text: &str) -> Value {
        Value::BulkString(text.as_bytes().to_vec())
    }

    fn scan_page(next: &str, keys: &[&str]) -> Value {
        Value::Array(vec![bulk(next), Value::Array(keys.iter().map(|k| bulk(k)).collect())])
    }

    fn timed_out() -> RedisError {
        RedisError::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out"))
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("pers:"), "pers:");
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }

    #[test]
    fn test_timeout_names_the_operation() {
        let err = map_redis_error(&timed_out(), "exists_by_id");
        assert!(
            matches!(&err, StoreError::Timeout { operation } if operation == "exists_by_id"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_other_errors_keep_the_message() {
        let err = map_redis_error(
            &RedisError::from((ErrorKind::TypeError, "wrong type")),
            "exists_by_props",
        );
        let StoreError::Query { message } = err else {
            panic!("expected Query, got {err:?}");
        };
        assert!(message.starts_with("exists_by_props: "));
        assert!(message.contains("wrong type"));
    }

    #[tokio::test]
    async fn test_key_exists_timeout_maps_to_operation() {
        let mut conn = ScriptedConnection::default().fail(timed_out());
        let err = key_exists(&mut conn, "pers:1".to_string()).await.unwrap_err();

        assert_eq!(conn.sent, vec![vec!["EXISTS".to_string(), "pers:1".to_string()]]);
        assert!(
            matches!(&err, StoreError::Timeout { operation } if operation == "exists_by_id"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_scan_walks_every_page_until_cursor_zero() {
        let mut conn = ScriptedConnection::default()
            .reply(scan_page("17", &["pers:1", "pers:2"]))
            .reply(Value::Array(vec![bulk(r#"{"lname":"Doe"}"#), Value::Nil]))
            .reply(scan_page("42", &[]))
            .reply(scan_page("0", &["pers:3"]))
            .reply(Value::Array(vec![bulk("not json")]));
        let matcher = PropertyMatcher::new().with("lname", "Smith");

        let found = any_record_matches(&mut conn, "pers\\*:*", 5, &matcher).await.unwrap();

        assert!(!found);
        let commands: Vec<Vec<&str>> = conn
            .sent
            .iter()
            .map(|args| args.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(
            commands,
            vec![
                vec!["SCAN", "0", "MATCH", "pers\\*:*", "COUNT", "5"],
                vec!["MGET", "pers:1", "pers:2"],
                vec!["SCAN", "17", "MATCH", "pers\\*:*", "COUNT", "5"],
                vec!["SCAN", "42", "MATCH", "pers\\*:*", "COUNT", "5"],
                vec!["MGET", "pers:3"],
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_stops_at_first_matching_page() {
        let mut conn = ScriptedConnection::default()
            .reply(scan_page("9", &["pers:1", "pers:2"]))
            .reply(Value::Array(vec![Value::Nil, bulk(r#"{"lname":"Smith","age":3}"#)]));
        let matcher = PropertyMatcher::new().with("lname", "Smith");

        let found = any_record_matches(&mut conn, "pers:*", 100, &matcher).await.unwrap();

        assert!(found);
        // Cursor 9 is never followed.
        assert_eq!(conn.sent.len(), 2);
        assert!(conn.replies.is_empty());
    }

    #[tokio::test]
    async fn test_scan_timeout_maps_to_operation() {
        let mut conn = ScriptedConnection::default()
            .reply(scan_page("0", &["pers:1"]))
            .fail(timed_out());
        let matcher = PropertyMatcher::new().with("lname", "Smith");

        let err = any_record_matches(&mut conn, "pers:*", 100, &matcher)
            .await
            .unwrap_err();

        assert!(
            matches!(&err, StoreError::Timeout { operation } if operation == "exists_by_props"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let err = RedisKeyValueStore::connect("redis", "not a url").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig { .. }));
    }

    // Requires a running Redis seeded with `pers:johnMalcowitch`.
    #[tokio::test]
    #[ignore = "requires MUSTEXIST_REDIS_URL"]
    async fn test_redis_lookups() {
        let url = std::env::var("MUSTEXIST_REDIS_URL").expect("MUSTEXIST_REDIS_URL");
        let store = RedisKeyValueStore::connect("redis", &url)
            .await
            .unwrap()
            .with_prefix("pers:");

        assert!(store
            .exists_by_id(&EntityId::from("johnMalcowitch"))
            .await
            .unwrap());
        assert!(store
            .exists_by_props(&PropertyMatcher::new().with("lname", "Malcowitch"))
            .await
            .unwrap());
    }
}

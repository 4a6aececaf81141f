//! Adapters for common client kinds.
//!
//! Each entry names the operations a client of that kind exposes. Integration
//! code implements [`Interceptable`](crate::intercept::Interceptable) for its
//! concrete client (or a newtype) and installs the matching entry.

use crate::hooks::Adapter;

/// HTTP clients that send one request per call.
pub const HTTP: Adapter = Adapter::new("http", &["request"]);

/// HTTP clients built around a prepared request object.
pub const HTTP_PERFORM: Adapter = Adapter::new("http-perform", &["perform"]);

/// HTTP clients that run a queue of requests together.
pub const HTTP_BATCH: Adapter = Adapter::new("http-batch", &["run"]);

/// HTTP clients that stream the response body to a callback.
pub const HTTP_STREAMING: Adapter = Adapter::new("http-streaming", &["do_get_block"]);

/// Redis connections.
pub const REDIS: Adapter = Adapter::new("redis", &["call"]);

/// Redis clients that push command batches through a single entry point.
pub const REDIS_PIPELINE: Adapter = Adapter::new("redis-pipeline", &["process"]);

/// AMQP channels.
pub const AMQP: Adapter = Adapter::new(
    "amqp",
    &[
        "basic_get",
        "basic_publish",
        "basic_ack",
        "basic_nack",
        "basic_consume",
        "basic_consume_with",
        "basic_recover",
        "basic_cancel",
        "basic_qos",
        "basic_reject",
    ],
);

/// Memcached clients.
pub const MEMCACHED: Adapter = Adapter::new("memcached", &["perform"]);

/// Wide-column store sessions.
pub const CASSANDRA: Adapter = Adapter::new("cassandra", &["execute", "prepare"]);

/// Everything in the catalog.
pub const ALL: &[Adapter] = &[
    HTTP,
    HTTP_PERFORM,
    HTTP_BATCH,
    HTTP_STREAMING,
    REDIS,
    REDIS_PIPELINE,
    AMQP,
    MEMCACHED,
    CASSANDRA,
    crate::hooks::database::DATABASE,
];

/// Look up a catalog entry by name.
pub fn find(name: &str) -> Option<&'static Adapter> {
    ALL.iter().find(|adapter| adapter.name == name)
}

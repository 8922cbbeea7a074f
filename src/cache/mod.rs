/*!
 * Durable translation cache backed by SQLite.
 *
 * Layout:
 * - `connection`: async-safe SQLite connection wrapper
 * - `schema`: table definitions and migrations
 * - `models`: persisted record types
 * - `store`: the cache operations (lookup, store, purge, accounting)
 */

pub mod connection;
pub mod models;
pub mod schema;
pub mod store;

pub use connection::CacheConnection;
pub use models::{hash_text, CacheStats, CachedTranslation, ProviderUsage};
pub use store::TranslationCache;

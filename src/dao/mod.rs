/// Key-value backends shared by every session.
pub mod kv_store;
/// Persisted document shapes.
pub mod models;
/// Typed repository over the shared round documents.
pub mod round_store;
/// Storage error types.
pub mod storage;

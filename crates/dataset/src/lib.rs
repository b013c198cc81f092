//! Dataset loader — pulls serialized table fragments from Azure Blob Storage
//! and concatenates them into one unified table.
//!
//! Runs once at process start. The public surface is deliberately small:
//! build a [`DatasetLoader`] from storage config, call
//! [`DatasetLoader::load`], get a table. Any failure along the way
//! (connection string, connectivity, auth, listing, download,
//! deserialization) is logged and degrades to the empty table — the process
//! starts with "no data" rather than refusing to start.

pub mod connection;
pub mod loader;
pub mod signing;

pub use connection::BlobAccount;
pub use loader::DatasetLoader;

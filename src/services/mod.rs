//! Protocol engines built on top of a [`crate::connection::Connection`]: the
//! two reference implementations spec.md calls out by name (the chunked
//! PutBytes uploader and the token-retried BlobDB client), plus the
//! higher-level services built from them and from the connection's other
//! registered endpoints directly.

pub mod app_install;
pub mod blobdb;
pub mod data_logging;
pub mod notifications;
pub mod putbytes;
pub mod screenshot;
pub mod voice;

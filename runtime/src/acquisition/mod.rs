//! Static page acquisition over plain HTTP.
//!
//! The browser renders every page that is harvested; this layer only reads
//! the seed's raw markup so the pattern extractor can be trained on it.

pub mod http_client;

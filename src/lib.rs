//! Personal workout log.
//!
//! Sets are recorded per user in an [`store::EntryStore`] and rolled up into
//! per-day volume summaries by [`aggregate`]. The `gymlog` CLI and the
//! `gymlog-server` HTTP service are thin shells over the views in [`views`].

pub mod aggregate;
pub mod auth;
pub mod backend;
pub mod config;
pub mod form;
pub mod models;
pub mod server;
pub mod store;
pub mod views;

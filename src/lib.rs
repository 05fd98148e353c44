//! Local item list manager with an animated uniform random pick.
//!
//! The library owns the state layer: an ordered [`models::Item`] collection,
//! its JSON persistence over a key-value [`store::BlobStore`], bulk import of
//! pasted text, and the frame-by-frame [`selector::RandomSelector`]. The
//! `rpick` binary is a thin front end over [`session::PickerSession`].

pub mod clipboard;
pub mod collection;
pub mod config;
pub mod import;
pub mod models;
pub mod notify;
pub mod selector;
pub mod session;
pub mod storage;
pub mod store;

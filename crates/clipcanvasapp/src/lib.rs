//! # Clipcanvas Architecture
//!
//! Clipcanvas turns a plain folder into a stack of **canvases**: each pasted
//! clipboard payload becomes one file in the folder, and the folder is browsed
//! oldest to newest with a cursor. This crate is the UI-agnostic core; the
//! `clipcanvas` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs, init.rs)                                │
//! │  - One navigation in flight, older ones cancelled           │
//! │  - 1-based display indexes, structured results              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collection + Display (collection.rs, paste/)               │
//! │  - Cursor, navigation and recovery from vanished items      │
//! │  - Paste models: text, markdown, image, media, web, file    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Classification (content_type.rs, reference.rs)             │
//! │  - Extension tables, text sniffing, reference resolution    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract FileSystem trait                                │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Results, Not Panics
//!
//! Operations that a UI reacts to return an [`OperationResult`](result::OperationResult):
//! a code, a message and an optional [`CanvasError`](error::CanvasError) cause.
//! Cancellation is a result like any other (`Cancelled`), never an error path
//! of its own. Nothing from `api.rs` inward writes to stdout/stderr; diagnostics
//! go through `tracing`.
//!
//! ## Events
//!
//! A collection announces what a UI should do next (open the new canvas, show
//! a tip, go back to the collection list) through [`events::CollectionEvent`]s.
//! Any number of subscribers may listen; closed ones are dropped.
//!
//! ## Testing Strategy
//!
//! 1. **Unit tests** next to each module, almost all on [`store::mem_backend::MemBackend`],
//!    which can remove files behind the engine's back, deny access and fail writes.
//! 2. **Integration tests** (`tests/`) run the same scenarios on a real temp folder.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade a UI drives
//! - [`init`]: data directory, config loading, collection opening
//! - [`collection`]: collection model, cursor and recovery
//! - [`paste`]: canvas display and per-type paste models
//! - [`content_type`]: classification of files, folders and payloads
//! - [`reference`]: `.ccref` files pointing at content elsewhere
//! - [`canvas_item`]: collection entries and their cached sources
//! - [`payload`]: what a clipboard can hand over
//! - [`events`]: collection events and the fan-out bus
//! - [`config`]: user settings
//! - [`result`], [`error`]: outcome codes and causes
//! - [`store`]: file system abstraction

pub mod api;
pub mod canvas_item;
pub mod collection;
pub mod config;
pub mod content_type;
pub mod error;
pub mod events;
pub mod init;
pub mod paste;
pub mod payload;
pub mod reference;
pub mod result;
pub mod store;

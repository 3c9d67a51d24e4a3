// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. session::SessionEvent)
    clippy::module_name_repetitions
)]

//! # mdtab
//!
//! A tabbed terminal markdown editor with live preview.
//!
//! mdtab edits several markdown files side by side in tabs with:
//! - A rendered preview pane next to the editor
//! - Dirty tracking per tab, with confirmation before anything is discarded
//! - Save-as for new files and HTML export
//! - A bundled Markdown cheatsheet opened on startup
//!
//! ## Architecture
//!
//! The [`session::Session`] owns the open documents and decides what may be
//! saved, closed or discarded. The terminal UI uses The Elm Architecture
//! (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop, state and key handling
//! - [`session`]: Open documents, dirty state, save/close/exit flows
//! - [`render`]: Markdown to HTML and to styled terminal lines
//! - [`storage`]: File access behind a trait
//! - [`editor`]: Rope-backed text buffer
//! - [`ui`]: Terminal UI components
//! - [`config`]: Saved default flags
//! - [`bootstrap`]: First-run application directory setup

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod editor;
pub mod perf;
pub mod render;
pub mod session;
pub mod storage;
pub mod ui;

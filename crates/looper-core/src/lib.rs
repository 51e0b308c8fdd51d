//! Plugin-driven file transformation loop.
//!
//! This crate provides:
//! - [`Looper`]: copies a source tree into a workspace and runs every
//!   registered plugin over every file, for one or more iterations
//! - [`FileDescriptor`]: the per-file view handed to plugins, with an HTML
//!   [`Document`](looper_document::Document) attached for `.html` files
//! - [`PluginOptions`] and [`MatchRule`]: per-plugin file rules
//! - [`RunRequest`]: per-run plugin selection by id and category
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use looper_config::Config;
//! use looper_core::{FileDescriptor, Looper, PluginOptions, PluginResult, RunRequest};
//!
//! let config = Config::load(None, None)?;
//! let mut looper = Looper::from_config(&config);
//! looper.register_plugin(
//!     |file: &mut FileDescriptor| -> PluginResult {
//!         if let Some(document) = file.document_mut() {
//!             if let Some(body) = document.find_mut("body") {
//!                 body.set_attr("data-loop", "done");
//!             }
//!             file.use_document();
//!         }
//!         Ok(())
//!     },
//!     Some(PluginOptions::new().with_id("stamp").with_categories(["html"])),
//! );
//!
//! let summary = looper.run(Some(&RunRequest::from(&config.run)))?;
//! println!("processed {} files", summary.files_processed);
//! # Ok(())
//! # }
//! ```

mod descriptor;
mod error;
mod filter;
mod looper;
mod plugin;
mod request;

pub use descriptor::{FileDescriptor, Rename, Representation};
pub use error::LoopError;
pub use filter::{Condition, MatchRule, declared_pass, request_pass, should_run};
pub use looper::{Looper, LooperOptions, RunSummary};
pub use plugin::{Plugin, PluginEntry, PluginError, PluginOptions, PluginRegistry, PluginResult};
pub use request::{DEFAULT_ITERATION_COUNT, RunRequest, Selection};

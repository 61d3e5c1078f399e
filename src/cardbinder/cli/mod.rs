//! # CLI Layer
//!
//! This module is **one possible UI client** for the binder library, and the
//! "hosting shell" that owns the single live binder for one invocation.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, prompts)
//! - Uses `std::process::exit`
//! - Handles argument parsing
//! - Initialises logging
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Resolve the data directory, load config, open the API
//! 3. **Confirmation**: Ask before destructive operations (`clear`, shrinking capacity)
//! 4. **API Dispatch**: Call the appropriate `BinderApi` method
//! 5. **Output Formatting**: Turn a `CmdResult` into a grid, lists and colored messages
//!
//! Slots are numbered from 1 on the command line and converted to 0-based
//! global indexes before they reach the API.
//!
//! ## Structure
//!
//! - `setup`: clap definitions, version string, grouped help
//! - `commands`: `run()` plus one `handle_*()` per subcommand
//! - `interrupt`: Ctrl-C routed to the cancel flag during loads and imports
//! - `render`: string builders for the grid, search results and messages
//! - `styles`: terminal styles

mod commands;
mod interrupt;
mod render;
mod setup;
mod styles;

pub use commands::run;

//! `tbd` - to be defined.
//!
//! A small CLI that merges text templates with variable sources. The
//! substitution itself is done by [`tbd_template`]; this crate gathers the
//! inputs:
//!
//! - [`fetch`] loads templates and variable files from paths, URLs or stdin
//! - [`vars`] builds the variable set from built-ins, dotenv and JSON files
//! - [`vcs`] adds git repository metadata to the built-ins
//! - [`table`] renders the variable listing
//!
//! # Commands
//!
//! ```text
//! tbd merge <TEMPLATE> [ENV_FILE...]   substitute placeholders, print result
//! tbd marks <TEMPLATE>                 list placeholders
//! tbd vars [ENV_FILE...]               show available variables
//! ```

pub mod cli;
pub mod fetch;
pub mod table;
pub mod vars;
pub mod vcs;

pub use cli::{Cli, Command, Settings};

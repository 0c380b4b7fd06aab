//! CLI command implementations.
//!
//! One module per subcommand. Commands wire file I/O, the diff engine and the
//! transport together; none of them hold protocol logic of their own.

pub mod diff;
pub mod models;
pub mod request;
pub mod serve;
pub mod utils;

// Re-export main command functions
pub use diff::{execute_diff, validate_diff_args};
pub use models::{DiffArgs, RequestArgs, ServeArgs};
pub use request::execute_request;
pub use serve::{execute_serve, resolve_config};
pub use utils::{display_schema, display_version};

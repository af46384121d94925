//! Base-directory security validator and the document file service built on it.
//!
//! Every path a document writer, template loader or editor touches goes
//! through [`validate_base_dir`] once per project root and
//! [`validate_path_within_base_dir`] once per request. Both return canonical
//! paths; I/O must use those, never the untrusted input.

pub mod canonical;
pub mod config;
pub mod containment;
pub mod errors;
pub mod logging;
pub mod mcp;
pub mod server;
pub mod tools;
pub mod transport;
pub mod validation_error;
pub mod validator;
pub mod workspace;


pub use validation_error::{ErrorCode, ValidationError, ValidationResult};
pub use validator::{validate_base_dir, validate_path_within_base_dir, BaseDirValidator, ValidateOptions};
pub use workspace::set_test_workspace_root;

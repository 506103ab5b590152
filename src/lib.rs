//! Tagify contact book core.
//!
//! A local store of contacts labelled with free-form tags, plus the import
//! pipeline that merges an exported document back in:
//!
//! ```text
//! bytes -> validate -> partition (identity) -> prompt once -> apply -> save
//! ```
//!
//! The UI shell drives everything through [`state::AppState`] and supplies
//! the platform collaborators in [`gateway`].

pub mod error;
pub mod export;
pub mod gateway;
pub mod identity;
pub mod queries;
pub mod reconcile;
pub mod state;
pub mod store;
pub mod types;
pub mod util;
pub mod validate;

pub use error::{FormatError, GatewayError, ImportError, MutationError, UserFacingError};
pub use reconcile::{Decision, ImportResult};
pub use state::AppState;
pub use store::{Contact, ContactDraft, ContactPatch, ContactStore, Tag};

/// Route `log` output to stderr. `RUST_LOG` overrides the default `info`
/// filter. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .try_init();
}

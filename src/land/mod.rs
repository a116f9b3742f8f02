//! Landing engine for pull requests
//!
//! Four stages, mutation gated behind verification:
//! 1. Fetch + verify - the staged commit set must match the provider's
//!    expected set before anything touches the tree (effectful, read-only)
//! 2. Apply + fold - cherry-pick the range, squash to one commit (effectful)
//! 3. Reconcile - merge metadata trailers into the message (pure, testable)
//! 4. Validate - external message validator, landed-range reporting

mod amend;
mod apply;
mod fetch;
mod trailers;
mod validate;

pub use amend::{amend_with_consent, save_message_file};
pub use apply::{CherryPicker, Squasher, apply_with_checkpoint};
pub use fetch::PatchFetcher;
pub use trailers::{ReconciledMessage, reconcile_trailers};
pub use validate::{LandValidator, landed_range};

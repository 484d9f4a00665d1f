//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the identity and post stores.

mod account;
mod post;

pub use account::AccountService;
pub use post::PostService;

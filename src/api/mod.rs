//! # API Module
//!
//! HTTP handlers served by the short-lived redirect listener (see
//! [`crate::server`]). There is exactly one real endpoint:
//!
//! - [`callback`] - receives Spotify's authorization redirect and hands its
//!   query parameters to the login that is waiting for them.
//!
//! Every other path answers [`not_found`] and leaves the listener running,
//! so stray requests (favicons, probes) cannot end a sign-in early.

mod callback;

pub use callback::CallbackSlot;
pub use callback::callback;
pub use callback::not_found;

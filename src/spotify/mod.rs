//! # Spotify Integration Module
//!
//! Talks to the two Spotify services the assistant needs:
//!
//! - [`token`] - the accounts service token endpoint (`POST /api/token`),
//!   used for the authorization-code grant after sign-in and for the
//!   refresh-token grant whenever the access token has expired.
//! - [`client`] - the Web API (`/tracks`, `/search`, `/audio-features`,
//!   `/recommendations`), bearer-authenticated with a token obtained from
//!   [`crate::management::CredentialManager`] on every call.
//!
//! ## Error Types
//!
//! - Token grants fail with [`crate::Error::AuthExchange`], carrying the HTTP
//!   status (if any) and the provider's error body. They are never retried:
//!   authorization codes are single-use.
//! - Web API calls fail with [`crate::Error::Api`] for non-2xx responses and
//!   [`crate::Error::Http`] for transport failures.

pub mod client;
pub mod token;

pub use client::SpotifyClient;
pub use token::TokenClient;

//! Server-side sessions
//!
//! A session maps an opaque random token, carried in the `session_id` cookie,
//! to the account that logged in and the moment the session stops being valid.

pub mod cookie;
pub mod store;

pub use cookie::{removal_cookie, session_cookie, SESSION_COOKIE};
pub use store::{IssuedSession, SessionError, SessionStore, SessionSubject};

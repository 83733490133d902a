//! Member profiles: the caller's own profile and public profiles.

mod service;

pub use service::UserService;

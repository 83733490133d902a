//! Review module: review writes bundled with rating aggregation.

mod service;

pub use service::{ReviewOutcome, ReviewService};

#[cfg(test)]
mod tests;

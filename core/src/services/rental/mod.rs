//! Rental lifecycle module: booking creation, status transitions and
//! rental queries.

mod service;

pub use service::RentalService;

#[cfg(test)]
mod tests;

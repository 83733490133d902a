//! MySQL implementation of the entity store.

mod rows;
mod store;
mod transaction;

pub use store::MySqlEntityStore;
pub use transaction::MySqlTransaction;

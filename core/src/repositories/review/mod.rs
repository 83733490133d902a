//! Review repository module.

mod r#trait;
pub use r#trait::ReviewRepository;

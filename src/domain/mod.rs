pub mod classifier;
pub mod journal;
pub mod leave;
pub mod models;

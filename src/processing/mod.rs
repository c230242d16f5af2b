pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod schema;

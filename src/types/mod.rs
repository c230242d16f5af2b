pub mod columns;
pub mod location;
pub mod observation;

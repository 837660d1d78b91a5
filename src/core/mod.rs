pub mod errors;
pub mod input;
pub mod models;
pub mod registry;

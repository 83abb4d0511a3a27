pub mod core;
pub mod import;
pub mod session;
pub mod setup;
pub mod students;

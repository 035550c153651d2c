// Library target holding the quiz core. The terminal front end in main.rs
// and the integration tests under tests/ both build on these modules.

pub mod engine;
pub mod session;
pub mod store;

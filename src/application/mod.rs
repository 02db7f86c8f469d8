pub mod date_selector;
pub mod registry;
pub mod session;

pub mod info;
pub mod service;
pub mod store;
pub mod user;

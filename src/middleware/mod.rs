// Middleware shared by every service

pub mod cors;

pub use cors::*;

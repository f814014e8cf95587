pub mod engine;
pub mod entry;
pub mod error;
pub mod handler;
pub mod key;

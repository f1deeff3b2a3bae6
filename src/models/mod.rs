//! Models module

pub mod chat;
pub mod dataset;
pub mod notification;
pub mod search;

pub use chat::*;
pub use dataset::*;
pub use notification::*;
pub use search::*;

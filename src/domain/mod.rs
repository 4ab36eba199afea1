pub mod catalogue;
pub mod entities;
pub mod protocol;
pub mod types;

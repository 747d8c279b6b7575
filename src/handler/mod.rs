pub mod error;
pub mod handler;
pub mod page;
pub mod regions;

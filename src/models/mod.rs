pub mod auth;
pub mod customer;
pub mod enums;
pub mod medication;
pub mod report;

pub use auth::*;
pub use customer::*;
pub use medication::*;
pub use report::*;

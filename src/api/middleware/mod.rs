//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator (bearer token → customer)
//! 2. Audit logger (logs after auth, has med_id)

pub mod audit;
pub mod auth;

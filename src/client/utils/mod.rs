pub mod approval_overlay;
pub mod local_store;
pub mod session_store;

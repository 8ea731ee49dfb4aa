//! Input processing module
//! Handles file detection, record conversion and role resolution

pub mod catalog;
pub mod file_detector;
pub mod manager;
pub mod records;

pub use catalog::{RoleCatalog, RoleResolver};
pub use manager::InputManager;

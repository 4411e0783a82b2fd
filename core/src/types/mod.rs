//! Core type definitions for the CT nodule viewer
//!
//! This module provides the fundamental types used throughout the pulmoscan library:
//! - [`Malignancy`]: 1-5 predicted malignancy rating with display labels
//! - [`Window`]: CT intensity window (level/width) and its clip bounds

mod malignancy;
mod window;

pub use malignancy::Malignancy;
pub use window::{Window, DEFAULT_WINDOW};

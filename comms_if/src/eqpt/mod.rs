//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod dbw;

//! Point annotation editor for marking stomata on microscope images.
//!
//! [`editor::Editor`] owns the point set, its session-local ids and the
//! dirty flag. It draws through a [`surface::MarkerSurface`] and asks before
//! discarding changes through a [`surface::Confirm`], so it runs the same
//! against the egui canvas and against test doubles.

pub mod config;
pub mod editor;
pub mod model;
pub mod navigation;
pub mod payload;
pub mod storage;
pub mod surface;

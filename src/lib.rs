//! Hotel room catalog with an interactive 360° panorama viewer.

pub mod app;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fonts;
pub mod i18n;
pub mod input;
pub mod loader;
pub mod media;
pub mod mesh;
pub mod overlay;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod surface;
pub mod viewer;

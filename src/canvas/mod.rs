pub mod editor;
pub mod memory;
pub mod model;
pub mod raster;

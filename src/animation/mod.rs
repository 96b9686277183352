pub mod ease;
pub mod timer;

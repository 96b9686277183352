pub mod autosave;
pub mod candidate;
pub mod commit;
pub mod export;
pub mod placement;
pub mod reveal;
pub mod region;
pub mod staging;

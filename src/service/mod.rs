pub mod generation;
#[cfg(feature = "http")]
pub mod http;
pub mod projects;

pub mod request;
pub mod transcript;

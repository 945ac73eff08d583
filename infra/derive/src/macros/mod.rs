pub mod error;
mod status;

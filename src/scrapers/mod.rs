pub mod base;
#[cfg(feature = "browser")]
pub mod chrome;
pub mod extractor;
pub mod navigator;
pub mod testing;

pub mod assets;
pub mod cache;
pub mod import;

pub mod archive;
pub mod config;
pub mod logging;
pub mod resource;
pub mod storage;
pub mod version;

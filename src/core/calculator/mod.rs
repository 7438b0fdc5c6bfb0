pub mod status;
pub mod timeline;

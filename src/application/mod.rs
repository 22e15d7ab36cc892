pub mod app;
pub mod reader;

pub mod app;
pub mod cell;
pub mod header;
pub mod table;

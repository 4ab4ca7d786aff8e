pub mod column;
pub mod config;
pub mod data_model;
pub mod edit;
pub mod filter;
pub mod grouping;
pub mod infinite;
pub mod layout;
pub mod sort;
pub mod table_state;
pub mod virtualizer;

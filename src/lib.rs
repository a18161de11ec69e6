// No unsafe here!
#![forbid(unsafe_code)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate serde;

// Shared (structs) between stages and the binary
pub mod shared_interface;
pub mod schema;
pub mod config;
pub mod cli;

// Parsing
pub mod parse_csv;
pub mod parse_array;

// Preprocessing
pub mod preprocessing;

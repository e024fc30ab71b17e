//! Storage abstractions for service layer
//!
//! Contains the file-backed persistence primitive shared by stores that keep
//! a small collection as one JSON document.

pub mod json_file;

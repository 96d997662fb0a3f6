pub mod edit_buffer;
pub mod editor;
pub mod error;
pub mod ports;
pub mod service;
pub mod view;

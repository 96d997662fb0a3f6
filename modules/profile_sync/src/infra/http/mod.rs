mod client;
mod rest_remote;

pub use client::TracedClient;
pub use rest_remote::HttpProfileRemote;

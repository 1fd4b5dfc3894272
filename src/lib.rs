// Library root. The binaries in src/main.rs and src/bin/ are thin wrappers.

pub mod cli;
pub mod client;
pub mod config;
pub mod draft;
pub mod error;
pub mod frontend;
pub mod logger;
pub mod session;
pub mod view;

#[cfg(feature = "server")]
pub mod llm;
#[cfg(feature = "server")]
pub mod server;

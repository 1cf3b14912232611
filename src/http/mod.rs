pub mod dump;
pub mod server;

pub mod helpers;
pub mod status_server;

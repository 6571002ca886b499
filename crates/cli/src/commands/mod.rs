pub mod chat;
pub mod config_cmd;
pub mod contexts;
pub mod doctor;
pub mod serve;

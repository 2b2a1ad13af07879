pub mod auth;
pub mod pickup;
pub mod settings;
pub mod tiny;
pub mod transportadora;

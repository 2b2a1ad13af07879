pub mod credential_vault;
pub use credential_vault::CredentialVault;
pub mod order_status;
pub use order_status::OrderStatusSync;
pub mod pickup_service;
pub use pickup_service::PickupService;
pub mod tiny_legacy;
pub use tiny_legacy::TinyLegacyClient;
pub mod tiny_oauth;
pub use tiny_oauth::TinyOAuthClient;
pub mod transportadora_service;
pub use transportadora_service::TransportadoraService;

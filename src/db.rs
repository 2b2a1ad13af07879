pub mod pickup_repo;
pub use pickup_repo::PickupRepository;
pub mod settings_repo;
pub use settings_repo::TinySettingsRepository;
pub mod transportadora_repo;
pub use transportadora_repo::TransportadoraRepository;
pub mod workspace_repo;
pub use workspace_repo::WorkspaceRepository;

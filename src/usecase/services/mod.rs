pub mod export_service;
pub mod load_service;
pub mod normalize;
pub mod scenario_service;

pub mod polygon_service;

pub use polygon_service::PolygonService;

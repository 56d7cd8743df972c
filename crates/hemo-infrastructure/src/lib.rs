//! Infrastructure layer for HEMO.
//!
//! Loads the engine configuration from disk and provides the HTTP binding of
//! the detector port.

pub mod config_service;
pub mod http_detector;
pub mod paths;

pub use config_service::ConfigService;
pub use http_detector::HttpDetector;
pub use paths::HemoPaths;

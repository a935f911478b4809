// Adapters layer: concrete case sources for the extraction boundary.

pub mod file_source;
pub mod http_source;

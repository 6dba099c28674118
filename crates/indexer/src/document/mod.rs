//! Document module — normalized output records and the mapping into them.

pub mod model;
pub mod request;
pub mod map;
pub mod extract;

pub use model::OutputRecord;
pub use map::DocumentMapper;
pub use request::RequestLine;

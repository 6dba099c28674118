// Module structure for the access-log indexer.

// Core
pub mod parser;
pub mod document;
pub mod pipeline;

// Process
pub mod conf;
pub mod runtime;

// Pipeline configuration and error taxonomy
pub mod config;
pub mod error;

// Text generation backends
pub mod generation;

// Search, page fetching and keyword volume clients
pub mod external;

// Console prompting
pub mod interactive;

// Idea to 30-day plan
pub mod planner;

// Tone guide and per-day posts
pub mod content;

// Platform rendering and publishing
pub mod render;

// Shared stage machinery and artifact I/O
pub mod workflow_utils;

pub mod telemetry;

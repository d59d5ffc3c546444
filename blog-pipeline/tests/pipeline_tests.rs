//! Integration tests for the blog pipeline
//!
//! Every external service is stubbed:
//! - Planning from idea to persisted 30-day plan
//! - Daily generation and resume state
//! - Batch runs and the consecutive-failure limit
//! - Rendering with the shipped templates

mod pipeline {
    mod common;
    mod test_planning;
    mod test_generation;
    mod test_render;
}

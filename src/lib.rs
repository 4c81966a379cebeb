// Respace: semantic vector representations of free-text survey responses.
//
// This is the library root. Each module corresponds to one stage of the
// response-to-vector pipeline.

pub mod aggregate;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod responses;
pub mod space;
pub mod tabular;
pub mod text;

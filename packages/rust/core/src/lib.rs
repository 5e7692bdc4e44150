//! Search build orchestration for docsearch.
//!
//! This crate ties together markdown normalization, per-version corpus
//! assembly and index publishing into the two-phase build driven by the host
//! site generator ([`pipeline::Pipeline::prepare`] then [`pipeline::finalize`]).

pub mod corpus;
pub mod normalizer;
pub mod pipeline;
pub mod publisher;

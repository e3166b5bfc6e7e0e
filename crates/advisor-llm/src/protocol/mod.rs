//! Wire formats for completion APIs.

pub mod openai;

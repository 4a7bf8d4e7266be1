//! Pipeline stages for image submission and report classification.
//!
//! Each submodule implements exactly one step, so each can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ transport ──▶ classify
//! (URL/file) (form/JSON) (HTTP)     (sections)
//! ```
//!
//! 1. [`input`]: pick URL or file, load files, reject empty or oversized input
//! 2. [`encode`]: build multipart fields, base64 data URIs and JSON envelopes
//! 3. [`transport`]: the [`transport::Transport`] seam and its reqwest implementation
//! 4. [`classify`]: split the result text and file each unit under a category

pub mod classify;
pub mod encode;
pub mod input;
pub mod transport;

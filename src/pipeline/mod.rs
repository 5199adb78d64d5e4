//! Pipeline stages for turning `<img>` elements into on-disk artifacts.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the orchestration in [`crate::scan`] stays a
//! plain sequence of calls.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ resolve / data: ──▶ acquire ──▶ normalize ──▶ write
//! (<img>)     (absolute URL)      (bytes)     (file name)   (path)
//! ```
//!
//! 1. [`extract`]   — choose the source reference by attribute priority
//! 2. [`resolve`]   — make relative references absolute against the page URL
//! 3. [`acquire`]   — decode inline base64 data or GET the remote URL; the
//!    only stage with network I/O
//! 4. [`normalize`] — derive a bounded, filesystem-safe file name
//! 5. [`write`]     — persist the bytes into the output directory

pub mod acquire;
pub mod extract;
pub mod normalize;
pub mod resolve;
pub mod write;

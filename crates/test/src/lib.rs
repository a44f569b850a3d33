//! End-to-end runs of the full probe sequence against the in-memory node.
//!
//! All tests live under `tests/`.

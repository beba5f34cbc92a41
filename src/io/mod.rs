//! Board input loading. Explicitly out of scope for the engine itself (§1
//! "file I/O for loading boards" is an external provider), kept here as the
//! ambient provider the binary needs to get `(rows, cols, values)` from disk.

pub mod board_file;

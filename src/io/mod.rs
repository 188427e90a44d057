//! File I/O for the command-line tool.

pub mod wav;

//! Process exit codes. Per-clue generation failures never change the code.

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 1; // Output could not be written, or another unexpected failure
pub const INPUT_ERROR: i32 = 2; // Clue list missing or unparsable
pub const CONFIG_ERROR: i32 = 3; // Config file unreadable or invalid

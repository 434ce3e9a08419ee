//! Utility modules

pub mod file_validation;
pub mod text;

// Re-export text utilities at the util level
pub use text::{char_to_byte, chars_to_bytes, column_offset, is_word_boundary, split_lines};

// Re-export file validation utilities
pub use file_validation::{read_document, FileOpenError, MAX_FILE_SIZE};

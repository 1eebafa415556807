pub mod sanitize;

pub use sanitize::SqlSanitizer;

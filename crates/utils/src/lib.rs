pub mod fs;
pub mod response;
pub mod sanitize;

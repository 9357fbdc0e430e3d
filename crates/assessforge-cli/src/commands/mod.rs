pub mod init;
pub mod inspect;
pub mod render;
pub mod score;
pub mod validate;

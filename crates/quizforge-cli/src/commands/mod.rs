pub mod export;
pub mod init;
pub mod play;
pub mod shared;
pub mod simulate;
pub mod validate;

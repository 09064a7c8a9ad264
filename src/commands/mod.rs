pub mod check;
pub mod convert;
pub mod fetch;
pub mod init_config;

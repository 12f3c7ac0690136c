pub mod cell;
pub mod member;
pub mod serial;
pub mod subscription;

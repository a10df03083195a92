//! 数据模型模块

pub mod auth;
pub mod catalog;
pub mod user;

//! myFlix 影片目录 API
//! 认证核心（密码哈希、令牌签发与校验、所有权检查）与影片目录 REST 服务

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;

pub mod app;
pub mod authentication;
pub mod client;
pub mod config;
pub mod crud_ops;
pub mod entities;
pub mod error;
pub mod filter;
pub mod routes;
pub mod storage;
pub mod todo_store;
pub mod validation;

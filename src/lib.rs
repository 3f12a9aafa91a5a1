pub mod api;
pub mod config;
pub mod error;
pub mod gpa;
pub mod grades;
pub mod models;
pub mod remote;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod templates;
pub mod validation;

//! Core domain: authentication pipeline, user store and configuration

pub mod auth;
pub mod config;
pub mod db;

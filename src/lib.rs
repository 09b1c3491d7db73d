pub mod common;
pub mod database;
pub mod factory;
pub mod models;
pub mod notify;
pub mod schedulers;
pub mod source;
pub mod strategy;
pub mod web;

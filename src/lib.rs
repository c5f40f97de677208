pub mod admin;
pub mod api;
pub mod app;
pub mod auth;
pub mod cards;
pub mod config;
pub mod images;
pub mod routes;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;

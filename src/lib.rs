pub mod app;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod evolution;
pub mod favourites;
pub mod output;
pub mod profile;
pub mod store;
pub mod view;

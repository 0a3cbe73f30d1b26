pub mod assets;
pub mod backend;
pub mod compute;
pub mod config;
pub mod consts;
pub mod display;
pub mod entities;
pub mod screens;

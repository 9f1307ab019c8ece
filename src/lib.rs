//! snap-describe
//!
//! カメラで静止画を1枚撮影し、Vision APIで説明文を取得して表示する。

pub mod app;
pub mod camera_backend;
pub mod capture;
pub mod cli;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod state;

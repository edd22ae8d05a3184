#![allow(dead_code)]

pub mod geo_server;
pub mod scripted;

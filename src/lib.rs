#![allow(dead_code)]

pub mod api;
pub mod commission;
pub mod common;
pub mod config;
pub mod db;
pub mod entity;
pub mod migration;
pub mod network;
pub mod purchase;
pub mod report;
pub mod trace;
pub mod web;

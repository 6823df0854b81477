//! HTTP handlers for metier-api.

pub mod admin;
pub mod compare;
pub mod health;
pub mod occupations;
pub mod search;
pub mod simulation;

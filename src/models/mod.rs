//! Request and Response models for the cache admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::SetRequest;
pub use responses::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetResponse, StatsResponse,
};

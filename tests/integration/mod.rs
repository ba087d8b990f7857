//! Shared fixtures for the mock-server integration tests.

#![allow(dead_code)]

pub mod mock_server;

//! ShareSync Core - Domain types and collaborator ports
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `SlotKind`, `EndpointConfig`, `SyncJob`, `LogEntry`
//! - **Port definitions** - Traits for adapters: `IEndpointConnector`,
//!   `IMirrorExecutor`, `ICapabilityProbe`
//! - **Configuration** - YAML-backed settings with validation
//!
//! # Architecture
//!
//! The domain module contains pure state and transition rules with no I/O.
//! Ports define trait interfaces that adapter crates implement. The
//! orchestration engine that sequences them lives in `sharesync-sync`.

pub mod config;
pub mod domain;
pub mod ports;

//! Hetzner Cloud provider for vipswitch
//!
//! This crate implements the [`CloudResourceClient`](vipswitch_cloud::CloudResourceClient)
//! trait on top of the Hetzner Cloud REST API.
//!
//! # Features
//!
//! - Floating IP, network and server lookup by name
//! - Floating IP assignment (`POST /floating_ips/{id}/actions/assign`)
//! - Alias IP replacement (`POST /servers/{id}/actions/change_alias_ips`)
//! - Action status polling (`GET /actions/{id}`)
//!
//! # Requirements
//!
//! - A Hetzner Cloud API token with read/write access to the project
//!
//! # Example
//!
//! ```ignore
//! use vipswitch_cloud_hetzner::{HetznerClient, HetznerConfig};
//! use vipswitch_cloud::CloudResourceClient;
//!
//! let client = HetznerClient::new(HetznerConfig::new(token))?;
//!
//! let server = client.lookup_server("pfsense-02").await?;
//! let fip = client.lookup_floating_ip("pfsense").await?;
//! let action = client.assign_floating_ip(&fip, &server).await?;
//! ```

mod api;
pub mod client;
pub mod error;

pub use client::{HETZNER_API_BASE, HetznerClient, HetznerConfig};
pub use error::{HetznerError, Result};

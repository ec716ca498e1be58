//! # stratus-sdk
//!
//! Ready-made stacks built with `stratus-compose`, grouped into sample applications.
//!
//! Provides:
//! - [`network`]: Shared VPC, security group, and load balancer building blocks,
//!   plus a two-unit application sharing one VPC.
//! - [`ec2`]: Single instance, launch template, and auto scaling stacks.
//! - [`s3`]: Versioned storage bucket and static website stacks.
//! - [`lambda`]: Function, layer, alias, and REST API stacks.
//! - [`ecs`]: A load-balanced Fargate service.
//! - [`apps`]: The catalog of sample applications the CLI can synthesize.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratus_sdk::apps::SampleApp;
//!
//! let app = SampleApp::Serverless.build()?;
//! for document in app.synth()? {
//!     println!("{}", document.to_json()?);
//! }
//! # Ok::<(), stratus_common::error::StratusError>(())
//! ```

pub mod apps;
pub mod ec2;
pub mod ecs;
pub mod lambda;
pub mod network;
pub mod s3;

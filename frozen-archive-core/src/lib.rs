#![doc = "frozen-archive-core: core logic library for frozen-archive."]

//! This crate holds everything needed to ship one frozen index bucket to cold
//! storage: configuration, bucket validation and pruning, index-name derivation,
//! destination initialization and the transfer tool seam.
//!
//! # Usage
//! Call [`archive::archive_bucket`] with a validated [`config::ArchiveConfig`] and
//! any [`contract::Transferer`] (the `gsutil` one lives in [`transfer`]).

pub mod archive;
pub mod bucket;
pub mod config;
pub mod contract;
pub mod destination;
pub mod index;
pub mod transfer;

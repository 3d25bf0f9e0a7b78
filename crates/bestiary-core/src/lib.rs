//! # bestiary-core
//!
//! Core types, validation, and error types for the Bestiary registry.
//!
//! This crate provides the foundational types shared across all Bestiary crates:
//! - Entity structs for ecosystems, projects, transactions, and operations
//! - Operation and entity type enums
//! - Caller identity carried into every audited mutation
//! - The domain error taxonomy (`InvalidValue`, `AlreadyExists`, `NotFound`)
//! - Field validation for names, titles, and descriptions
//! - Page math for paginated listings
//! - Time-ordered token generation for transactions and operations

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod pagination;
pub mod validation;

//! Core business logic for Tradelog.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `streak` - Longest consecutive-day run calculation
//! - `gamification` - XP, level, tier, and badge aggregation
//! - `trophy` - Trophy rule normalization and matching
//! - `alerts` - Alert event state machine and delivery queue
//! - `plan` - Subscription plan entitlements
//! - `flow` - Options-flow parsing, features, and heuristic forecast
//! - `auth` - Password hashing
//! - `storage` - Object storage for flow uploads

pub mod alerts;
pub mod auth;
pub mod flow;
pub mod gamification;
pub mod plan;
pub mod storage;
pub mod streak;
pub mod trophy;

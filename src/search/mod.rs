//! Search module - federated keyword search over course content / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Providers only find rows; they never decide who may see them
//! - The engine owns fan-out, timeouts, degradation and ordering
//! - Policy is a pure function applied to every hit after collection
//!
//! Call direction: API → Engine → Registry → Provider → Store (unidirectional) / 调用方向

pub mod engine;
pub mod error;
pub mod policy;
pub mod schema;
pub mod tokenizer;

pub use engine::SearchEngine;
pub use error::SearchError;
pub use schema::{
    Permission, PolicyDecision, ProviderDescriptor, RawHit, RenderStyle, ResultGroup, ResultHit, Scope,
    SearchReport, SearchTerm, Visibility,
};

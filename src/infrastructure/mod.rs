//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod engine;
pub mod http;

pub use engine::{build_performer, build_synthesizer, synthesis_limits};

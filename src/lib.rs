//! Vocalis - 基于 ONNX Runtime 的文本转语音服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Speech Context: 文本、音色引用、语速的校验规则
//! - 文本分割器
//!
//! 应用层 (application/):
//! - Ports: SpeechSynthesizer, Phonemizer
//! - Commands / Queries: 合成命令、音色查询
//! - SpeechPerformer: 对外的合成门面
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: ONNX / Remote / Fake 合成引擎、音色仓库、音素化、WAV 编码
//! - HTTP: RESTful API

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::SpeechPerformer;
pub use config::{load_config, AppConfig};

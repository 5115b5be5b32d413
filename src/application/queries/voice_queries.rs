//! Voice Queries

/// 列出所有可用音色查询
#[derive(Debug, Clone)]
pub struct ListVoices;

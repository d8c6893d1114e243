use thiserror::Error;

/// 构建阶段的错误。两者都不可恢复：出错后调用方应丢弃当前的构建器。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate State: Name '{name}' already used in graph '{graph}'.")]
    DuplicateName { name: String, graph: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

//! 统一错误类型定义.
//!
//! 储备库检测到的越界使用是致命的码流损坏信号: 位级位置一旦丢失无法
//! 就地修复, 调用方应中止当前解码会话而不是重试.

use thiserror::Error;

/// 比特储备库统一错误类型
#[derive(Debug, Error)]
pub enum ReservoirError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 上溢: 写入将越过读游标, 覆盖未读数据
    #[error("储备库上溢: 需要 {0} 位, 仅剩 {1} 位空闲")]
    Overflow(u64, u64),

    /// 下溢: 读取或回退越过有效数据边界
    #[error("储备库下溢: 请求 {0} 位, 仅有 {1} 位可用")]
    Underflow(u64, u64),
}

/// 比特储备库统一 Result 类型
pub type ReservoirResult<T> = Result<T, ReservoirError>;

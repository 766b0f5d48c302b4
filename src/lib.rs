//! # bitres
//!
//! MP3 Layer III 比特储备库 (Bit Reservoir), 纯 Rust 实现.
//!
//! Layer III 允许一帧借用之前帧未用完的位容量 (main_data_begin 机制),
//! 解码器因此需要一个跨帧存活的位级环形缓冲区: 解复用器按帧写入字节,
//! Huffman 与比例因子解码阶段按位读取, 预读后可以回退重读.
//!
//! 本 crate 只提供这个缓冲区本身; 帧头解析、Huffman 解码与解复用属于
//! 上层解码管线.
//!
//! # 快速开始
//!
//! ```rust
//! use bitres::BitReservoir;
//!
//! let mut rsv = BitReservoir::new();
//! rsv.put_bytes(&[0xB4, 0x2F]).unwrap();
//!
//! assert_eq!(rsv.read_bits(4).unwrap(), 0b1011);
//! rsv.rewind_bits(4).unwrap();
//! assert_eq!(rsv.read_bits(4).unwrap(), 0b1011);
//! assert_eq!(rsv.position(), 4);
//! ```

pub mod error;
pub mod reservoir;

// 重导出常用类型
pub use error::{ReservoirError, ReservoirResult};
pub use reservoir::{BitReservoir, DEFAULT_CAPACITY_BITS};

//! Layer III 比特储备库 (Bit Reservoir).
//!
//! Layer III 的一帧编码数据可以早于本帧首字节开始 (借用之前帧累积的
//! 空闲位容量), 也可以越过本帧配额读入后续帧写入的数据. 本模块把解复用
//! 器送来的字节逐位展开存入环形缓冲区, 供之后运行的 Huffman 与比例因子
//! 解码阶段做连续多位读取和单位读取.
//!
//! 每个存储单元保存一个位. 这看似浪费内存, 但省去了每次访问的移位与
//! 掩码运算, 按位抽取明显快于按字节打包存储.
//!
//! 按大端位序存取 (MSB first), 与帧内位流一致.

use crate::{ReservoirError, ReservoirResult};

/// 默认环形缓冲区容量 (单位: 位).
///
/// 4096 字节 x 8, 每个位占一个存储单元. 必须为 2 的幂,
/// 以便用按位与代替取模运算.
pub const DEFAULT_CAPACITY_BITS: usize = 4096 * 8;

/// 比特储备库
///
/// 固定容量的位级环形缓冲区. 写游标按整字节 (8 位) 推进, 读游标按位
/// 推进, 两者相互独立, 不会自动对齐; 读写顺序由解码器负责安排 (一帧
/// 到达时写入一批字节, 之后的解码阶段从累积的储备中按位读取).
///
/// 所有越界使用 (读取未写入的位、覆盖未读取的位、回退越过最老的保留
/// 位) 都会被计数器检测到并返回错误, 而不是静默环绕产生垃圾数据.
///
/// # 示例
/// ```
/// use bitres::BitReservoir;
///
/// let mut rsv = BitReservoir::new();
/// rsv.put_byte(0xB4).unwrap();
/// assert_eq!(rsv.read_bits(4).unwrap(), 0b1011);
/// assert_eq!(rsv.read_bits(4).unwrap(), 0b0100);
/// assert_eq!(rsv.position(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct BitReservoir {
    /// 环形存储, 每单元一个位 (0 或 1)
    cells: Vec<u8>,
    /// 容量掩码 (capacity - 1), 用于环绕寻址
    mask: usize,
    /// 写游标: 下一个写入单元的索引
    write_pos: usize,
    /// 读游标: 下一个读取单元的索引
    read_pos: usize,
    /// 累计净消费位数 (读取增加, 回退减少), 即逻辑流位置
    consumed_bits: u64,
    /// 累计写入位数 (单调递增), 仅用于越界检测, 不参与寻址
    written_bits: u64,
}

impl BitReservoir {
    /// 以默认容量创建比特储备库, 存储清零, 游标归零
    pub fn new() -> Self {
        Self {
            cells: vec![0u8; DEFAULT_CAPACITY_BITS],
            mask: DEFAULT_CAPACITY_BITS - 1,
            write_pos: 0,
            read_pos: 0,
            consumed_bits: 0,
            written_bits: 0,
        }
    }

    /// 以指定容量 (位) 创建比特储备库.
    ///
    /// 容量必须为 2 的幂且不小于 8 (写游标按整字节推进).
    pub fn with_capacity(capacity_bits: usize) -> ReservoirResult<Self> {
        if capacity_bits < 8 || !capacity_bits.is_power_of_two() {
            return Err(ReservoirError::InvalidArgument(format!(
                "容量必须为不小于 8 的 2 的幂: {}",
                capacity_bits,
            )));
        }
        Ok(Self {
            cells: vec![0u8; capacity_bits],
            mask: capacity_bits - 1,
            write_pos: 0,
            read_pos: 0,
            consumed_bits: 0,
            written_bits: 0,
        })
    }

    /// 返回累计净消费位数 (逻辑流位置). 无副作用.
    ///
    /// 解码器用它在帧间记录/恢复逻辑位置, 以便检测并上报上游失步.
    pub fn position(&self) -> u64 {
        self.consumed_bits
    }

    /// 当前未读位数 (已写入且尚未消费)
    pub fn bits_available(&self) -> u64 {
        self.written_bits - self.consumed_bits
    }

    /// 环形缓冲区容量 (位)
    pub fn capacity_bits(&self) -> usize {
        self.cells.len()
    }

    /// 读取 n 位 (最多 32 位), 按大端位序打包为 u32.
    ///
    /// 存在两条结果完全一致的执行路径: 读取区间不跨越环尾时走免掩码的
    /// 快路径, 否则每步做环绕掩码. 区间恰好落在环尾边界时也走掩码路径
    /// (边界判定为严格小于).
    pub fn read_bits(&mut self, n: u32) -> ReservoirResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(ReservoirError::InvalidArgument(format!(
                "read_bits: n={} 超过 32 位",
                n,
            )));
        }
        let available = self.bits_available();
        if u64::from(n) > available {
            log::warn!("比特储备库下溢: 请求 {} 位, 仅有 {} 位可读", n, available);
            return Err(ReservoirError::Underflow(u64::from(n), available));
        }

        let mut val = 0u32;
        let mut pos = self.read_pos;
        if pos + (n as usize) < self.cells.len() {
            // 快路径: 不跨环尾, 免掩码
            for _ in 0..n {
                val = (val << 1) | u32::from(self.cells[pos]);
                pos += 1;
            }
        } else {
            // 慢路径: 每步环绕
            for _ in 0..n {
                val = (val << 1) | u32::from(self.cells[pos]);
                pos = (pos + 1) & self.mask;
            }
        }
        self.read_pos = pos;
        self.consumed_bits += u64::from(n);
        Ok(val)
    }

    /// 读取 1 位, 返回 0 或 1.
    ///
    /// `read_bits(1)` 的专用快速版本: 取出读游标处的单元, 游标掩码推进
    /// 一格, 位置计数加一.
    pub fn read_bit(&mut self) -> ReservoirResult<u32> {
        let available = self.bits_available();
        if available == 0 {
            log::warn!("比特储备库下溢: 请求 1 位, 储备为空");
            return Err(ReservoirError::Underflow(1, 0));
        }
        let bit = u32::from(self.cells[self.read_pos]);
        self.read_pos = (self.read_pos + 1) & self.mask;
        self.consumed_bits += 1;
        Ok(bit)
    }

    /// 写入 1 个字节, 按大端位序展开为 8 个连续单元.
    ///
    /// 写游标只按 8 的固定步长推进, 且容量为 8 的倍数, 因此到达容量时
    /// 用一次比较归零即可, 不需逐步掩码.
    pub fn put_byte(&mut self, byte: u8) -> ReservoirResult<()> {
        let free = self.cells.len() as u64 - self.bits_available();
        if free < 8 {
            log::warn!("比特储备库上溢: 写入 8 位, 仅剩 {} 位空闲", free);
            return Err(ReservoirError::Overflow(8, free));
        }

        let mut pos = self.write_pos;
        for shift in (0..8).rev() {
            self.cells[pos] = (byte >> shift) & 1;
            pos += 1;
        }
        self.write_pos = if pos == self.cells.len() { 0 } else { pos };
        self.written_bits += 8;
        Ok(())
    }

    /// 写入一段字节 (一帧 main_data 的写入突发).
    ///
    /// 整段放不下时在写入任何字节之前失败, 不产生部分写入.
    pub fn put_bytes(&mut self, data: &[u8]) -> ReservoirResult<()> {
        let free = self.cells.len() as u64 - self.bits_available();
        let need = data.len() as u64 * 8;
        if need > free {
            log::warn!("比特储备库上溢: 写入 {} 位, 仅剩 {} 位空闲", need, free);
            return Err(ReservoirError::Overflow(need, free));
        }
        for &byte in data {
            self.put_byte(byte)?;
        }
        Ok(())
    }

    /// 回退 n 位, 读游标与位置计数一并后退; 游标变负时加一次容量环绕.
    ///
    /// 用于"退回"已读位: 解码阶段预读后恢复位置, 或重新同步到储备库内
    /// 已知的位偏移.
    pub fn rewind_bits(&mut self, n: u32) -> ReservoirResult<()> {
        let n64 = u64::from(n);
        if n64 > self.consumed_bits {
            log::warn!(
                "比特储备库下溢: 回退 {} 位越过位置零 (当前位置 {})",
                n,
                self.consumed_bits,
            );
            return Err(ReservoirError::Underflow(n64, self.consumed_bits));
        }
        // 回退目标处的数据必须仍保留在环中 (尚未被后续写入覆盖)
        let retained = self.cells.len() as u64 - self.bits_available();
        if n64 > retained {
            log::warn!(
                "比特储备库下溢: 回退 {} 位越过最老的保留位 (仅保留 {} 位)",
                n,
                retained,
            );
            return Err(ReservoirError::Underflow(n64, retained));
        }

        self.consumed_bits -= n64;
        let n_pos = n as usize;
        self.read_pos = if self.read_pos >= n_pos {
            self.read_pos - n_pos
        } else {
            self.read_pos + self.cells.len() - n_pos
        };
        Ok(())
    }

    /// 回退 n 字节, 等价于 `rewind_bits(8 * n)`
    pub fn rewind_bytes(&mut self, n: u32) -> ReservoirResult<()> {
        let bits = n.checked_mul(8).ok_or_else(|| {
            ReservoirError::InvalidArgument(format!("rewind_bytes: n={} 过大", n))
        })?;
        self.rewind_bits(bits)
    }

    /// 清空储备库, 游标与计数全部归零, 存储不重新分配.
    ///
    /// 用于流重新同步后丢弃残留数据.
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.write_pos = 0;
        self.read_pos = 0;
        self.consumed_bits = 0;
        self.written_bits = 0;
    }
}

impl Default for BitReservoir {
    fn default() -> Self {
        Self::new()
    }
}

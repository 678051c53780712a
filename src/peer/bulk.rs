//! Peer-Link bulk transfer (§4.6 "Peer-Link bulk transfer"): a large uncompressed ACL
//! or talkgroup-rules file is deflated, cut into fixed-size blocks, and sent as a
//! sequence of `PEER_LINK` frames. Grounded in spec.md §3's `BulkTransferAccumulator`
//! entity and §8 invariant 9 ("Peer-Link integrity"); the original `PeerNetwork.cpp`
//! was not retrieved with a bulk-transfer method (this crate's peer network
//! generalizes the opcode beyond what SysView itself sends), so the block layout
//! follows spec.md §6 byte-for-byte instead.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{CoreError, CoreResult};

/// Payload size of one Peer-Link block, per spec.md §4.6.
pub const BLOCK_SIZE: usize = 4096;

/// Header fields preceding a block's payload: `{uncompressed u32 be, compressed u32
/// be, blockIdx u8, blockCnt u8}`.
pub const BLOCK_HEADER_LEN: usize = 10;

/// Which lookup table a bulk transfer is populating.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TransferKind {
    TalkgroupRules,
    RadioIdAcl,
}

/// One Peer-Link block, parsed off the wire.
#[derive(Clone, Debug)]
pub struct Block {
    pub uncompressed_size: u32,
    pub compressed_size: u32,
    pub block_idx: u8,
    pub block_cnt: u8,
    pub payload: Vec<u8>,
}

impl Block {
    pub fn parse(buf: &[u8]) -> CoreResult<Block> {
        if buf.len() < BLOCK_HEADER_LEN {
            return Err(CoreError::MalformedRequest("Peer-Link block shorter than header".into()));
        }
        let uncompressed_size = u32::from_be_bytes(buf[0..4].try_into().unwrap());
        let compressed_size = u32::from_be_bytes(buf[4..8].try_into().unwrap());
        let block_idx = buf[8];
        let block_cnt = buf[9];
        let payload = buf[BLOCK_HEADER_LEN..].to_vec();

        Ok(Block { uncompressed_size, compressed_size, block_idx, block_cnt, payload })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BLOCK_HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.uncompressed_size.to_be_bytes());
        buf.extend_from_slice(&self.compressed_size.to_be_bytes());
        buf.push(self.block_idx);
        buf.push(self.block_cnt);
        buf.extend_from_slice(&self.payload);
        buf
    }
}

/// Deflate `data` and split it into `BLOCK_SIZE`-sized Peer-Link blocks, numbered
/// `1..=block_cnt` (`block_idx == block_cnt` marks the final block, matching spec.md's
/// "the final block (`block-index == block-count`)" wording).
pub fn split(kind_data: &[u8]) -> CoreResult<Vec<Block>> {
    let uncompressed_size = kind_data.len() as u32;

    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(kind_data).map_err(CoreError::Transport)?;
    let compressed = enc.finish().map_err(CoreError::Transport)?;
    let compressed_size = compressed.len() as u32;

    let block_cnt = compressed.chunks(BLOCK_SIZE).count().max(1) as u8;
    let blocks = compressed
        .chunks(BLOCK_SIZE)
        .enumerate()
        .map(|(i, chunk)| Block {
            uncompressed_size,
            compressed_size,
            block_idx: (i + 1) as u8,
            block_cnt,
            payload: chunk.to_vec(),
        })
        .collect();

    Ok(blocks)
}

/// Accumulates Peer-Link blocks for one transfer kind until the final block arrives,
/// then inflates and validates the result. One accumulator exists per `TransferKind`
/// on the receiving peer, per spec.md §3.
pub struct Accumulator {
    kind: TransferKind,
    uncompressed_size: u32,
    block_cnt: u8,
    blocks: Vec<Option<Vec<u8>>>,
}

impl Accumulator {
    pub fn new(kind: TransferKind) -> Accumulator {
        Accumulator { kind, uncompressed_size: 0, block_cnt: 0, blocks: Vec::new() }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// Feed in one block. Returns the inflated, length-verified payload once the
    /// final block (`block_idx == block_cnt`) has arrived and every preceding block
    /// has been collected; an inflate failure or a length mismatch discards the
    /// transfer entirely (the accumulator resets to empty) rather than leaving a
    /// partially-applied lookup, per invariant 9.
    pub fn feed(&mut self, block: Block) -> CoreResult<Option<Vec<u8>>> {
        if self.block_cnt == 0 || block.block_cnt != self.block_cnt {
            self.uncompressed_size = block.uncompressed_size;
            self.block_cnt = block.block_cnt;
            self.blocks = vec![None; block.block_cnt as usize];
        }

        if block.block_idx == 0 || block.block_idx > self.block_cnt {
            return Err(CoreError::MalformedRequest("Peer-Link block index out of range".into()));
        }

        self.blocks[(block.block_idx - 1) as usize] = Some(block.payload);

        if block.block_idx != self.block_cnt {
            return Ok(None);
        }

        let result = self.finish();
        self.reset();
        result
    }

    fn finish(&self) -> CoreResult<Option<Vec<u8>>> {
        let mut compressed = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            match block {
                Some(payload) => compressed.extend_from_slice(payload),
                None => {
                    return Err(CoreError::MalformedRequest(format!(
                        "Peer-Link transfer missing block {} of {}",
                        i + 1,
                        self.block_cnt
                    )))
                }
            }
        }

        let mut dec = ZlibDecoder::new(&compressed[..]);
        let mut inflated = Vec::new();
        dec.read_to_end(&mut inflated).map_err(CoreError::Transport)?;

        if inflated.len() as u32 != self.uncompressed_size {
            return Err(CoreError::BulkLengthMismatch {
                expected: self.uncompressed_size,
                got: inflated.len() as u32,
            });
        }

        Ok(Some(inflated))
    }

    fn reset(&mut self) {
        self.uncompressed_size = 0;
        self.block_cnt = 0;
        self.blocks.clear();
    }
}

// Tue Jan 13 2026 - Alex

use crate::analysis::{ConstantReference, InstructionInfo};
use crate::memory::{Address, ByteSource, MemoryError, MemoryRange, ViewKind};
use crate::pattern::{ByteToken, Pattern, PatternBuilder, PatternError};
use std::sync::Arc;
use thiserror::Error;

/// Bytes assumed for a pointer-class constant. 8-byte pointer operands are
/// only partially wildcarded.
pub const POINTER_OPERAND_SIZE: usize = 4;

/// Recoverable oddities met while encoding; encoding still succeeds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    #[error("constant {value} of instruction at {address} not found in its encoding")]
    UnlocalizableConstant { address: Address, value: i64 },
    #[error("invalid wildcard tail of {claimed} byte(s) for instruction at {address}, clamped to length {length}")]
    TailClamped { address: Address, claimed: usize, length: usize },
}

#[derive(Debug, Clone)]
pub struct EncodedSignature {
    pub pattern: Pattern,
    /// Built without instruction metadata, so nothing is wildcarded.
    pub raw: bool,
    /// The bytes actually covered; may extend past the requested end when the
    /// last instruction straddles it.
    pub range: MemoryRange,
    pub warnings: Vec<EncodeWarning>,
}

pub struct SignatureEncoder {
    source: Arc<dyn ByteSource>,
    instructions: Option<Arc<dyn InstructionInfo>>,
}

impl SignatureEncoder {
    pub fn new(source: Arc<dyn ByteSource>) -> Self {
        Self {
            source,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: Arc<dyn InstructionInfo>) -> Self {
        self.instructions = Some(instructions);
        self
    }

    pub fn encode(&self, start: Address, length: u64) -> Result<EncodedSignature, PatternError> {
        if length == 0 {
            return Err(PatternError::EmptyInput);
        }
        if self.source.view() == ViewKind::Raw {
            return Err(PatternError::UnsupportedContext(
                "cannot create signature from a raw view".to_string(),
            ));
        }
        let end = start.checked_add(length).ok_or(MemoryError::OutOfBounds {
            address: start,
            len: length as usize,
        })?;

        let info = match &self.instructions {
            Some(info) if info.instruction(start).is_some() => info,
            _ => {
                log::debug!("No instruction at {}, emitting raw bytes", start);
                let bytes = self.source.read_bytes(start, length as usize)?;
                return Ok(EncodedSignature {
                    pattern: Pattern::from_bytes(&bytes)?,
                    raw: true,
                    range: MemoryRange::new(start, end),
                    warnings: Vec::new(),
                });
            }
        };

        let mut builder = PatternBuilder::new();
        let mut warnings = Vec::new();
        let mut addr = start;

        while addr < end {
            let instruction = info
                .instruction(addr)
                .filter(|i| i.length > 0)
                .ok_or(PatternError::InvalidInstruction(addr))?;

            let (tokens, mut instruction_warnings) =
                instruction_to_tokens(self.source.as_ref(), addr, instruction.length, &instruction.constants)?;
            builder = builder.tokens(&tokens);
            warnings.append(&mut instruction_warnings);

            addr = addr
                .checked_add(instruction.length as u64)
                .ok_or(PatternError::InvalidInstruction(addr))?;
        }

        Ok(EncodedSignature {
            pattern: builder.build()?,
            raw: false,
            range: MemoryRange::new(start, addr),
            warnings,
        })
    }
}

/// Encodes one instruction, wildcarding the operand bytes that hold its
/// constant references. Operands are assumed to sit at the tail of the
/// encoding, last reference outermost.
pub fn instruction_to_tokens(
    source: &dyn ByteSource,
    addr: Address,
    length: usize,
    constants: &[ConstantReference],
) -> Result<(Vec<ByteToken>, Vec<EncodeWarning>), MemoryError> {
    let bytes = source.read_bytes(addr, length)?;
    let mut warnings = Vec::new();

    if constants.is_empty() {
        return Ok((bytes.into_iter().map(ByteToken::Exact).collect(), warnings));
    }

    let mut trailing = 0usize;
    for constant in constants {
        if constant.pointer {
            trailing += POINTER_OPERAND_SIZE;
            continue;
        }

        let unclaimed = length.saturating_sub(trailing);
        let dword = (unclaimed >= 4).then(|| {
            let b = &bytes[unclaimed - 4..unclaimed];
            i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64
        });
        let byte = (unclaimed >= 1).then(|| bytes[unclaimed - 1] as i8 as i64);

        if dword == Some(constant.value) {
            trailing += 4;
        } else if byte == Some(constant.value) {
            trailing += 1;
        } else {
            log::debug!("Constant {} not found in instruction @ {}", constant.value, addr);
            warnings.push(EncodeWarning::UnlocalizableConstant {
                address: addr,
                value: constant.value,
            });
        }
    }

    if trailing > length {
        let warning = EncodeWarning::TailClamped {
            address: addr,
            claimed: trailing,
            length,
        };
        log::warn!("{}", warning);
        warnings.push(warning);
        trailing = length;
    }

    let tokens = bytes[..length - trailing]
        .iter()
        .copied()
        .map(ByteToken::Exact)
        .chain(std::iter::repeat(ByteToken::Wildcard).take(trailing))
        .collect();

    Ok((tokens, warnings))
}

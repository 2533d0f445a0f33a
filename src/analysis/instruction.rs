// Tue Jan 13 2026 - Alex

use crate::memory::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// An operand value embedded in an instruction's encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantReference {
    pub value: i64,
    /// Pointer-sized operand, assumed to occupy 4 bytes.
    #[serde(default)]
    pub pointer: bool,
}

impl ConstantReference {
    pub fn value(value: i64) -> Self {
        Self { value, pointer: false }
    }

    pub fn pointer(value: i64) -> Self {
        Self { value, pointer: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub length: usize,
    #[serde(default)]
    pub constants: Vec<ConstantReference>,
}

impl Instruction {
    pub fn new(length: usize, constants: Vec<ConstantReference>) -> Self {
        Self { length, constants }
    }
}

/// Disassembly metadata supplied by the host analysis.
pub trait InstructionInfo: Send + Sync {
    /// The instruction starting at `addr`, or `None` when no analysed code
    /// covers that address.
    fn instruction(&self, addr: Address) -> Option<Instruction>;
}

#[derive(Error, Debug)]
pub enum InstructionMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate instruction at {0}")]
    Duplicate(Address),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InstructionEntry {
    address: Address,
    #[serde(flatten)]
    instruction: Instruction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct InstructionFile {
    instructions: Vec<InstructionEntry>,
}

/// Instruction metadata exported from a disassembler, keyed by address.
///
/// The JSON layout is
/// `{"instructions": [{"address": 4096, "length": 5, "constants": [{"value": 16, "pointer": false}]}]}`.
#[derive(Debug, Clone, Default)]
pub struct InstructionMap {
    instructions: BTreeMap<Address, Instruction>,
}

impl InstructionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, addr: Address, instruction: Instruction) -> Option<Instruction> {
        self.instructions.insert(addr, instruction)
    }

    pub fn with(mut self, addr: u64, length: usize, constants: Vec<ConstantReference>) -> Self {
        self.insert(Address::new(addr), Instruction::new(length, constants));
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn from_json(text: &str) -> Result<Self, InstructionMapError> {
        let file: InstructionFile = serde_json::from_str(text)?;
        let mut map = Self::new();
        for entry in file.instructions {
            if map.insert(entry.address, entry.instruction).is_some() {
                return Err(InstructionMapError::Duplicate(entry.address));
            }
        }
        Ok(map)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InstructionMapError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, InstructionMapError> {
        let file = InstructionFile {
            instructions: self
                .instructions
                .iter()
                .map(|(&address, instruction)| InstructionEntry {
                    address,
                    instruction: instruction.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

impl InstructionInfo for InstructionMap {
    fn instruction(&self, addr: Address) -> Option<Instruction> {
        self.instructions.get(&addr).cloned()
    }
}

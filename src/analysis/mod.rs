// Tue Jan 13 2026 - Alex

pub mod instruction;
pub mod signature;

pub use instruction::{ConstantReference, Instruction, InstructionInfo, InstructionMap, InstructionMapError};
pub use signature::{instruction_to_tokens, EncodeWarning, EncodedSignature, SignatureEncoder};

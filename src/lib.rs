//! Cycle-level simulator and assembler for the SAP-1 breadboard computer.

#![warn(missing_docs)]

pub mod asm;
pub mod bus;
pub mod ctrl;
pub mod dev;
pub mod isa;
pub mod parse;
pub mod sim;

//! # 6502 Instruction Implementations
//!
//! Instructions are organized by category. Each is a standalone function taking
//! the CPU and the already-resolved `OperandRef`, so no instruction body needs to
//! know which addressing mode produced its operand. `execute` maps a mnemonic to
//! its function.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT)
//! - **branches**: Conditional branch instructions (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS)
//! - **shifts**: Shift and rotate operations (ASL, LSR, ROL, ROR)
//! - **load_store**: Load and store instructions (LDA, LDX, LDY, STA, STX, STY)
//! - **inc_dec**: Increment and decrement operations (INC, DEC, INX, INY, DEX, DEY)
//! - **control**: Control flow instructions (JMP, JSR, RTS, RTI, BRK, NOP)
//! - **stack**: Stack operations (PHA, PHP, PLA, PLP)
//! - **flags**: Status flag manipulation (CLC, SEC, CLI, SEI, CLD, SED, CLV)
//! - **transfer**: Register transfer operations (TAX, TAY, TXA, TYA, TSX, TXS)

pub mod alu;
pub mod branches;
pub mod control;
pub mod flags;
pub mod inc_dec;
pub mod load_store;
pub mod shifts;
pub mod stack;
pub mod transfer;

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, Mnemonic, StepOutcome, CPU};

/// Executes one decoded instruction.
///
/// PC has already been advanced past the instruction and its base cycles added.
pub(crate) fn execute<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    match mnemonic {
        Mnemonic::Adc => alu::execute_adc(cpu, operand),
        Mnemonic::Sbc => alu::execute_sbc(cpu, operand),
        Mnemonic::And => alu::execute_and(cpu, operand),
        Mnemonic::Ora => alu::execute_ora(cpu, operand),
        Mnemonic::Eor => alu::execute_eor(cpu, operand),
        Mnemonic::Cmp => alu::execute_compare(cpu, OperandRef::Accumulator, operand),
        Mnemonic::Cpx => alu::execute_compare(cpu, OperandRef::IndexX, operand),
        Mnemonic::Cpy => alu::execute_compare(cpu, OperandRef::IndexY, operand),
        Mnemonic::Bit => alu::execute_bit(cpu, operand),

        Mnemonic::Bcc => branches::branch_if(cpu, operand, |cpu| !cpu.flag_c),
        Mnemonic::Bcs => branches::branch_if(cpu, operand, |cpu| cpu.flag_c),
        Mnemonic::Beq => branches::branch_if(cpu, operand, |cpu| cpu.flag_z),
        Mnemonic::Bne => branches::branch_if(cpu, operand, |cpu| !cpu.flag_z),
        Mnemonic::Bmi => branches::branch_if(cpu, operand, |cpu| cpu.flag_n),
        Mnemonic::Bpl => branches::branch_if(cpu, operand, |cpu| !cpu.flag_n),
        Mnemonic::Bvc => branches::branch_if(cpu, operand, |cpu| !cpu.flag_v),
        Mnemonic::Bvs => branches::branch_if(cpu, operand, |cpu| cpu.flag_v),

        Mnemonic::Asl => shifts::execute_asl(cpu, operand),
        Mnemonic::Lsr => shifts::execute_lsr(cpu, operand),
        Mnemonic::Rol => shifts::execute_rol(cpu, operand),
        Mnemonic::Ror => shifts::execute_ror(cpu, operand),

        Mnemonic::Lda => load_store::execute_load(cpu, OperandRef::Accumulator, operand),
        Mnemonic::Ldx => load_store::execute_load(cpu, OperandRef::IndexX, operand),
        Mnemonic::Ldy => load_store::execute_load(cpu, OperandRef::IndexY, operand),
        Mnemonic::Sta => load_store::execute_store(cpu, OperandRef::Accumulator, operand),
        Mnemonic::Stx => load_store::execute_store(cpu, OperandRef::IndexX, operand),
        Mnemonic::Sty => load_store::execute_store(cpu, OperandRef::IndexY, operand),

        Mnemonic::Inc => inc_dec::execute_step(cpu, operand, 1),
        Mnemonic::Inx => inc_dec::execute_step(cpu, OperandRef::IndexX, 1),
        Mnemonic::Iny => inc_dec::execute_step(cpu, OperandRef::IndexY, 1),
        Mnemonic::Dec => inc_dec::execute_step(cpu, operand, -1),
        Mnemonic::Dex => inc_dec::execute_step(cpu, OperandRef::IndexX, -1),
        Mnemonic::Dey => inc_dec::execute_step(cpu, OperandRef::IndexY, -1),

        Mnemonic::Jmp => control::execute_jmp(cpu, operand),
        Mnemonic::Jsr => control::execute_jsr(cpu, operand),
        Mnemonic::Rts => control::execute_rts(cpu),
        Mnemonic::Rti => control::execute_rti(cpu),
        Mnemonic::Brk => control::execute_brk(cpu),
        Mnemonic::Nop => Ok(StepOutcome::Continue),

        Mnemonic::Pha => stack::execute_pha(cpu),
        Mnemonic::Php => stack::execute_php(cpu),
        Mnemonic::Pla => stack::execute_pla(cpu),
        Mnemonic::Plp => stack::execute_plp(cpu),

        Mnemonic::Clc => flags::assign(cpu, |cpu| cpu.flag_c = false),
        Mnemonic::Sec => flags::assign(cpu, |cpu| cpu.flag_c = true),
        Mnemonic::Cli => flags::assign(cpu, |cpu| cpu.flag_i = false),
        Mnemonic::Sei => flags::assign(cpu, |cpu| cpu.flag_i = true),
        Mnemonic::Cld => flags::assign(cpu, |cpu| cpu.flag_d = false),
        Mnemonic::Sed => flags::assign(cpu, |cpu| cpu.flag_d = true),
        Mnemonic::Clv => flags::assign(cpu, |cpu| cpu.flag_v = false),

        Mnemonic::Tax => {
            transfer::execute_transfer(cpu, OperandRef::Accumulator, OperandRef::IndexX)
        }
        Mnemonic::Tay => {
            transfer::execute_transfer(cpu, OperandRef::Accumulator, OperandRef::IndexY)
        }
        Mnemonic::Txa => {
            transfer::execute_transfer(cpu, OperandRef::IndexX, OperandRef::Accumulator)
        }
        Mnemonic::Tya => {
            transfer::execute_transfer(cpu, OperandRef::IndexY, OperandRef::Accumulator)
        }
        Mnemonic::Tsx => {
            transfer::execute_transfer(cpu, OperandRef::StackPointer, OperandRef::IndexX)
        }
        Mnemonic::Txs => transfer::execute_txs(cpu),

        Mnemonic::Jam | Mnemonic::Illegal => Err(ExecutionError::UnimplementedOpcode {
            opcode: cpu.memory.peek(cpu.instruction_address),
            address: cpu.instruction_address,
        }),
    }
}

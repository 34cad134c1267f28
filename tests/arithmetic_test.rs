//! Tests for ADC and SBC in binary and decimal mode.
//!
//! Decimal mode follows the NMOS 6502: N and V come from the intermediate
//! result, Z from the binary sum, and SBC sets every flag from the binary
//! difference.

use lib6510::{FlatMemory, MemoryBus, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

fn adc_immediate(a: u8, operand: u8, carry: bool, decimal: bool) -> CPU<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0x69);
    cpu.memory_mut().write(0x8001, operand);
    cpu.set_a(a);
    cpu.set_flag_c(carry);
    cpu.set_flag_d(decimal);
    cpu.step().unwrap();
    cpu
}

fn sbc_immediate(a: u8, operand: u8, carry: bool, decimal: bool) -> CPU<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0xE9);
    cpu.memory_mut().write(0x8001, operand);
    cpu.set_a(a);
    cpu.set_flag_c(carry);
    cpu.set_flag_d(decimal);
    cpu.step().unwrap();
    cpu
}

// ========== Binary ADC ==========

#[test]
fn test_adc_signed_overflow() {
    let cpu = adc_immediate(0x50, 0x50, false, false);

    assert_eq!(cpu.a(), 0xA0);
    assert!(cpu.flag_n());
    assert!(cpu.flag_v());
    assert!(!cpu.flag_c());
    assert!(!cpu.flag_z());
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn test_adc_carry_out_to_zero() {
    let cpu = adc_immediate(0xFF, 0x00, true, false);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_v());
}

#[test]
fn test_adc_negative_overflow() {
    // -128 + -1 = +127 with overflow
    let cpu = adc_immediate(0x80, 0xFF, false, false);

    assert_eq!(cpu.a(), 0x7F);
    assert!(cpu.flag_c());
    assert!(cpu.flag_v());
    assert!(!cpu.flag_n());
}

#[test]
fn test_adc_absolute_x_page_cross_penalty() {
    let mut cpu = setup_cpu();

    // ADC $12FF,X with X=1 reads $1300
    cpu.memory_mut().write(0x8000, 0x7D);
    cpu.memory_mut().write(0x8001, 0xFF);
    cpu.memory_mut().write(0x8002, 0x12);
    cpu.memory_mut().write(0x1300, 0x05);
    cpu.set_x(0x01);
    cpu.set_a(0x01);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x06);
    assert_eq!(cpu.cycles(), 5);
}

// ========== Decimal ADC ==========

#[test]
fn test_adc_decimal_simple() {
    let cpu = adc_immediate(0x12, 0x34, false, true);
    assert_eq!(cpu.a(), 0x46);
    assert!(!cpu.flag_c());
}

#[test]
fn test_adc_decimal_low_nibble_carry() {
    let cpu = adc_immediate(0x79, 0x00, true, true);

    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag_n());
    assert!(cpu.flag_v());
    // 79 + 00 + 1 = 80 fits in two BCD digits
    assert!(!cpu.flag_c());
}

#[test]
fn test_adc_decimal_wraps_past_99() {
    let cpu = adc_immediate(0x99, 0x01, false, true);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    // Z comes from the binary sum 0x9A
    assert!(!cpu.flag_z());
}

#[test]
fn test_adc_decimal_58_plus_46() {
    let cpu = adc_immediate(0x58, 0x46, true, true);
    assert_eq!(cpu.a(), 0x05);
    assert!(cpu.flag_c());
}

// ========== Binary SBC ==========

#[test]
fn test_sbc_binary_borrow() {
    let cpu = sbc_immediate(0x00, 0x01, true, false);

    assert_eq!(cpu.a(), 0xFF);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
    assert!(!cpu.flag_v());
}

#[test]
fn test_sbc_binary_overflow() {
    // +127 - -1 overflows
    let cpu = sbc_immediate(0x7F, 0xFF, true, false);

    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag_v());
    assert!(!cpu.flag_c());
}

// ========== Decimal SBC ==========

#[test]
fn test_sbc_decimal_simple() {
    let cpu = sbc_immediate(0x46, 0x12, true, true);
    assert_eq!(cpu.a(), 0x34);
    assert!(cpu.flag_c());
}

#[test]
fn test_sbc_decimal_borrow_wraps_to_99() {
    let cpu = sbc_immediate(0x00, 0x01, true, true);

    assert_eq!(cpu.a(), 0x99);
    assert!(!cpu.flag_c());
    // Flags follow the binary difference 0xFF
    assert!(cpu.flag_n());
    assert!(!cpu.flag_z());
}

#[test]
fn test_sbc_decimal_with_borrow_in() {
    let cpu = sbc_immediate(0x21, 0x09, false, true);
    assert_eq!(cpu.a(), 0x11);
    assert!(cpu.flag_c());
}

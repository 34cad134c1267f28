//! Emulation driver: runs a tune's init routine once and its play routine
//! once per tick on a `CPU<C64Memory>`.
//!
//! Each routine is entered with an empty stack and the CPU's exit policy
//! enabled, so its final RTS/RTI ends the call. Interrupt handlers that chain
//! to the KERNAL instead (`JMP $EA31`) end when PC reaches the KERNAL's IRQ
//! return path.

use std::ops::RangeInclusive;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::devices::cia::{CIA1_TIMER_A_HI, CIA1_TIMER_A_LO};
use crate::devices::sid::{SID_BASE, SID_BLOCK_SIZE, SID_MIRROR_END};
use crate::error::{Result, Routine, SidError};
use crate::header::{SidFile, SidMagic};
use crate::system::{C64Memory, ObservedWrite, Region};
use lib6510::{ExitPolicy, StepOutcome, CPU};

/// KERNAL interrupt return path; an IRQ handler jumping here is done.
pub const KERNAL_IRQ_RETURN: RangeInclusive<u16> = 0xEA31..=0xEA81;

/// Software IRQ vector the KERNAL jumps through.
pub const IRQ_VECTOR: u16 = 0x0314;

/// Hardware IRQ vector.
pub const HARDWARE_IRQ_VECTOR: u16 = 0xFFFE;

/// Tunable limits of the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Instructions a single init or play call may execute.
    pub instruction_limit: u64,
    /// Low-stack zone in which RTS/RTI end a call.
    pub stack_wrap_zone: u8,
    /// Minimum speed-up over the default CIA rate treated as multispeed.
    pub multispeed_threshold: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            instruction_limit: 1_000_000,
            stack_wrap_zone: ExitPolicy::DEFAULT_WRAP_ZONE,
            multispeed_threshold: 1.3,
        }
    }
}

/// Control byte for a PSID call, chosen so the entry address is RAM.
pub fn bank_for_address(address: u16) -> u8 {
    match address {
        0x0000..=0x9FFF => 0x37,
        0xA000..=0xCFFF => 0x36,
        0xD000..=0xDFFF => 0x34,
        0xE000..=0xFFFF => 0x35,
    }
}

/// Runs one SID file's routines.
pub struct SidDriver {
    cpu: CPU<C64Memory>,
    file: SidFile,
    region: Region,
    config: DriverConfig,
    play_address: Option<u16>,
    multispeed: f64,
    cia_latch: Option<u16>,
}

impl SidDriver {
    /// Places the payload in RAM and configures the chips.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` when the payload would run past $FFFF.
    pub fn new(file: SidFile, region: Region, config: DriverConfig) -> Result<Self> {
        let load_address = file.load_address;
        let len = file.payload.len();
        if load_address as usize + len > 0x10000 {
            return Err(SidError::PayloadTooLarge { load_address, len });
        }

        let mut memory = C64Memory::new();
        memory.ram_mut().load(load_address, &file.payload);

        let bases = file.header.chip_bases.clone();
        memory.set_sid_bases(&bases);
        let mut first = bases.iter().copied().min().unwrap_or(SID_BASE);
        let mut last = bases.iter().copied().max().unwrap_or(SID_BASE) + (SID_BLOCK_SIZE - 1);
        if memory.sid_mirroring() {
            // Stores through mirrors reach the first chip
            first = first.min(SID_BASE);
            last = last.max(SID_MIRROR_END);
        }
        memory.observe_writes(first..=last);

        let mut cpu = CPU::new(memory);
        cpu.set_exit_policy(ExitPolicy::when_stack_empty(config.stack_wrap_zone));

        debug!(
            "loaded {} bytes at ${:04X}, chips at {:04X?}, {:?} timing",
            len, load_address, bases, region
        );

        Ok(Self {
            cpu,
            file,
            region,
            config,
            play_address: None,
            multispeed: 1.0,
            cia_latch: None,
        })
    }

    /// Runs the init routine for a 1-based subtune.
    ///
    /// Afterwards the multispeed factor and play address are known.
    ///
    /// # Errors
    ///
    /// `InvalidSubtune`, CPU faults, `Runaway` when init does not finish, and
    /// `NoPlayAddress` when neither the header nor init provide a play routine.
    pub fn run_init(&mut self, subtune: u16) -> Result<()> {
        self.file.validate_subtune(subtune)?;

        let init = self.file.init_address();
        let control = match self.file.header.magic {
            SidMagic::Psid => bank_for_address(init),
            SidMagic::Rsid => 0x37,
        };
        debug!("init ${:04X} for subtune {} with bank ${:02X}", init, subtune, control);

        let memory = self.cpu.memory_mut();
        memory.set_control(control);
        memory.clear_access_log();

        self.cpu.reset(init, (subtune - 1) as u8, 0, 0, 0);
        self.run_routine(Routine::Init)?;

        self.detect_multispeed();
        self.play_address = Some(self.resolve_play_address(init)?);
        // Writes made by init are not part of the first play call
        self.cpu.memory_mut().take_observed_writes();
        Ok(())
    }

    /// Runs one play call and returns the instructions executed.
    ///
    /// # Errors
    ///
    /// `NoPlayAddress` before a successful `run_init`, CPU faults, and
    /// `Runaway` when play does not finish.
    pub fn run_play(&mut self) -> Result<u64> {
        let play = self.play_address.ok_or(SidError::NoPlayAddress {
            init: self.file.init_address(),
        })?;

        if self.file.header.magic == SidMagic::Psid {
            self.cpu.memory_mut().set_control(bank_for_address(play));
        }
        self.cpu.prepare_call(play);

        let instructions = self.run_routine(Routine::Play)?;
        trace!("play ${:04X}: {} instructions, {} cycles", play, instructions, self.cpu.cycles());

        self.cpu.memory_mut().force_io_visible();
        Ok(instructions)
    }

    fn run_routine(&mut self, routine: Routine) -> Result<u64> {
        let mut executed = 0u64;
        loop {
            if executed >= self.config.instruction_limit {
                return Err(SidError::Runaway {
                    routine,
                    address: self.cpu.pc(),
                    instructions: executed,
                });
            }

            let before = self.cpu.pc();
            let outcome = self.cpu.step()?;
            executed += 1;

            if outcome == StepOutcome::Finished {
                break;
            }
            let pc = self.cpu.pc();
            if KERNAL_IRQ_RETURN.contains(&pc) {
                break;
            }
            // RSID inits often end in `JMP *` waiting for interrupts
            if routine == Routine::Init && pc == before {
                debug!("init idles at ${:04X}", pc);
                break;
            }
        }
        Ok(executed)
    }

    fn detect_multispeed(&mut self) {
        let memory = self.cpu.memory();
        if !memory.was_written(CIA1_TIMER_A_LO) && !memory.was_written(CIA1_TIMER_A_HI) {
            return;
        }

        let latch = u16::from_le_bytes([
            memory.io_register(CIA1_TIMER_A_LO),
            memory.io_register(CIA1_TIMER_A_HI),
        ]);
        self.cia_latch = Some(latch);
        if latch == 0 {
            return;
        }

        let factor = self.region.cia_default_latch() as f64 / latch as f64;
        if factor > self.config.multispeed_threshold {
            debug!("CIA latch ${:04X}: multispeed x{:.2}", latch, factor);
            self.multispeed = factor;
        } else {
            debug!("CIA latch ${:04X}: factor {:.2} treated as single speed", latch, factor);
        }
    }

    fn resolve_play_address(&self, init: u16) -> Result<u16> {
        if let Some(play) = self.file.play_address() {
            return Ok(play);
        }

        let memory = self.cpu.memory();
        let touched = |vector: u16| memory.was_written(vector) || memory.was_written(vector + 1);

        let play = if touched(IRQ_VECTOR) {
            memory.ram_word(IRQ_VECTOR)
        } else if touched(HARDWARE_IRQ_VECTOR) {
            memory.ram_word(HARDWARE_IRQ_VECTOR)
        } else {
            return Err(SidError::NoPlayAddress { init });
        };
        debug!("play address ${:04X} installed by init", play);
        Ok(play)
    }

    /// Play routine address, once init has run.
    pub fn play_address(&self) -> Option<u16> {
        self.play_address
    }

    /// Play calls per frame; 1.0 unless init sped up the CIA timer.
    pub fn multispeed(&self) -> f64 {
        self.multispeed
    }

    /// CIA 1 timer A latch written by init, if any.
    pub fn cia_latch(&self) -> Option<u16> {
        self.cia_latch
    }

    /// Timing the tune runs at.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The parsed file being played.
    pub fn file(&self) -> &SidFile {
        &self.file
    }

    /// The CPU, for inspecting registers after a call.
    pub fn cpu(&self) -> &CPU<C64Memory> {
        &self.cpu
    }

    /// Memory as left by the last call.
    pub fn memory(&self) -> &C64Memory {
        self.cpu.memory()
    }

    /// Drains the chip register writes observed since the last call.
    pub fn take_observed_writes(&mut self) -> Vec<ObservedWrite> {
        self.cpu.memory_mut().take_observed_writes()
    }
}

//! `Si5351A` Clock Synthesizer Driver
//!
//! Carrier generation for the beacon. Each clock output is programmed from a
//! [`PlannedFrequency`]; register values come straight from its PLL and
//! multisynth parameters.
//!
//! CLK0 runs from PLLA, CLK1 and CLK2 from PLLB, so the transmit and park
//! clocks get independent VCOs. A PLL is only reset when the multisynth
//! divider of a clock changes: FSK shifts of a few Hz move the PLL fraction
//! alone and stay phase-continuous.

use crate::beacon::SynthesizerPort;
use crate::hal::i2c::{I2cAddress, I2cBus};
use crate::synth::{MsParams, PllParams, PlannedFrequency};
use crate::types::{ClockOutput, CrystalLoad, DriveStrength};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

/// `Si5351A` register addresses
mod reg {
    pub const DEVICE_STATUS: u8 = 0;
    pub const OUTPUT_ENABLE: u8 = 3;
    pub const CLK0_CONTROL: u8 = 16;
    pub const CLK1_CONTROL: u8 = 17;
    pub const CLK2_CONTROL: u8 = 18;
    pub const PLLA_PARAMS: u8 = 26;
    pub const PLLB_PARAMS: u8 = 34;
    pub const MS0_PARAMS: u8 = 42;
    pub const MS1_PARAMS: u8 = 50;
    pub const MS2_PARAMS: u8 = 58;
    pub const PLL_RESET: u8 = 177;
    pub const CRYSTAL_LOAD: u8 = 183;
}

/// Clock control register bits
mod ctrl {
    pub const POWER_DOWN: u8 = 0x80;
    pub const MS_INTEGER: u8 = 0x40;
    pub const SRC_PLLB: u8 = 0x20;
    /// Output driven by its own multisynth
    pub const SRC_MULTISYNTH: u8 = 0x0C;
}

const SYS_INIT: u8 = 0x80;

/// PLL source selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PllSource {
    /// Use PLL A
    PllA,
    /// Use PLL B
    PllB,
}

impl PllSource {
    /// PLL feeding a clock output
    #[must_use]
    pub const fn for_output(output: ClockOutput) -> Self {
        match output {
            ClockOutput::Clk0 => Self::PllA,
            ClockOutput::Clk1 | ClockOutput::Clk2 => Self::PllB,
        }
    }

    const fn params_reg(self) -> u8 {
        match self {
            Self::PllA => reg::PLLA_PARAMS,
            Self::PllB => reg::PLLB_PARAMS,
        }
    }

    const fn reset_bit(self) -> u8 {
        match self {
            Self::PllA => 0x20,
            Self::PllB => 0x80,
        }
    }
}

const fn control_reg(output: ClockOutput) -> u8 {
    match output {
        ClockOutput::Clk0 => reg::CLK0_CONTROL,
        ClockOutput::Clk1 => reg::CLK1_CONTROL,
        ClockOutput::Clk2 => reg::CLK2_CONTROL,
    }
}

const fn ms_reg(output: ClockOutput) -> u8 {
    match output {
        ClockOutput::Clk0 => reg::MS0_PARAMS,
        ClockOutput::Clk1 => reg::MS1_PARAMS,
        ClockOutput::Clk2 => reg::MS2_PARAMS,
    }
}

/// Pack P1/P2/P3 into the 8-byte register block shared by PLLs and multisynths
fn pack_params((p1, p2, p3): (u32, u32, u32)) -> [u8; 8] {
    [
        ((p3 >> 8) & 0xFF) as u8,
        (p3 & 0xFF) as u8,
        ((p1 >> 16) & 0x03) as u8,
        ((p1 >> 8) & 0xFF) as u8,
        (p1 & 0xFF) as u8,
        (((p3 >> 12) & 0xF0) | ((p2 >> 16) & 0x0F)) as u8,
        ((p2 >> 8) & 0xFF) as u8,
        (p2 & 0xFF) as u8,
    ]
}

/// `Si5351A` driver
pub struct Si5351<I> {
    bus: I2cBus<I>,
    address: I2cAddress,
    drive: DriveStrength,
    /// Shadow of register 3 (bit set = output disabled)
    output_enable: u8,
    /// Last multisynth divider programmed per output
    dividers: [Option<u32>; 3],
}

impl<I: I2c> Si5351<I> {
    /// Create a new `Si5351A` driver
    #[must_use]
    pub const fn new(i2c: I, address: I2cAddress, drive: DriveStrength) -> Self {
        Self {
            bus: I2cBus::new(i2c),
            address,
            drive,
            output_enable: 0xFF,
            dividers: [None; 3],
        }
    }

    /// Device address
    #[must_use]
    pub const fn address(&self) -> I2cAddress {
        self.address
    }

    /// Current output enable register value
    #[must_use]
    pub const fn output_enable(&self) -> u8 {
        self.output_enable
    }

    /// Give back the I2C bus
    pub fn release(self) -> I {
        self.bus.release()
    }

    /// Initialize the `Si5351A`
    ///
    /// Leaves every output disabled and powered down.
    pub async fn init(&mut self, load: CrystalLoad, delay: &mut impl DelayNs) -> Result<(), I::Error> {
        self.wait_ready(delay).await?;

        self.output_enable = 0xFF;
        self.bus
            .write_reg(self.address, reg::OUTPUT_ENABLE, self.output_enable)
            .await?;

        self.bus
            .write_reg(self.address, reg::CRYSTAL_LOAD, load.as_reg())
            .await?;

        for clk in [ClockOutput::Clk0, ClockOutput::Clk1, ClockOutput::Clk2] {
            self.bus
                .write_reg(self.address, control_reg(clk), ctrl::POWER_DOWN)
                .await?;
        }
        self.dividers = [None; 3];

        #[cfg(feature = "embedded")]
        defmt::debug!("Si5351 at {} initialized", self.address);

        Ok(())
    }

    /// Wait for device to be ready (`SYS_INIT` cleared)
    async fn wait_ready(&mut self, delay: &mut impl DelayNs) -> Result<(), I::Error> {
        for _ in 0..100 {
            let status = self.bus.read_reg(self.address, reg::DEVICE_STATUS).await?;
            if status & SYS_INIT == 0 {
                return Ok(());
            }
            delay.delay_ms(1).await;
        }
        // Timeout, but continue anyway
        #[cfg(feature = "embedded")]
        defmt::warn!("Si5351 SYS_INIT still set");
        Ok(())
    }

    /// Program a clock output from a frequency plan
    pub async fn set_frequency(
        &mut self,
        output: ClockOutput,
        plan: &PlannedFrequency,
    ) -> Result<(), I::Error> {
        let source = PllSource::for_output(output);
        let ms = plan.ms();

        self.program_pll(source, &plan.pll()).await?;
        self.program_multisynth(output, &ms).await?;

        let mut control = ctrl::SRC_MULTISYNTH | self.drive.as_reg();
        // Integer mode is only valid for even dividers
        if ms.is_integer() && ms.a % 2 == 0 {
            control |= ctrl::MS_INTEGER;
        }
        if source == PllSource::PllB {
            control |= ctrl::SRC_PLLB;
        }
        self.bus
            .write_reg(self.address, control_reg(output), control)
            .await?;

        let slot = &mut self.dividers[usize::from(output.index())];
        if *slot != Some(ms.a) {
            *slot = Some(ms.a);
            self.bus
                .write_reg(self.address, reg::PLL_RESET, source.reset_bit())
                .await?;
        }

        #[cfg(feature = "embedded")]
        defmt::trace!("{} -> {}", output, plan);

        Ok(())
    }

    /// Enable a clock output
    pub async fn enable(&mut self, output: ClockOutput) -> Result<(), I::Error> {
        self.output_enable &= !(1 << output.index());
        self.bus
            .write_reg(self.address, reg::OUTPUT_ENABLE, self.output_enable)
            .await
    }

    /// Disable a clock output
    pub async fn disable(&mut self, output: ClockOutput) -> Result<(), I::Error> {
        self.output_enable |= 1 << output.index();
        self.bus
            .write_reg(self.address, reg::OUTPUT_ENABLE, self.output_enable)
            .await
    }

    async fn program_pll(&mut self, source: PllSource, params: &PllParams) -> Result<(), I::Error> {
        let regs = pack_params(params.to_registers());
        self.bus
            .write_regs(self.address, source.params_reg(), &regs)
            .await
    }

    async fn program_multisynth(
        &mut self,
        output: ClockOutput,
        params: &MsParams,
    ) -> Result<(), I::Error> {
        // R divider 1: output range never needs it
        let regs = pack_params(params.to_registers());
        self.bus.write_regs(self.address, ms_reg(output), &regs).await
    }
}

impl<I: I2c> SynthesizerPort for Si5351<I> {
    type Error = I::Error;

    async fn set_clock_frequency(
        &mut self,
        clock: ClockOutput,
        plan: &PlannedFrequency,
    ) -> Result<(), Self::Error> {
        self.set_frequency(clock, plan).await
    }

    async fn enable_clock(&mut self, clock: ClockOutput) -> Result<(), Self::Error> {
        self.enable(clock).await
    }

    async fn disable_clock(&mut self, clock: ClockOutput) -> Result<(), Self::Error> {
        self.disable(clock).await
    }
}

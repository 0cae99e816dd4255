//! Si5351 Driver Tests
//!
//! Checks the register traffic of the driver and the I2C bus wrapper
//! against a recording fake bus.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test si5351_tests

use embassy_futures::block_on;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorType, I2c};

use qrss_beacon::beacon::SynthesizerPort;
use qrss_beacon::drivers::si5351::{PllSource, Si5351};
use qrss_beacon::hal::i2c::{I2cAddress, I2cBus};
use qrss_beacon::synth::{FrequencyPlanner, PlannedFrequency};
use qrss_beacon::types::{ClockOutput, CorrectionFactor, CrystalLoad, DriveStrength, Frequency};

// =============================================================================
// Fakes
// =============================================================================

struct FakeI2c {
    present: Vec<u8>,
    /// Status reads that still report `SYS_INIT`
    busy_reads: usize,
    reads: usize,
    writes: Vec<(u8, Vec<u8>)>,
}

impl FakeI2c {
    fn new() -> Self {
        Self {
            present: vec![0x60],
            busy_reads: 0,
            reads: 0,
            writes: Vec::new(),
        }
    }

    /// Writes that set register contents (register pointer writes dropped)
    fn register_writes(&self) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(_, data)| data.len() > 1)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        if !self.present.contains(&address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(data) => self.writes.push((address, data.to_vec())),
                Operation::Read(buf) => {
                    self.reads += 1;
                    let status = if self.busy_reads > 0 {
                        self.busy_reads -= 1;
                        0x80
                    } else {
                        0x00
                    };
                    buf.fill(status);
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeDelay {
    delays_ms: Vec<u32>,
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

fn si5351(i2c: FakeI2c) -> Si5351<FakeI2c> {
    Si5351::new(i2c, I2cAddress::SI5351, DriveStrength::Drive8mA)
}

fn plan(hz: u32) -> PlannedFrequency {
    FrequencyPlanner::new(CorrectionFactor::NONE)
        .plan(Frequency::from_hz(hz))
        .unwrap()
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_init_register_sequence() {
    let mut synth = si5351(FakeI2c::new());
    let mut delay = FakeDelay::default();
    block_on(synth.init(CrystalLoad::Load10pF, &mut delay)).unwrap();

    assert_eq!(synth.output_enable(), 0xFF);
    let i2c = synth.release();
    assert_eq!(
        i2c.register_writes(),
        vec![
            vec![3, 0xFF],
            vec![183, 0xD2],
            vec![16, 0x80],
            vec![17, 0x80],
            vec![18, 0x80],
        ]
    );
    assert_eq!(i2c.reads, 1);
    assert!(delay.delays_ms.is_empty());
}

#[test]
fn test_init_waits_for_sys_init() {
    let mut i2c = FakeI2c::new();
    i2c.busy_reads = 3;
    let mut synth = si5351(i2c);
    let mut delay = FakeDelay::default();
    block_on(synth.init(CrystalLoad::Load8pF, &mut delay)).unwrap();

    assert_eq!(delay.delays_ms, vec![1, 1, 1]);
    let i2c = synth.release();
    assert_eq!(i2c.reads, 4);
    assert!(i2c.register_writes().contains(&vec![183, 0x92]));
}

#[test]
fn test_init_gives_up_waiting() {
    let mut i2c = FakeI2c::new();
    i2c.busy_reads = usize::MAX;
    let mut synth = si5351(i2c);
    let mut delay = FakeDelay::default();
    block_on(synth.init(CrystalLoad::Load6pF, &mut delay)).unwrap();

    assert_eq!(delay.delays_ms.len(), 100);
    assert_eq!(synth.release().reads, 100);
}

#[test]
fn test_init_missing_device() {
    let mut i2c = FakeI2c::new();
    i2c.present.clear();
    let mut synth = si5351(i2c);
    let result = block_on(synth.init(CrystalLoad::Load10pF, &mut FakeDelay::default()));
    assert_eq!(
        result,
        Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
    );
}

// =============================================================================
// Frequency Programming
// =============================================================================

#[test]
fn test_set_frequency_clk0_integer() {
    let mut synth = si5351(FakeI2c::new());
    block_on(synth.set_frequency(ClockOutput::Clk0, &plan(10_000_000))).unwrap();

    // PLL 36 integer: P1 = 4096; MS 90 integer: P1 = 11008
    assert_eq!(
        synth.release().register_writes(),
        vec![
            vec![26, 0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00],
            vec![42, 0x00, 0x01, 0x00, 0x2B, 0x00, 0x00, 0x00, 0x00],
            vec![16, 0x4F],
            vec![177, 0x20],
        ]
    );
}

#[test]
fn test_set_frequency_clk1_uses_pllb() {
    let mut synth = si5351(FakeI2c::new());
    block_on(synth.set_frequency(ClockOutput::Clk1, &plan(108_000_000))).unwrap();

    let writes = synth.release().register_writes();
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[0][0], 34);
    assert_eq!(writes[1][0], 50);
    assert_eq!(writes[2], vec![17, 0x6F]);
    assert_eq!(writes[3], vec![177, 0x80]);
}

#[test]
fn test_set_frequency_odd_divider_not_integer_mode() {
    // 7 039 810 Hz uses divider 127
    let mut synth = si5351(FakeI2c::new());
    let planned = plan(7_039_810);
    assert_eq!(planned.ms().a, 127);
    block_on(synth.set_frequency(ClockOutput::Clk0, &planned)).unwrap();

    assert!(synth.release().register_writes().contains(&vec![16, 0x0F]));
}

#[test]
fn test_set_frequency_drive_strength() {
    let mut synth = Si5351::new(FakeI2c::new(), I2cAddress::SI5351, DriveStrength::Drive2mA);
    block_on(synth.set_frequency(ClockOutput::Clk0, &plan(10_000_000))).unwrap();

    assert!(synth.release().register_writes().contains(&vec![16, 0x4C]));
}

#[test]
fn test_fsk_shift_skips_pll_reset() {
    let mut synth = si5351(FakeI2c::new());
    block_on(synth.set_frequency(ClockOutput::Clk0, &plan(10_139_910))).unwrap();
    block_on(synth.set_frequency(ClockOutput::Clk0, &plan(10_139_914))).unwrap();

    let resets = synth
        .release()
        .register_writes()
        .iter()
        .filter(|w| w[0] == 177)
        .count();
    assert_eq!(resets, 1);
}

#[test]
fn test_divider_change_resets_pll() {
    let mut synth = si5351(FakeI2c::new());
    block_on(synth.set_frequency(ClockOutput::Clk0, &plan(14_063_000))).unwrap();
    block_on(synth.set_frequency(ClockOutput::Clk0, &plan(10_139_910))).unwrap();

    let resets = synth
        .release()
        .register_writes()
        .iter()
        .filter(|w| w[0] == 177)
        .count();
    assert_eq!(resets, 2);
}

#[test]
fn test_pll_for_output() {
    assert_eq!(PllSource::for_output(ClockOutput::Clk0), PllSource::PllA);
    assert_eq!(PllSource::for_output(ClockOutput::Clk1), PllSource::PllB);
    assert_eq!(PllSource::for_output(ClockOutput::Clk2), PllSource::PllB);
}

// =============================================================================
// Output Enable
// =============================================================================

#[test]
fn test_enable_disable_shadow() {
    let mut synth = si5351(FakeI2c::new());
    block_on(synth.enable(ClockOutput::Clk0)).unwrap();
    assert_eq!(synth.output_enable(), 0xFE);
    block_on(synth.enable(ClockOutput::Clk1)).unwrap();
    assert_eq!(synth.output_enable(), 0xFC);
    block_on(synth.disable(ClockOutput::Clk0)).unwrap();
    assert_eq!(synth.output_enable(), 0xFD);

    assert_eq!(
        synth.release().register_writes(),
        vec![vec![3, 0xFE], vec![3, 0xFC], vec![3, 0xFD]]
    );
}

#[test]
fn test_synthesizer_port_impl() {
    let mut synth = si5351(FakeI2c::new());
    block_on(async {
        synth
            .set_clock_frequency(ClockOutput::Clk2, &plan(14_063_000))
            .await?;
        synth.enable_clock(ClockOutput::Clk2).await?;
        synth.disable_clock(ClockOutput::Clk2).await
    })
    .unwrap();

    assert_eq!(synth.output_enable(), 0xFF);
    let writes = synth.release().register_writes();
    assert_eq!(writes[0][0], 34);
    assert_eq!(writes[1][0], 58);
    assert_eq!(writes[2][0], 18);
    assert_eq!(writes.last(), Some(&vec![3, 0xFF]));
}

// =============================================================================
// I2C Bus Wrapper
// =============================================================================

#[test]
fn test_bus_scan() {
    let mut i2c = FakeI2c::new();
    i2c.present = vec![0x60, 0x3C];
    let mut bus = I2cBus::new(i2c);
    let found = block_on(bus.scan());
    assert_eq!(found.as_slice(), &[I2cAddress::new(0x3C), I2cAddress::new(0x60)]);
}

#[test]
fn test_bus_read_reg() {
    let mut i2c = FakeI2c::new();
    i2c.busy_reads = 1;
    let mut bus = I2cBus::new(i2c);
    assert_eq!(block_on(bus.read_reg(I2cAddress::SI5351, 0)), Ok(0x80));
    assert_eq!(block_on(bus.read_reg(I2cAddress::SI5351, 0)), Ok(0x00));
}

#[test]
fn test_bus_write_regs_block() {
    let mut bus = I2cBus::new(FakeI2c::new());
    block_on(bus.write_regs(I2cAddress::SI5351, 26, &[1, 2, 3])).unwrap();
    assert_eq!(bus.release().writes, vec![(0x60, vec![26, 1, 2, 3])]);
}

#[test]
fn test_bus_write_regs_long_falls_back() {
    let mut bus = I2cBus::new(FakeI2c::new());
    let values = [0xAA; 20];
    block_on(bus.write_regs(I2cAddress::SI5351, 100, &values)).unwrap();

    let writes = bus.release().writes;
    assert_eq!(writes.len(), 20);
    assert_eq!(writes[0], (0x60, vec![100, 0xAA]));
    assert_eq!(writes[19], (0x60, vec![119, 0xAA]));
}

#[test]
fn test_address_masked_to_seven_bits() {
    assert_eq!(I2cAddress::new(0xE0).addr(), 0x60);
    assert_eq!(I2cAddress::SI5351.addr(), 0x60);
}

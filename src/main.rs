//! QRSS / CW Beacon Main Application
//!
//! Entry point for the STM32G474 beacon firmware.
//! Brings up the `Si5351A` and runs the beacon cycle forever.

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_stm32::i2c::I2c;
use embassy_stm32::time::Hertz;
use embassy_stm32::{bind_interrupts, peripherals};
use {defmt_rtt as _, panic_probe as _};

use qrss_beacon::drivers::si5351::Si5351;
use qrss_beacon::hal::i2c::{I2cAddress, I2cBus};
use qrss_beacon::prelude::*;

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    I2C1_EV => embassy_stm32::i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => embassy_stm32::i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

/// Beacon configuration for this image
static CONFIG: BeaconConfig = BeaconConfig::DEFAULT;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("QRSS Beacon Firmware v{} on {}", FIRMWARE_VERSION, BOARD_NAME);

    // Initialize STM32G474 peripherals with default clock configuration
    let p = embassy_stm32::init(embassy_stm32::Config::default());

    // I2C1 for Si5351A
    let i2c = I2c::new(
        p.I2C1,
        p.PB8, // SCL
        p.PB9, // SDA
        Irqs,
        p.DMA1_CH1,
        p.DMA1_CH2,
        Hertz(I2C_FREQUENCY_HZ),
        Default::default(),
    );

    info!(
        "I2C1 initialized at {} Hz (SCL {}, SDA {})",
        I2C_FREQUENCY_HZ,
        pins::I2C1_SCL,
        pins::I2C1_SDA
    );

    let mut bus = I2cBus::new(i2c);
    for device in bus.scan().await {
        info!("I2C device at {}", device);
    }

    let mut si5351 = Si5351::new(bus.release(), I2cAddress::new(CONFIG.synth_address), CONFIG.drive);
    if let Err(err) = si5351.init(CONFIG.crystal_load, &mut Delay).await {
        defmt::panic!("Si5351 init failed: {}", err);
    }

    let mut scheduler = match BeaconScheduler::new(&CONFIG, si5351, Delay) {
        Ok(scheduler) => scheduler,
        Err(err) => defmt::panic!("beacon configuration rejected: {}", err),
    };

    if let Err(err) = scheduler.park().await {
        warn!("park failed: {}", err);
    }

    info!(
        "Beacon running: CW {} @ {} wpm, QRSS {} + {} Hz",
        CONFIG.cw.frequency, CONFIG.cw.wpm, CONFIG.qrss.base, CONFIG.qrss.offset_hz
    );

    loop {
        if let Err(err) = scheduler.run_cycle().await {
            warn!("beacon cycle failed: {}", err);
            Timer::after(Duration::from_secs(1)).await;
        }
    }
}

//! I2C Bus Abstractions
//!
//! Register-oriented access to I2C devices such as the `Si5351A`, over any
//! async I2C implementation. On the board this is the embassy-stm32 I2C
//! driver with DMA.

use embedded_hal_async::i2c::I2c;

/// I2C device address wrapper
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// `Si5351A` clock synthesizer address
    pub const SI5351: Self = Self(0x60);

    /// Create from 7-bit address
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self(addr & 0x7F)
    }

    /// Get the 7-bit address
    #[must_use]
    pub const fn addr(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for I2cAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "0x{:02X}", self.0);
    }
}

/// Largest register block written in one transaction
const MAX_BLOCK: usize = 16;

/// I2C bus wrapper with register helpers
pub struct I2cBus<I> {
    i2c: I,
}

impl<I: I2c> I2cBus<I> {
    /// Create a new I2C bus wrapper
    #[must_use]
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Give back the underlying bus
    pub fn release(self) -> I {
        self.i2c
    }

    /// Write a single register
    pub async fn write_reg(&mut self, addr: I2cAddress, reg: u8, value: u8) -> Result<(), I::Error> {
        self.i2c.write(addr.addr(), &[reg, value]).await
    }

    /// Read a single register
    pub async fn read_reg(&mut self, addr: I2cAddress, reg: u8) -> Result<u8, I::Error> {
        let mut buf = [0u8];
        self.i2c.write_read(addr.addr(), &[reg], &mut buf).await?;
        Ok(buf[0])
    }

    /// Write consecutive registers starting at `base_reg`
    ///
    /// Blocks of up to 16 bytes go out in a single transaction using the
    /// device's register auto-increment.
    pub async fn write_regs(
        &mut self,
        addr: I2cAddress,
        base_reg: u8,
        values: &[u8],
    ) -> Result<(), I::Error> {
        if values.len() <= MAX_BLOCK {
            let mut buf = [0u8; MAX_BLOCK + 1];
            buf[0] = base_reg;
            buf[1..=values.len()].copy_from_slice(values);
            self.i2c.write(addr.addr(), &buf[..=values.len()]).await
        } else {
            for (reg, &value) in (base_reg..).zip(values) {
                self.write_reg(addr, reg, value).await?;
            }
            Ok(())
        }
    }

    /// Scan the bus for responding devices
    pub async fn scan(&mut self) -> heapless::Vec<I2cAddress, 16> {
        let mut devices = heapless::Vec::new();

        for addr in 0x08..0x78 {
            let mut buf = [0u8; 1];
            if self.i2c.read(addr, &mut buf).await.is_ok() {
                // Full list: later devices are not reported
                if devices.push(I2cAddress::new(addr)).is_err() {
                    break;
                }
            }
        }

        devices
    }
}

use crate::ClientError;
use frame::{BROADCAST_ADDRESS, MAX_ADDRESS};
use std::time::Duration;

pub const DEFAULT_ADDRESS: u8 = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    address: u8,
    pub poll_interval: Duration,
}

impl Config {
    /// Slave address must be a unicast one, 1..=247.
    pub fn new(address: u8) -> Result<Config, ClientError> {
        if address == BROADCAST_ADDRESS || address > MAX_ADDRESS {
            return Err(ClientError::InvalidAddress(address));
        }
        Ok(Config {
            address,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Config {
        self.poll_interval = poll_interval;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            address: DEFAULT_ADDRESS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_limits() {
        assert!(matches!(Config::new(0), Err(ClientError::InvalidAddress(0))));
        assert_eq!(Config::new(1).unwrap().address(), 1);
        assert_eq!(Config::new(247).unwrap().address(), 247);
        assert!(matches!(
            Config::new(248),
            Err(ClientError::InvalidAddress(248))
        ));
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.address(), 1);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        let config = config.with_poll_interval(Duration::from_millis(5));
        assert_eq!(config.poll_interval, Duration::from_millis(5));
    }
}

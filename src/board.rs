/// Hardware abstraction for supported boards.
///
/// Each board module defines the identifiers and radio defaults
/// selected at compile time via feature flags.

#[cfg(feature = "board-esp32h2")]
mod hw {
    pub const BOARD_NAME: &str = "esp32h2_devkitm";
    pub const RADIO_CHANNEL: u8 = 13; // 2415 MHz
}

#[cfg(all(feature = "board-esp32c6", not(feature = "board-esp32h2")))]
mod hw {
    pub const BOARD_NAME: &str = "esp32c6_devkitc";
    pub const RADIO_CHANNEL: u8 = 13;
}

#[cfg(not(any(feature = "board-esp32h2", feature = "board-esp32c6")))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
    pub const RADIO_CHANNEL: u8 = crate::radio::DEFAULT_CHANNEL;
}

pub use hw::*;

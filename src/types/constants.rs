use crate::types::{DeviceId, Position};

/// Name of the single switch in the default topology
pub const SWITCH_NAME: &str = "SWITCH";

/// Endpoint names and canvas positions of the default topology
pub const DEFAULT_ENDPOINTS: [(&str, f64, f64); 4] = [
    ("PC1", 100.0, 100.0),
    ("PC2", 100.0, 600.0),
    ("PC3", 1200.0, 100.0),
    ("PC4", 1200.0, 600.0),
];

/// Canvas position of the switch in the default topology
pub const DEFAULT_SWITCH_POSITION: (f64, f64) = (650.0, 350.0);

/// Colours a packet may be drawn with
pub const PACKET_PALETTE: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#FFD166", "#06D6A0",
    "#118AB2", "#EF476F", "#7209B7", "#F15BB5",
];

/// Width of the separator lines in the start/stop banners
pub const BANNER_WIDTH: usize = 50;

/// Device ID for the first default endpoint
pub fn pc_1() -> DeviceId {
    DeviceId("PC1".to_string())
}

/// Device ID for the second default endpoint
pub fn pc_2() -> DeviceId {
    DeviceId("PC2".to_string())
}

/// Device ID for the third default endpoint
pub fn pc_3() -> DeviceId {
    DeviceId("PC3".to_string())
}

/// Device ID for the fourth default endpoint
pub fn pc_4() -> DeviceId {
    DeviceId("PC4".to_string())
}

/// Device ID for the default switch
pub fn switch() -> DeviceId {
    DeviceId(SWITCH_NAME.to_string())
}

pub fn switch_position() -> Position {
    Position::new(DEFAULT_SWITCH_POSITION.0, DEFAULT_SWITCH_POSITION.1)
}

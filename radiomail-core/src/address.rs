/// One-byte node address, as carried in the radio header.
pub type NodeAddress = u8;

/// Frames sent here are accepted by every node and never acknowledged.
pub const BROADCAST_ADDRESS: NodeAddress = 0xFF;

/// Parse an operator-supplied address, either decimal (`5`) or hex (`0x5`).
pub fn parse_address(value: &str) -> Option<NodeAddress> {
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => NodeAddress::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Render a header byte the way the inbox shows it: `0x3`, `0xa`, `0xff`.
pub fn format_hex(value: u8) -> String {
    format!("{value:#x}")
}

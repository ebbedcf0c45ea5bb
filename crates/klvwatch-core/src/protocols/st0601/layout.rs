/// MISB ST 0601 UAS Datalink Local Set universal key.
pub const UNIVERSAL_KEY: &[u8; 16] = &[
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x0B, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x01, 0x01, 0x00, 0x00, 0x00,
];

pub const KEY_LEN: usize = 16;
pub const KEY_RANGE: std::ops::Range<usize> = 0..KEY_LEN;
pub const LENGTH_OFFSET: usize = KEY_LEN;
pub const MIN_FRAME_LEN: usize = LENGTH_OFFSET + 1;

pub const TAG_ID_LEN: usize = 1;

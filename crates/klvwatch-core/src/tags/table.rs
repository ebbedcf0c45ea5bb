//! Declarative ST 0601 (rev. 19) tag table.
//!
//! Each entry pairs a tag id with its decode kind and the default descriptor
//! (name, unit, declared range). Text and hex entries carry a `0.0..=0.0`
//! range that is never checked.

use serde::Serialize;

/// Width of a fixed-size big-endian integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

/// How the value bytes of a tag are turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DecodeKind {
    Unsigned {
        width: Width,
    },
    Signed {
        width: Width,
    },
    /// Unsigned integer spanning the whole value (1 to 8 bytes).
    UnsignedVar,
    Scaled {
        width: Width,
        signed: bool,
        scale: f64,
        offset: f64,
    },
    /// Length-prefixed normalized fraction in `[0, 1]`.
    Imapb,
    Text,
    Hex,
}

impl DecodeKind {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DecodeKind::Text | DecodeKind::Hex)
    }
}

/// One row of the tag table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagSpec {
    pub id: u8,
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub kind: DecodeKind,
}

const U8_MAX: f64 = 255.0;
const U16_MAX: f64 = 65_535.0;
const I16_MAX: f64 = 32_767.0;
const U32_MAX: f64 = 4_294_967_295.0;
const I32_MAX: f64 = 2_147_483_647.0;
const U64_MAX: f64 = 18_446_744_073_709_551_615.0;
const I64_MAX: f64 = 9_223_372_036_854_775_807.0;

const U8: DecodeKind = DecodeKind::Unsigned { width: Width::W8 };
const U16: DecodeKind = DecodeKind::Unsigned { width: Width::W16 };
const U64: DecodeKind = DecodeKind::Unsigned { width: Width::W64 };
const I8: DecodeKind = DecodeKind::Signed { width: Width::W8 };
const I32: DecodeKind = DecodeKind::Signed { width: Width::W32 };
const I64: DecodeKind = DecodeKind::Signed { width: Width::W64 };
const UVAR: DecodeKind = DecodeKind::UnsignedVar;
const IMAPB: DecodeKind = DecodeKind::Imapb;
const TEXT: DecodeKind = DecodeKind::Text;
const HEX: DecodeKind = DecodeKind::Hex;

const fn scaled(width: Width, signed: bool, scale: f64, offset: f64) -> DecodeKind {
    DecodeKind::Scaled {
        width,
        signed,
        scale,
        offset,
    }
}

const HEADING: DecodeKind = scaled(Width::W16, false, 360.0 / U16_MAX, 0.0);
const ALTITUDE: DecodeKind = scaled(Width::W16, false, 19_900.0 / U16_MAX, -900.0);
const LATITUDE: DecodeKind = scaled(Width::W32, true, 90.0 / I32_MAX, 0.0);
const LONGITUDE: DecodeKind = scaled(Width::W32, true, 180.0 / I32_MAX, 0.0);
const CORNER_OFFSET: DecodeKind = scaled(Width::W16, true, 0.075 / I16_MAX, 0.0);
const PRESSURE: DecodeKind = scaled(Width::W16, false, 5_000.0 / U16_MAX, 0.0);
const FOV: DecodeKind = scaled(Width::W16, false, 180.0 / U16_MAX, 0.0);
const ANGLE_U32: DecodeKind = scaled(Width::W32, false, 360.0 / U32_MAX, 0.0);
const RANGE_U32: DecodeKind = scaled(Width::W32, false, 5_000_000.0 / U32_MAX, 0.0);
const PERCENT_U8: DecodeKind = scaled(Width::W8, false, 100.0 / U8_MAX, 0.0);
const ANGLE_20_I16: DecodeKind = scaled(Width::W16, true, 20.0 / I16_MAX, 0.0);
const ANGLE_90_I32: DecodeKind = scaled(Width::W32, true, 90.0 / I32_MAX, 0.0);
const GATE: DecodeKind = scaled(Width::W8, false, 2.0, 0.0);
const ERROR_ESTIMATE: DecodeKind = scaled(Width::W16, false, 4_095.0 / U16_MAX, 0.0);
const VELOCITY: DecodeKind = scaled(Width::W16, true, 327.0 / I16_MAX, 0.0);
const MASS_OR_WIDTH: DecodeKind = scaled(Width::W16, false, 10_000.0 / U16_MAX, 0.0);
const ROLL: DecodeKind = scaled(Width::W16, true, 50.0 / I16_MAX, 0.0);
const ANGLE_180_I32: DecodeKind = scaled(Width::W32, true, 180.0 / I32_MAX, 0.0);
const VERTICAL_SPEED: DecodeKind = scaled(Width::W16, true, 180.0 / I16_MAX, 0.0);

const fn tag(
    id: u8,
    name: &'static str,
    unit: &'static str,
    min: f64,
    max: f64,
    kind: DecodeKind,
) -> TagSpec {
    TagSpec {
        id,
        name,
        unit,
        min,
        max,
        kind,
    }
}

const fn opaque(id: u8, name: &'static str, kind: DecodeKind) -> TagSpec {
    tag(id, name, "", 0.0, 0.0, kind)
}

/// ST 0601 tags 1 through 143, sorted by id.
pub static ST0601_TAGS: &[TagSpec] = &[
    tag(1, "Checksum", "", 0.0, U16_MAX, U16),
    tag(2, "Precision Time Stamp", "us", 0.0, U64_MAX, U64),
    opaque(3, "Mission ID", TEXT),
    opaque(4, "Platform Tail Number", TEXT),
    tag(5, "Platform Heading Angle", "deg", 0.0, 360.0, HEADING),
    tag(6, "Platform Pitch Angle", "deg", -20.0, 20.0, ANGLE_20_I16),
    tag(7, "Platform Roll Angle", "deg", -50.0, 50.0, ROLL),
    tag(8, "Platform True Airspeed", "m/s", 0.0, U8_MAX, U8),
    tag(9, "Platform Indicated Airspeed", "m/s", 0.0, U8_MAX, U8),
    opaque(10, "Platform Designation", TEXT),
    opaque(11, "Image Source Sensor", TEXT),
    opaque(12, "Image Coordinate System", TEXT),
    tag(13, "Sensor Latitude", "deg", -90.0, 90.0, LATITUDE),
    tag(14, "Sensor Longitude", "deg", -180.0, 180.0, LONGITUDE),
    tag(15, "Sensor True Altitude", "m", -900.0, 19_000.0, ALTITUDE),
    tag(16, "Sensor Horizontal Field of View", "deg", 0.0, 180.0, FOV),
    tag(17, "Sensor Vertical Field of View", "deg", 0.0, 180.0, FOV),
    tag(18, "Sensor Relative Azimuth Angle", "deg", 0.0, 360.0, ANGLE_U32),
    tag(19, "Sensor Relative Elevation Angle", "deg", -180.0, 180.0, ANGLE_180_I32),
    tag(20, "Sensor Relative Roll Angle", "deg", 0.0, 360.0, ANGLE_U32),
    tag(21, "Slant Range", "m", 0.0, 5_000_000.0, RANGE_U32),
    tag(22, "Target Width", "m", 0.0, 10_000.0, MASS_OR_WIDTH),
    tag(23, "Frame Center Latitude", "deg", -90.0, 90.0, LATITUDE),
    tag(24, "Frame Center Longitude", "deg", -180.0, 180.0, LONGITUDE),
    tag(25, "Frame Center Elevation", "m", -900.0, 19_000.0, ALTITUDE),
    tag(26, "Offset Corner Latitude Point 1", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(27, "Offset Corner Longitude Point 1", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(28, "Offset Corner Latitude Point 2", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(29, "Offset Corner Longitude Point 2", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(30, "Offset Corner Latitude Point 3", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(31, "Offset Corner Longitude Point 3", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(32, "Offset Corner Latitude Point 4", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(33, "Offset Corner Longitude Point 4", "deg", -0.075, 0.075, CORNER_OFFSET),
    tag(34, "Icing Detected", "", 0.0, U8_MAX, U8),
    tag(35, "Wind Direction", "deg", 0.0, 360.0, HEADING),
    tag(36, "Wind Speed", "m/s", 0.0, 100.0, PERCENT_U8),
    tag(37, "Static Pressure", "mbar", 0.0, 5_000.0, PRESSURE),
    tag(38, "Density Altitude", "m", -900.0, 19_000.0, ALTITUDE),
    tag(39, "Outside Air Temperature", "C", -128.0, 127.0, I8),
    tag(40, "Target Location Latitude", "deg", -90.0, 90.0, LATITUDE),
    tag(41, "Target Location Longitude", "deg", -180.0, 180.0, LONGITUDE),
    tag(42, "Target Location Elevation", "m", -900.0, 19_000.0, ALTITUDE),
    tag(43, "Target Track Gate Width", "px", 0.0, 510.0, GATE),
    tag(44, "Target Track Gate Height", "px", 0.0, 510.0, GATE),
    tag(45, "Target Error Estimate - CE90", "m", 0.0, 4_095.0, ERROR_ESTIMATE),
    tag(46, "Target Error Estimate - LE90", "m", 0.0, 4_095.0, ERROR_ESTIMATE),
    tag(47, "Generic Flag Data", "", 0.0, U8_MAX, U8),
    opaque(48, "Security Local Set", HEX),
    tag(49, "Differential Pressure", "mbar", 0.0, 5_000.0, PRESSURE),
    tag(50, "Platform Angle of Attack", "deg", -20.0, 20.0, ANGLE_20_I16),
    tag(51, "Platform Vertical Speed", "m/s", -180.0, 180.0, VERTICAL_SPEED),
    tag(52, "Platform Sideslip Angle", "deg", -20.0, 20.0, ANGLE_20_I16),
    tag(53, "Airfield Barometric Pressure", "mbar", 0.0, 5_000.0, PRESSURE),
    tag(54, "Airfield Elevation", "m", -900.0, 19_000.0, ALTITUDE),
    tag(55, "Relative Humidity", "%", 0.0, 100.0, PERCENT_U8),
    tag(56, "Platform Ground Speed", "m/s", 0.0, U8_MAX, U8),
    tag(57, "Ground Range", "m", 0.0, 5_000_000.0, RANGE_U32),
    tag(58, "Platform Fuel Remaining", "kg", 0.0, 10_000.0, MASS_OR_WIDTH),
    opaque(59, "Platform Call Sign", TEXT),
    opaque(60, "Weapon Load", HEX),
    opaque(61, "Weapon Fired", HEX),
    tag(62, "Laser PRF Code", "", 0.0, U16_MAX, U16),
    tag(63, "Sensor Field of View Name", "", 0.0, U8_MAX, U8),
    tag(64, "Platform Magnetic Heading", "deg", 0.0, 360.0, HEADING),
    tag(65, "UAS Datalink LS Version Number", "", 0.0, U8_MAX, U8),
    opaque(66, "Target Location Covariance Matrix", HEX),
    tag(67, "Alternate Platform Latitude", "deg", -90.0, 90.0, LATITUDE),
    tag(68, "Alternate Platform Longitude", "deg", -180.0, 180.0, LONGITUDE),
    tag(69, "Alternate Platform Altitude", "m", -900.0, 19_000.0, ALTITUDE),
    opaque(70, "Alternate Platform Name", TEXT),
    tag(71, "Alternate Platform Heading", "deg", 0.0, 360.0, HEADING),
    tag(72, "Event Start Time - UTC", "us", 0.0, U64_MAX, U64),
    opaque(73, "RVT Local Set", HEX),
    opaque(74, "VMTI Local Set", HEX),
    tag(75, "Sensor Ellipsoid Height", "m", -900.0, 19_000.0, ALTITUDE),
    tag(76, "Alternate Platform Ellipsoid Height", "m", -900.0, 19_000.0, ALTITUDE),
    tag(77, "Operational Mode", "", 0.0, U8_MAX, U8),
    tag(78, "Frame Center Height Above Ellipsoid", "m", -900.0, 19_000.0, ALTITUDE),
    tag(79, "Sensor North Velocity", "m/s", -327.0, 327.0, VELOCITY),
    tag(80, "Sensor East Velocity", "m/s", -327.0, 327.0, VELOCITY),
    opaque(81, "Image Horizon Pixel Pack", HEX),
    tag(82, "Corner Latitude Point 1 (Full)", "deg", -90.0, 90.0, LATITUDE),
    tag(83, "Corner Longitude Point 1 (Full)", "deg", -180.0, 180.0, LONGITUDE),
    tag(84, "Corner Latitude Point 2 (Full)", "deg", -90.0, 90.0, LATITUDE),
    tag(85, "Corner Longitude Point 2 (Full)", "deg", -180.0, 180.0, LONGITUDE),
    tag(86, "Corner Latitude Point 3 (Full)", "deg", -90.0, 90.0, LATITUDE),
    tag(87, "Corner Longitude Point 3 (Full)", "deg", -180.0, 180.0, LONGITUDE),
    tag(88, "Corner Latitude Point 4 (Full)", "deg", -90.0, 90.0, LATITUDE),
    tag(89, "Corner Longitude Point 4 (Full)", "deg", -180.0, 180.0, LONGITUDE),
    tag(90, "Platform Pitch Angle (Full)", "deg", -90.0, 90.0, ANGLE_90_I32),
    tag(91, "Platform Roll Angle (Full)", "deg", -90.0, 90.0, ANGLE_90_I32),
    tag(92, "Platform Angle of Attack (Full)", "deg", -90.0, 90.0, ANGLE_90_I32),
    tag(93, "Platform Sideslip Angle (Full)", "deg", -180.0, 180.0, ANGLE_180_I32),
    opaque(94, "MIIS Core Identifier", HEX),
    opaque(95, "SAR Motion Imagery Local Set", HEX),
    tag(96, "Target Width Extended", "m", 0.0, 1_500_000.0, IMAPB),
    opaque(97, "Range Image Local Set", HEX),
    opaque(98, "Geo-Registration Local Set", HEX),
    opaque(99, "Composite Imaging Local Set", HEX),
    opaque(100, "Segment Local Set", HEX),
    opaque(101, "Amend Local Set", HEX),
    opaque(102, "SDCC-FLP", HEX),
    tag(103, "Density Altitude Extended", "m", -900.0, 40_000.0, IMAPB),
    tag(104, "Sensor Ellipsoid Height Extended", "m", -900.0, 40_000.0, IMAPB),
    tag(105, "Alternate Platform Ellipsoid Height Extended", "m", -900.0, 40_000.0, IMAPB),
    opaque(106, "Stream Designator", TEXT),
    opaque(107, "Operational Base", TEXT),
    opaque(108, "Broadcast Source", TEXT),
    tag(109, "Range To Recovery Location", "km", 0.0, 21_000.0, IMAPB),
    tag(110, "Time Airborne", "s", 0.0, U32_MAX, UVAR),
    tag(111, "Propulsion Unit Speed", "RPM", 0.0, U32_MAX, UVAR),
    tag(112, "Platform Course Angle", "deg", 0.0, 360.0, IMAPB),
    tag(113, "Altitude Above Ground Level", "m", -900.0, 40_000.0, IMAPB),
    tag(114, "Radar Altimeter", "m", -900.0, 40_000.0, IMAPB),
    opaque(115, "Control Command", HEX),
    opaque(116, "Control Command Verification List", HEX),
    tag(117, "Sensor Azimuth Rate", "deg/s", -1_000.0, 1_000.0, IMAPB),
    tag(118, "Sensor Elevation Rate", "deg/s", -1_000.0, 1_000.0, IMAPB),
    tag(119, "Sensor Roll Rate", "deg/s", -1_000.0, 1_000.0, IMAPB),
    tag(120, "On-board MI Storage Percent Full", "%", 0.0, 100.0, IMAPB),
    opaque(121, "Active Wavelength List", HEX),
    opaque(122, "Country Codes", HEX),
    tag(123, "Number of NAVSATs in View", "", 0.0, U8_MAX, U8),
    tag(124, "Positioning Method Source", "", 0.0, U8_MAX, U8),
    tag(125, "Platform Status", "", 0.0, U8_MAX, U8),
    tag(126, "Sensor Control Mode", "", 0.0, U8_MAX, U8),
    opaque(127, "Sensor Frame Rate Pack", HEX),
    opaque(128, "Wavelengths List", HEX),
    opaque(129, "Target ID", TEXT),
    opaque(130, "Airbase Locations", HEX),
    tag(131, "Take-off Time", "us", 0.0, U64_MAX, U64),
    tag(132, "Transmission Frequency", "MHz", 1.0, 99_999.0, IMAPB),
    tag(133, "On-board MI Storage Capacity", "GB", 0.0, U32_MAX, UVAR),
    tag(134, "Zoom Percentage", "%", 0.0, 100.0, IMAPB),
    opaque(135, "Communications Method", TEXT),
    tag(136, "Leap Seconds", "s", -I32_MAX - 1.0, I32_MAX, I32),
    tag(137, "Correction Offset", "us", -I64_MAX - 1.0, I64_MAX, I64),
    opaque(138, "Payload List", HEX),
    opaque(139, "Active Payloads", HEX),
    opaque(140, "Weapons Stores", HEX),
    opaque(141, "Waypoint List", HEX),
    opaque(142, "View Domain", HEX),
    opaque(143, "Metadata Substream ID Pack", HEX),
];

/// Table row for `tag`, if the tag is known.
pub fn tag_spec(tag: u8) -> Option<&'static TagSpec> {
    ST0601_TAGS
        .binary_search_by_key(&tag, |spec| spec.id)
        .ok()
        .map(|index| &ST0601_TAGS[index])
}

/// Decode kind for `tag`; `None` for tags without a table entry.
///
/// # Examples
/// ```
/// use klvwatch_core::tags::{DecodeKind, Width, dispatch_kind};
///
/// assert_eq!(dispatch_kind(1), Some(DecodeKind::Unsigned { width: Width::W16 }));
/// assert_eq!(dispatch_kind(250), None);
/// ```
pub fn dispatch_kind(tag: u8) -> Option<DecodeKind> {
    tag_spec(tag).map(|spec| spec.kind)
}

#[cfg(test)]
mod tests {
    use super::{DecodeKind, ST0601_TAGS, Width, dispatch_kind, tag_spec};

    #[test]
    fn table_is_sorted_and_covers_rev19() {
        assert_eq!(ST0601_TAGS.len(), 143);
        for (index, spec) in ST0601_TAGS.iter().enumerate() {
            assert_eq!(usize::from(spec.id), index + 1, "row {index} out of order");
        }
    }

    #[test]
    fn numeric_ranges_are_ordered() {
        for spec in ST0601_TAGS.iter().filter(|spec| spec.kind.is_numeric()) {
            assert!(spec.min < spec.max, "tag {} has an empty range", spec.id);
        }
    }

    #[test]
    fn corner_offsets_share_one_kind() {
        let first = dispatch_kind(26).unwrap();
        for tag in 27..=33 {
            assert_eq!(dispatch_kind(tag), Some(first));
        }
    }

    #[test]
    fn signed_angle_kinds() {
        assert_eq!(dispatch_kind(19), dispatch_kind(93));
        assert_eq!(
            dispatch_kind(19),
            Some(DecodeKind::Scaled {
                width: Width::W32,
                signed: true,
                scale: 180.0 / 2_147_483_647.0,
                offset: 0.0,
            })
        );
        assert_eq!(
            dispatch_kind(7),
            Some(DecodeKind::Scaled {
                width: Width::W16,
                signed: true,
                scale: 50.0 / 32_767.0,
                offset: 0.0,
            })
        );
        assert!(matches!(
            dispatch_kind(51),
            Some(DecodeKind::Scaled { width: Width::W16, signed: true, .. })
        ));
    }

    #[test]
    fn full_corner_points_alternate_latitude_longitude() {
        for tag in (82..=88).step_by(2) {
            assert_eq!(dispatch_kind(tag), dispatch_kind(13));
            assert_eq!(dispatch_kind(tag + 1), dispatch_kind(14));
        }
    }

    #[test]
    fn timestamps_are_unsigned_64() {
        let kind = DecodeKind::Unsigned { width: Width::W64 };
        assert_eq!(dispatch_kind(2), Some(kind));
        assert_eq!(dispatch_kind(72), Some(kind));
        assert_eq!(dispatch_kind(131), Some(kind));
    }

    #[test]
    fn opaque_sets_render_as_hex() {
        for tag in [48, 73, 74, 94, 143] {
            assert_eq!(dispatch_kind(tag), Some(DecodeKind::Hex), "tag {tag}");
        }
    }

    #[test]
    fn unknown_tags_have_no_entry() {
        assert!(tag_spec(0).is_none());
        assert!(tag_spec(144).is_none());
        assert!(tag_spec(250).is_none());
    }
}

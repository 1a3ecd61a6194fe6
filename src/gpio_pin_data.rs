use crate::error::{GpioError, Result};

/// Physical to system pin numbers for the Dragonboard 410c low-speed
/// expansion header.
///
/// Each entry is `(physical, system)`. The physical number is the one printed
/// on the board schematic; the system number is the one the kernel uses under
/// `/sys/class/gpio`. The comment on each row is the header letter.
pub const PIN_MAPPING: [(u32, u32); 11] = [
    (24, 12),  // B
    (25, 13),  // C
    (26, 69),  // D
    (27, 115), // E
    (28, 4),   // F
    (29, 24),  // G
    (30, 25),  // H
    (31, 35),  // I
    (32, 34),  // J
    (33, 28),  // K
    (34, 33),  // L
];

/// Converts a physical pin number into the corresponding system pin number.
///
/// The returned number is the one used in every sysfs command.
///
/// # Example
///
/// ```rust
/// use db410c_gpio::convert_physical_pin;
///
/// assert_eq!(convert_physical_pin(29).unwrap(), 24);
/// assert!(convert_physical_pin(23).is_err());
/// ```
pub fn convert_physical_pin(pin: u32) -> Result<u32> {
    PIN_MAPPING
        .iter()
        .find(|(physical, _)| *physical == pin)
        .map(|(_, system)| *system)
        .ok_or(GpioError::InvalidPin(pin))
}

/// Iterates the supported physical pin numbers in header order.
pub fn supported_physical_pins() -> impl Iterator<Item = u32> {
    PIN_MAPPING.iter().map(|(physical, _)| *physical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_header_pin_maps_to_a_distinct_system_pin() {
        let mut seen = HashSet::new();
        for physical in 24..=34 {
            let system = convert_physical_pin(physical).unwrap();
            assert!(seen.insert(system), "system pin {} mapped twice", system);
        }
        assert_eq!(seen.len(), 11);
    }

    #[test]
    fn matches_reference_table() {
        let expected = [12, 13, 69, 115, 4, 24, 25, 35, 34, 28, 33];
        let got: Vec<u32> = (24..=34).map(|p| convert_physical_pin(p).unwrap()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn rejects_pins_off_the_header() {
        for pin in [0, 1, 23, 35, 100, u32::MAX] {
            match convert_physical_pin(pin) {
                Err(GpioError::InvalidPin(p)) => assert_eq!(p, pin),
                other => panic!("expected InvalidPin for {}, got {:?}", pin, other),
            }
        }
    }

    #[test]
    fn supported_pins_cover_closed_range() {
        let pins: Vec<u32> = supported_physical_pins().collect();
        assert_eq!(pins, (24..=34).collect::<Vec<_>>());
    }
}

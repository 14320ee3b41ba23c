/// FlatReading → Packet.
///
/// Renames device fields to canonical ones, picks the unit system and
/// derives the rain delta.

use crate::model::{FieldValue, FlatReading, Packet, UnitSystem};
use crate::rain::RainState;
use crate::sensor_map::{BASE_UNITS, DAY_RAIN_TOTAL, RAIN, SensorMap};
use log::debug;

const LOG_TARGET: &str = "ip100::driver";

/// Builds the packet for one poll.
///
/// Canonical fields whose device field is absent are left out. When the
/// packet carries a numeric `day_rain_total`, `rain` is derived from
/// `rain_state`, which is advanced only after the packet is complete.
pub fn build_packet(
    reading: &FlatReading,
    sensor_map: &SensorMap,
    rain_state: &mut RainState,
    date_time: i64,
) -> Packet {
    let base_units = reading.get(BASE_UNITS).and_then(FieldValue::as_text);
    let mut packet = Packet::new(date_time, UnitSystem::from_base_units(base_units));

    for (canonical, native) in sensor_map.iter() {
        if let Some(value) = reading.get(native) {
            packet.fields.insert(canonical.to_string(), value.clone());
        }
    }

    match packet.get(DAY_RAIN_TOTAL).map(FieldValue::as_f64) {
        Some(Some(total)) => {
            if let Some(delta) = rain_state.delta(total) {
                packet.fields.insert(RAIN.to_string(), FieldValue::Number(delta));
            }
            rain_state.advance(total);
        }
        Some(None) => {
            debug!(
                target: LOG_TARGET,
                "day_rain_total is not numeric: {:?}",
                packet.get(DAY_RAIN_TOTAL)
            );
        }
        None => {
            debug!(target: LOG_TARGET, "no rain in packet: {:?}", packet);
        }
    }

    packet
}

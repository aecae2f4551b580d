//! Subtracts locally-held demand from operator-reported capacity before a
//! result reaches a caller. Operators do not know about reservations made
//! through this platform that they have not processed yet.

use std::collections::HashMap;

use seaway_shared::SailingResult;
use seaway_store::reservations::SailingLoad;

/// Floor-subtract one sailing's local load from its reported capacity.
///
/// Cabin subtraction is an approximation by design: operators report no
/// per-cabin-type breakdown of our reservations, so the summed cabin
/// count spills through the non-deck accommodation options in listed
/// order until it is exhausted.
pub fn adjust(result: &mut SailingResult, load: &SailingLoad) {
    result.available_passenger_spaces = result
        .available_passenger_spaces
        .saturating_sub(load.passengers);
    result.available_vehicle_spaces = result
        .available_vehicle_spaces
        .saturating_sub(load.vehicles);

    let mut remaining = load.cabins;
    for accommodation in result
        .accommodations
        .iter_mut()
        .filter(|a| a.category.is_cabin())
    {
        if remaining == 0 {
            break;
        }
        let taken = remaining.min(accommodation.available);
        accommodation.available -= taken;
        remaining -= taken;
    }
}

pub fn apply(results: &mut [SailingResult], loads: &HashMap<String, SailingLoad>) {
    for result in results.iter_mut() {
        if let Some(load) = loads.get(&result.sailing_id) {
            adjust(result, load);
        }
    }
}

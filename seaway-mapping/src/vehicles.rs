//! Vehicle class translation. Vehicle vocabularies are small and stable,
//! so this stays a two-tier static mapping with a keyword fold for the
//! response direction.

use seaway_shared::VehicleClass;

pub fn operator_vehicle_code(operator: &str, class: VehicleClass) -> Option<&'static str> {
    use VehicleClass::*;
    let table: &[(VehicleClass, &str)] = match operator {
        "maghreb" => &[
            (Car, "CAR"),
            (Van, "VAN"),
            (Motorcycle, "MOTO"),
            (Bicycle, "BIKE"),
            (Camper, "CAMPER"),
            (Trailer, "TRAILER"),
        ],
        "adriatic" => &[
            (Car, "VEH-A"),
            (Van, "VEH-B"),
            (Motorcycle, "VEH-M"),
            (Bicycle, "VEH-C"),
            (Camper, "VEH-R"),
            (Trailer, "VEH-T"),
        ],
        _ => &[],
    };
    table
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, code)| *code)
}

/// Reverse lookup for response translation: operator vehicle code back to
/// the internal class, falling back to the keyword fold.
pub fn vehicle_class_for_code(operator: &str, code: &str) -> Option<VehicleClass> {
    const ALL: [VehicleClass; 6] = [
        VehicleClass::Car,
        VehicleClass::Van,
        VehicleClass::Motorcycle,
        VehicleClass::Bicycle,
        VehicleClass::Camper,
        VehicleClass::Trailer,
    ];
    ALL.iter()
        .copied()
        .find(|class| operator_vehicle_code(operator, *class) == Some(code))
        .or_else(|| fold_vehicle_label(code))
}

/// Fold an operator's vehicle label back into the internal class set.
pub fn fold_vehicle_label(label: &str) -> Option<VehicleClass> {
    let l = label.to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|w| l.contains(w));

    if contains_any(&["camper", "motorhome", "caravan"]) {
        return Some(VehicleClass::Camper);
    }
    if contains_any(&["trailer"]) {
        return Some(VehicleClass::Trailer);
    }
    if contains_any(&["motorcycle", "moto", "scooter"]) {
        return Some(VehicleClass::Motorcycle);
    }
    if contains_any(&["bicycle", "bike"]) {
        return Some(VehicleClass::Bicycle);
    }
    if contains_any(&["van", "minibus"]) {
        return Some(VehicleClass::Van);
    }
    if contains_any(&["car", "vehicle"]) {
        return Some(VehicleClass::Car);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_codes() {
        assert_eq!(
            operator_vehicle_code("maghreb", VehicleClass::Motorcycle),
            Some("MOTO")
        );
        assert_eq!(
            operator_vehicle_code("adriatic", VehicleClass::Car),
            Some("VEH-A")
        );
    }

    #[test]
    fn test_fold_prefers_specific_terms() {
        // "camper van" must not fold to Van.
        assert_eq!(fold_vehicle_label("Camper van"), Some(VehicleClass::Camper));
        assert_eq!(fold_vehicle_label("Small car"), Some(VehicleClass::Car));
        assert_eq!(fold_vehicle_label("freight"), None);
    }
}

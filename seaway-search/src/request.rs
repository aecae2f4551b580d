use chrono::NaiveDate;

use seaway_core::error::SearchError;
use seaway_core::operator::NormalizedOperatorSearch;
use seaway_mapping::ports::{self, PortResolution, ResolvedPort};
use seaway_shared::{PassengerCounts, VehicleClass};

/// Caller-facing search criteria, before normalization. Port fields
/// accept internal codes, display-name aliases, or virtual "ALL-<CC>"
/// country codes.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub departure: String,
    pub arrival: String,
    pub date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: PassengerCounts,
    pub vehicles: Vec<VehicleClass>,
    pub operators: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NormalizedSearch {
    pub departure: ResolvedPort,
    pub arrival: ResolvedPort,
    pub date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: PassengerCounts,
    pub vehicles: Vec<VehicleClass>,
}

impl SearchCriteria {
    /// Resolve ports and enforce everything that must fail before a
    /// single network call happens.
    pub fn normalize(&self) -> Result<NormalizedSearch, SearchError> {
        if self.passengers.adults == 0 {
            return Err(SearchError::Validation(
                "at least one adult passenger is required".to_string(),
            ));
        }

        let departure = resolve_port(&self.departure)?;
        let arrival = resolve_port(&self.arrival)?;

        if departure.code == arrival.code {
            return Err(SearchError::Validation(format!(
                "departure and arrival resolve to the same port {}",
                departure.code
            )));
        }
        // A virtual code keeps its country: ALL-TN vs TUN is still a
        // same-country search and must fail like TUN vs TUN would.
        if (departure.via_virtual || arrival.via_virtual) && departure.country == arrival.country {
            return Err(SearchError::Validation(format!(
                "departure and arrival both resolve into country {}",
                departure.country
            )));
        }

        if let Some(return_date) = self.return_date {
            if return_date < self.date {
                return Err(SearchError::Validation(
                    "return date precedes the outbound date".to_string(),
                ));
            }
        }

        Ok(NormalizedSearch {
            departure,
            arrival,
            date: self.date,
            return_date: self.return_date,
            passengers: self.passengers,
            vehicles: self.vehicles.clone(),
        })
    }
}

fn resolve_port(input: &str) -> Result<ResolvedPort, SearchError> {
    match ports::resolve(input) {
        PortResolution::Resolved(port) => Ok(port),
        PortResolution::Unknown => Err(SearchError::Validation(format!(
            "unknown port code {input:?}"
        ))),
    }
}

impl NormalizedSearch {
    /// Outbound leg, plus the reverse leg when a return date is present.
    pub fn legs(&self) -> Vec<(String, String, NaiveDate)> {
        let mut legs = vec![(
            self.departure.code.clone(),
            self.arrival.code.clone(),
            self.date,
        )];
        if let Some(return_date) = self.return_date {
            legs.push((
                self.arrival.code.clone(),
                self.departure.code.clone(),
                return_date,
            ));
        }
        legs
    }

    pub fn operator_search(&self, departure: &str, arrival: &str, date: NaiveDate) -> NormalizedOperatorSearch {
        NormalizedOperatorSearch {
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            date,
            passengers: self.passengers,
            vehicles: self.vehicles.clone(),
        }
    }

    /// Cache key over the normalized request. The raw entry stored under
    /// it is pre-reconciliation data, shareable across callers.
    pub fn cache_key(&self, operators: &[String]) -> String {
        let mut vehicles: Vec<&str> = self.vehicles.iter().map(|v| v.as_str()).collect();
        vehicles.sort_unstable();
        let return_part = self
            .return_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "oneway".to_string());
        format!(
            "search:{}:{}:{}:{}:{}-{}-{}:{}:{}",
            self.departure.code,
            self.arrival.code,
            self.date,
            return_part,
            self.passengers.adults,
            self.passengers.children,
            self.passengers.infants,
            vehicles.join("+"),
            operators.join("+"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(departure: &str, arrival: &str) -> SearchCriteria {
        SearchCriteria {
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            return_date: None,
            passengers: PassengerCounts::adults_only(2),
            vehicles: vec![],
            operators: None,
        }
    }

    #[test]
    fn test_same_port_rejected() {
        let err = criteria("TUN", "tunis").normalize();
        assert!(matches!(err, Err(SearchError::Validation(_))));
    }

    #[test]
    fn test_virtual_and_concrete_same_country_rejected() {
        let err = criteria("ALL-TN", "TUN").normalize();
        assert!(matches!(err, Err(SearchError::Validation(_))));
    }

    #[test]
    fn test_two_virtual_codes_same_country_rejected() {
        let err = criteria("ALL-FR", "all-fr").normalize();
        assert!(matches!(err, Err(SearchError::Validation(_))));
    }

    #[test]
    fn test_virtual_resolves_to_default_port_cross_country() {
        let normalized = criteria("ALL-TN", "MRS").normalize().unwrap();
        assert_eq!(normalized.departure.code, "TUN");
        assert!(normalized.departure.via_virtual);
    }

    #[test]
    fn test_zero_adults_rejected() {
        let mut c = criteria("TUN", "MRS");
        c.passengers = PassengerCounts {
            adults: 0,
            children: 2,
            infants: 0,
        };
        assert!(matches!(c.normalize(), Err(SearchError::Validation(_))));
    }

    #[test]
    fn test_return_leg_reverses_ports() {
        let mut c = criteria("TUN", "MRS");
        c.return_date = NaiveDate::from_ymd_opt(2025, 6, 8);
        let normalized = c.normalize().unwrap();
        let legs = normalized.legs();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[1].0, "MRS");
        assert_eq!(legs[1].1, "TUN");
    }

    #[test]
    fn test_cache_key_is_stable_across_vehicle_order() {
        let mut a = criteria("TUN", "MRS");
        a.vehicles = vec![VehicleClass::Car, VehicleClass::Bicycle];
        let mut b = criteria("TUN", "MRS");
        b.vehicles = vec![VehicleClass::Bicycle, VehicleClass::Car];
        let ops = vec!["adriatic".to_string(), "maghreb".to_string()];
        assert_eq!(
            a.normalize().unwrap().cache_key(&ops),
            b.normalize().unwrap().cache_key(&ops)
        );
    }
}

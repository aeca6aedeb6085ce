//! Directory filter set.
//!
//! Absent fields are unconstrained; present fields AND together. The same
//! struct drives both the SQL WHERE clause in `gardes-db` and in-memory
//! filtering in the CLI.

use crate::Pharmacy;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PharmacyFilters {
    pub search_query: Option<String>,
    pub is_on_call: Option<bool>,
    pub has_parking: Option<bool>,
    pub is_pmr: Option<bool>,
}

impl PharmacyFilters {
    /// True when no field constrains the result set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_query.is_none()
            && self.is_on_call.is_none()
            && self.has_parking.is_none()
            && self.is_pmr.is_none()
    }

    /// Whether `pharmacy` satisfies every present filter.
    ///
    /// Text search matches case-insensitively against name or address
    /// substrings; boolean filters are exact matches on the flags.
    #[must_use]
    pub fn matches(&self, pharmacy: &Pharmacy) -> bool {
        if let Some(on_call) = self.is_on_call {
            if pharmacy.is_on_call != on_call {
                return false;
            }
        }
        if let Some(parking) = self.has_parking {
            if pharmacy.has_parking != parking {
                return false;
            }
        }
        if let Some(pmr) = self.is_pmr {
            if pharmacy.is_pmr != pmr {
                return false;
            }
        }
        if let Some(query) = &self.search_query {
            let query = query.to_lowercase();
            let in_name = pharmacy.name.to_lowercase().contains(&query);
            let in_address = pharmacy.address.to_lowercase().contains(&query);
            if !in_name && !in_address {
                return false;
            }
        }
        true
    }

    /// Apply the filters to a slice, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, pharmacies: &'a [Pharmacy]) -> Vec<&'a Pharmacy> {
        pharmacies.iter().filter(|p| self.matches(p)).collect()
    }
}

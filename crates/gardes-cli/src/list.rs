//! `list` command: filtered directory listing.
//!
//! Fetches the directory once and filters in memory; the dataset is a
//! city's worth of pharmacies, not something worth a query per flag.

use anyhow::Context;
use gardes_core::{Pharmacy, PharmacyFilters};
use gardes_db::PharmacyRow;

pub async fn run(
    search: Option<String>,
    on_call: bool,
    parking: bool,
    pmr: bool,
) -> anyhow::Result<()> {
    let filters = build_filters(search, on_call, parking, pmr);

    let pool = gardes_db::connect_pool_from_env()
        .await
        .context("connecting to database")?;
    let rows = gardes_db::list_pharmacies(&pool, &PharmacyFilters::default())
        .await
        .context("querying pharmacies")?;
    let pharmacies: Vec<Pharmacy> = rows.into_iter().map(PharmacyRow::into_domain).collect();

    let matched = filters.apply(&pharmacies);
    if matched.is_empty() {
        println!("no pharmacies match");
        return Ok(());
    }

    for pharmacy in matched {
        let mut badges = Vec::new();
        if pharmacy.is_on_call {
            badges.push("de garde");
        }
        if pharmacy.has_parking {
            badges.push("parking");
        }
        if pharmacy.is_pmr {
            badges.push("pmr");
        }
        let badges = if badges.is_empty() {
            String::new()
        } else {
            format!("  [{}]", badges.join(", "))
        };
        println!("{}  ({}){badges}", pharmacy.name, pharmacy.slug);
        println!("    {}", pharmacy.address);
        if let Some(phone) = &pharmacy.phone {
            println!("    {phone}");
        }
    }

    Ok(())
}

/// Flags mirror the client's filter sheet: present means "must be true",
/// absent means unconstrained.
fn build_filters(
    search: Option<String>,
    on_call: bool,
    parking: bool,
    pmr: bool,
) -> PharmacyFilters {
    PharmacyFilters {
        search_query: search.filter(|s| !s.trim().is_empty()),
        is_on_call: on_call.then_some(true),
        has_parking: parking.then_some(true),
        is_pmr: pmr.then_some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_flags_leave_filters_unconstrained() {
        let filters = build_filters(None, false, false, false);
        assert!(filters.is_empty());
    }

    #[test]
    fn present_flags_require_true() {
        let filters = build_filters(Some("nord".to_string()), true, false, true);
        assert_eq!(filters.search_query.as_deref(), Some("nord"));
        assert_eq!(filters.is_on_call, Some(true));
        assert_eq!(filters.has_parking, None);
        assert_eq!(filters.is_pmr, Some(true));
    }

    #[test]
    fn blank_search_counts_as_absent() {
        let filters = build_filters(Some("   ".to_string()), false, false, false);
        assert!(filters.search_query.is_none());
    }
}

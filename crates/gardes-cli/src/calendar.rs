//! `calendar` command: text rendering of the day/week/month views.
//!
//! All three views run off one in-memory [`OnCallSchedule`] built from the
//! assignment rows covering the cursor's range.

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use gardes_core::calendar::{self, MonthGrid, ViewCursor, ViewMode};
use gardes_core::{DaySchedule, OnCallSchedule, Pharmacy, PharmacyFilters};
use gardes_db::PharmacyRow;

pub async fn run(mode: &str, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let mode: ViewMode = mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("parsing --mode")?;
    let date = date.unwrap_or_else(calendar::today);
    let cursor = ViewCursor::new(date, mode);
    let (from, to) = cursor.range();

    let pool = gardes_db::connect_pool_from_env()
        .await
        .context("connecting to database")?;
    let assignments = gardes_db::list_assignments_in_range(&pool, from, to)
        .await
        .context("querying on-call assignments")?;
    let schedule = OnCallSchedule::from_assignments(
        assignments.into_iter().map(|a| (a.on_date, a.pharmacy_id)),
    );

    match mode {
        ViewMode::Day => {
            let pharmacies = all_pharmacies(&pool).await?;
            let days = schedule.project(&pharmacies, cursor);
            println!("{}", format_weekday(date.weekday()));
            println!("{date}");
            match days.first() {
                Some(day) if !day.pharmacies.is_empty() => {
                    for pharmacy in &day.pharmacies {
                        println!("  {}  {}", pharmacy.name, pharmacy.address);
                    }
                }
                _ => println!("  aucune pharmacie de garde"),
            }
        }
        ViewMode::Week => {
            let pharmacies = all_pharmacies(&pool).await?;
            let days = schedule.project(&pharmacies, cursor);
            print!("{}", week_lines(&days, calendar::today()));
        }
        ViewMode::Month => {
            let covered = schedule.covered_dates(from, to);
            let grid = calendar::month_grid(date, calendar::today(), &covered);
            print!("{}", render_month_grid(&grid));
        }
    }

    Ok(())
}

async fn all_pharmacies(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Pharmacy>> {
    let rows = gardes_db::list_pharmacies(pool, &PharmacyFilters::default())
        .await
        .context("querying pharmacies")?;
    Ok(rows.into_iter().map(PharmacyRow::into_domain).collect())
}

fn format_weekday(weekday: chrono::Weekday) -> &'static str {
    match weekday {
        chrono::Weekday::Mon => "lundi",
        chrono::Weekday::Tue => "mardi",
        chrono::Weekday::Wed => "mercredi",
        chrono::Weekday::Thu => "jeudi",
        chrono::Weekday::Fri => "vendredi",
        chrono::Weekday::Sat => "samedi",
        chrono::Weekday::Sun => "dimanche",
    }
}

/// One line per projected day: today marker, date, weekday, count, names.
fn week_lines(days: &[DaySchedule], today: NaiveDate) -> String {
    let mut out = String::new();
    for day in days {
        let marker = if day.date == today { ">" } else { " " };
        let names = if day.pharmacies.is_empty() {
            String::new()
        } else {
            let joined = day
                .pharmacies
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("  ({joined})")
        };
        out.push_str(&format!(
            "{marker} {}  {}  {} pharmacie(s) de garde{names}\n",
            day.date,
            format_weekday(day.date.weekday()),
            day.pharmacies.len(),
        ));
    }
    out
}

/// Render the month grid as rows of 7 cells, Monday first.
///
/// Today is bracketed and days with on-call coverage carry a trailing `*`.
/// Blanks pad the leading partial week; the final row may end short.
fn render_month_grid(grid: &MonthGrid) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        format_month(grid.first.month()),
        grid.first.year()
    ));
    out.push_str(" Lu  Ma  Me  Je  Ve  Sa  Di\n");

    for (i, cell) in grid.cells.iter().enumerate() {
        match cell {
            None => out.push_str("    "),
            Some(cell) => {
                let day = cell.date.day();
                if cell.is_today {
                    out.push_str(&format!("[{day:2}]"));
                } else if cell.has_on_call {
                    out.push_str(&format!("{day:3}*"));
                } else {
                    out.push_str(&format!("{day:3} "));
                }
            }
        }
        if (i + 1) % 7 == 0 {
            out.push('\n');
        }
    }
    if grid.cells.len() % 7 != 0 {
        out.push('\n');
    }
    out
}

fn format_month(month: u32) -> &'static str {
    match month {
        1 => "janvier",
        2 => "février",
        3 => "mars",
        4 => "avril",
        5 => "mai",
        6 => "juin",
        7 => "juillet",
        8 => "août",
        9 => "septembre",
        10 => "octobre",
        11 => "novembre",
        _ => "décembre",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use gardes_core::OpeningHours;
    use uuid::Uuid;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    fn pharmacy(name: &str) -> Pharmacy {
        Pharmacy {
            id: Uuid::new_v4(),
            slug: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            address: "Quartier Pitoaré, Route de Kousséri".to_string(),
            phone: None,
            latitude: None,
            longitude: None,
            opening_hours: OpeningHours::default(),
            is_on_call: true,
            has_parking: false,
            is_pmr: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn week_lines_mark_today_and_list_assigned_names() {
        let p = pharmacy("Pharmacie du Nord");
        let mut schedule = OnCallSchedule::new();
        schedule.assign(d(2025, 11, 26), p.id);

        let cursor = ViewCursor::new(d(2025, 11, 28), ViewMode::Week);
        let days = schedule.project(&[p], cursor);
        let rendered = week_lines(&days, d(2025, 11, 28));

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 7);
        // Wednesday the 26th carries the assignment; Thursday stays empty.
        assert!(lines[2].contains("1 pharmacie(s) de garde"));
        assert!(lines[2].contains("Pharmacie du Nord"));
        assert!(lines[3].contains("0 pharmacie(s) de garde"));
        // Friday the 28th is today.
        assert!(lines[4].starts_with("> 2025-11-28"));
        assert!(lines[0].starts_with("  2025-11-24"));
    }

    #[test]
    fn render_november_2025_has_five_full_rows() {
        let covered: HashSet<NaiveDate> = [d(2025, 11, 5)].into();
        let grid = calendar::month_grid(d(2025, 11, 15), d(2025, 11, 28), &covered);
        let rendered = render_month_grid(&grid);

        let lines: Vec<&str> = rendered.lines().collect();
        // Title + weekday header + 35 cells / 7 per row.
        assert_eq!(lines.len(), 2 + 5);
        assert_eq!(lines[0], "novembre 2025");
        // Day 1 lands in the Saturday column of the first row.
        assert!(lines[2].contains("  1 "));
        // Markers: on-call star on the 5th, brackets around today.
        assert!(rendered.contains("5*"));
        assert!(rendered.contains("[28]"));
    }

    #[test]
    fn render_pads_trailing_partial_week() {
        // 2025-12 has 31 days and starts on Monday: 31 cells, last row partial.
        let grid = calendar::month_grid(d(2025, 12, 1), d(2025, 11, 28), &HashSet::new());
        let rendered = render_month_grid(&grid);
        assert!(rendered.ends_with('\n'));
        assert_eq!(rendered.lines().count(), 2 + 5);
    }
}

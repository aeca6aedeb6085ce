use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::hours::OpeningHours;
use crate::ConfigError;

/// One pharmacy entry in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct PharmacyConfig {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub opening_hours: OpeningHours,
    #[serde(default)]
    pub is_on_call: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub is_pmr: bool,
}

impl PharmacyConfig {
    /// Generate a URL-safe slug from the pharmacy name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' || c == '\'' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct PharmaciesFile {
    pub pharmacies: Vec<PharmacyConfig>,
}

/// Load and validate the pharmacies seed file from YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pharmacies(path: &Path) -> Result<PharmaciesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PharmaciesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: PharmaciesFile = serde_yaml::from_str(&content)?;

    validate_pharmacies(&file)?;

    Ok(file)
}

fn validate_pharmacies(file: &PharmaciesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for pharmacy in &file.pharmacies {
        if pharmacy.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pharmacy name must be non-empty".to_string(),
            ));
        }

        if pharmacy.address.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' has an empty address",
                pharmacy.name
            )));
        }

        if pharmacy.latitude.is_some() != pharmacy.longitude.is_some() {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' must provide both latitude and longitude or neither",
                pharmacy.name
            )));
        }

        if let (Some(lat), Some(lng)) = (pharmacy.latitude, pharmacy.longitude) {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(ConfigError::Validation(format!(
                    "pharmacy '{}' has out-of-range coordinates ({lat}, {lng})",
                    pharmacy.name
                )));
            }
        }

        let lower_name = pharmacy.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate pharmacy name: '{}'",
                pharmacy.name
            )));
        }

        let slug = pharmacy.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate pharmacy slug: '{slug}' (from pharmacy '{}')",
                pharmacy.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str) -> PharmacyConfig {
        PharmacyConfig {
            name: name.to_string(),
            address: "Avenue de la Réunification, Garoua".to_string(),
            phone: None,
            latitude: None,
            longitude: None,
            opening_hours: OpeningHours::default(),
            is_on_call: false,
            has_parking: false,
            is_pmr: false,
        }
    }

    #[test]
    fn slug_simple_name() {
        assert_eq!(config("Pharmacie du Nord").slug(), "pharmacie-du-nord");
    }

    #[test]
    fn slug_apostrophes_become_separators() {
        assert_eq!(
            config("Pharmacie de l'Espoir").slug(),
            "pharmacie-de-l-espoir"
        );
    }

    #[test]
    fn slug_collapses_repeated_separators() {
        assert_eq!(config("Pharmacie   du  Centre").slug(), "pharmacie-du-centre");
    }

    #[test]
    fn validate_rejects_empty_name() {
        let file = PharmaciesFile {
            pharmacies: vec![config("  ")],
        };
        assert!(matches!(
            validate_pharmacies(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let file = PharmaciesFile {
            pharmacies: vec![config("Pharmacie du Nord"), config("pharmacie du nord")],
        };
        assert!(matches!(
            validate_pharmacies(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_unpaired_coordinates() {
        let mut p = config("Pharmacie du Nord");
        p.latitude = Some(9.3017);
        let file = PharmaciesFile { pharmacies: vec![p] };
        assert!(matches!(
            validate_pharmacies(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_coordinates() {
        let mut p = config("Pharmacie du Nord");
        p.latitude = Some(99.0);
        p.longitude = Some(13.3921);
        let file = PharmaciesFile { pharmacies: vec![p] };
        assert!(matches!(
            validate_pharmacies(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_accepts_well_formed_entries() {
        let mut a = config("Pharmacie de l'Espoir");
        a.latitude = Some(9.3017);
        a.longitude = Some(13.3921);
        let file = PharmaciesFile {
            pharmacies: vec![a, config("Pharmacie du Nord")],
        };
        assert!(validate_pharmacies(&file).is_ok());
    }

    #[test]
    fn parses_yaml_document() {
        let yaml = r"
pharmacies:
  - name: Pharmacie de l'Espoir
    address: Dagopy, Avenue de la Réunification, Garoua
    phone: '+237 697 345 678'
    latitude: 9.3017
    longitude: 13.3921
    is_on_call: true
    has_parking: true
    opening_hours:
      monday: 08:00 - 20:00
      sunday: 24h/24
  - name: Pharmacie du Nord
    address: Quartier Pitoaré, Route de Kousséri
    is_pmr: true
";
        let file: PharmaciesFile = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(file.pharmacies.len(), 2);
        assert!(file.pharmacies[0].is_on_call);
        assert_eq!(
            file.pharmacies[0]
                .opening_hours
                .for_weekday(chrono::Weekday::Mon),
            Some("08:00 - 20:00")
        );
        assert!(validate_pharmacies(&file).is_ok());
    }
}

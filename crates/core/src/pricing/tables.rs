use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical state of the submitted item, each with a fixed price multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    New,
    #[serde(rename = "Used - Good")]
    UsedGood,
    #[serde(rename = "Used - Fair")]
    UsedFair,
    Damaged,
}

impl Condition {
    pub const ALL: [Condition; 4] = [Self::New, Self::UsedGood, Self::UsedFair, Self::Damaged];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::UsedGood => "Used - Good",
            Self::UsedFair => "Used - Fair",
            Self::Damaged => "Damaged",
        }
    }

    /// Accepts the form labels (`Used - Good`) as well as `used-good` / `used_good`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| if ch == '_' { '-' } else { ch })
            .collect();
        match normalized.as_str() {
            "new" => Some(Self::New),
            "used-good" => Some(Self::UsedGood),
            "used-fair" => Some(Self::UsedFair),
            "damaged" => Some(Self::Damaged),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PricingTablesError {
    #[error("could not read pricing tables `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse pricing tables `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("invalid pricing tables: {0}")]
    Invalid(String),
}

/// Immutable lookup tables driving the quote calculator.
///
/// Category keys are the display names shown to users (`"Mobile Phone"`). Only
/// `base_prices` decides whether a category is recognized; the bracket and brand
/// tables are optional per category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTables {
    pub base_prices: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub weight_brackets: BTreeMap<String, Vec<Decimal>>,
    #[serde(default)]
    pub brands: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub brand_multipliers: BTreeMap<String, Decimal>,
    #[serde(default = "default_condition_multipliers")]
    pub condition_multipliers: BTreeMap<Condition, Decimal>,
}

impl PricingTables {
    pub fn load(path: &Path) -> Result<Self, PricingTablesError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| PricingTablesError::ReadFile { path: path.to_path_buf(), source })?;
        let tables = toml::from_str::<Self>(&raw)
            .map_err(|source| PricingTablesError::ParseFile { path: path.to_path_buf(), source })?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn base_price(&self, category: &str) -> Option<Decimal> {
        self.base_prices.get(category).copied()
    }

    pub fn weight_brackets(&self, category: &str) -> Option<&[Decimal]> {
        self.weight_brackets.get(category).map(Vec::as_slice).filter(|list| !list.is_empty())
    }

    pub fn brands(&self, category: &str) -> Option<&[String]> {
        self.brands.get(category).map(Vec::as_slice).filter(|list| !list.is_empty())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.base_prices.keys().map(String::as_str)
    }

    /// Premium brands carry a multiplier; every other brand prices at 1.
    pub fn brand_multiplier(&self, brand: Option<&str>) -> Decimal {
        brand.and_then(|name| self.brand_multipliers.get(name).copied()).unwrap_or(Decimal::ONE)
    }

    pub fn condition_multiplier(&self, condition: Option<Condition>) -> Decimal {
        condition
            .and_then(|condition| self.condition_multipliers.get(&condition).copied())
            .unwrap_or(Decimal::ONE)
    }

    pub fn validate(&self) -> Result<(), PricingTablesError> {
        let negative_base = self.base_prices.iter().find(|(_, price)| price.is_sign_negative());
        if let Some((category, _)) = negative_base {
            return Err(PricingTablesError::Invalid(format!(
                "base price for `{category}` must not be negative"
            )));
        }

        for (category, brackets) in &self.weight_brackets {
            if !self.base_prices.contains_key(category) {
                return Err(PricingTablesError::Invalid(format!(
                    "weight brackets reference unknown category `{category}`"
                )));
            }
            if brackets.iter().any(|weight| *weight <= Decimal::ZERO) {
                return Err(PricingTablesError::Invalid(format!(
                    "weight brackets for `{category}` must be positive"
                )));
            }
        }

        if let Some(category) = self.brands.keys().find(|c| !self.base_prices.contains_key(*c)) {
            return Err(PricingTablesError::Invalid(format!(
                "brand list references unknown category `{category}`"
            )));
        }

        let negative_multiplier = self
            .brand_multipliers
            .values()
            .chain(self.condition_multipliers.values())
            .any(|multiplier| multiplier.is_sign_negative());
        if negative_multiplier {
            return Err(PricingTablesError::Invalid("multipliers must not be negative".to_owned()));
        }

        Ok(())
    }
}

impl Default for PricingTables {
    fn default() -> Self {
        let base_prices = [
            ("Refrigerator", 120),
            ("TV", 80),
            ("Washing Machine", 100),
            ("Microwave", 90),
            ("Laptop", 350),
            ("Desktop", 200),
            ("Monitor", 150),
            ("Mobile Phone", 500),
            ("Chargers", 20),
            ("Headphones", 30),
            ("Batteries", 10),
            ("Circuit Boards", 10),
            ("Cables & Wires", 20),
        ]
        .into_iter()
        .map(|(category, price)| (category.to_owned(), Decimal::from(price)))
        .collect();

        let whole = |values: [i64; 5]| values.into_iter().map(Decimal::from).collect::<Vec<_>>();
        let weight_brackets = [
            ("Refrigerator", whole([50, 75, 100, 150, 200])),
            ("TV", whole([5, 10, 20, 30, 50])),
            ("Washing Machine", whole([30, 50, 70, 100, 120])),
            ("Microwave", whole([10, 20, 30, 40, 50])),
            ("Laptop", whole([1, 2, 3, 4, 5])),
            ("Desktop", whole([5, 10, 15, 20, 25])),
            ("Monitor", whole([2, 5, 7, 10, 15])),
            (
                "Mobile Phone",
                vec![
                    Decimal::new(5, 1),
                    Decimal::new(75, 2),
                    Decimal::ONE,
                    Decimal::new(125, 2),
                    Decimal::new(15, 1),
                ],
            ),
        ]
        .into_iter()
        .map(|(category, brackets)| (category.to_owned(), brackets))
        .collect();

        let brand_lists: [(&str, &[&str]); 13] = [
            (
                "Refrigerator",
                &[
                    "LG",
                    "Samsung",
                    "Whirlpool",
                    "Godrej",
                    "Haier",
                    "Panasonic",
                    "Voltas",
                    "Bosch",
                    "Electrolux",
                    "Other",
                ],
            ),
            (
                "TV",
                &["Sony", "Samsung", "LG", "TCL", "Panasonic", "Philips", "Hisense", "Vizio", "Other"],
            ),
            (
                "Washing Machine",
                &["Bosch", "IFB", "Samsung", "LG", "Whirlpool", "Panasonic", "Haier", "Godrej", "Other"],
            ),
            (
                "Microwave",
                &["Panasonic", "Samsung", "LG", "IFB", "Whirlpool", "Bosch", "Morphy Richards", "Other"],
            ),
            (
                "Laptop",
                &[
                    "Dell", "HP", "Lenovo", "Apple", "Asus", "Acer", "MSI", "Samsung", "Microsoft",
                    "Other",
                ],
            ),
            (
                "Desktop",
                &["Dell", "HP", "Lenovo", "Apple", "Acer", "Asus", "MSI", "CyberPowerPC", "Other"],
            ),
            ("Monitor", &["Dell", "HP", "Lenovo", "Samsung", "LG", "Acer", "Asus", "BenQ", "Other"]),
            (
                "Mobile Phone",
                &[
                    "Apple", "Samsung", "OnePlus", "Xiaomi", "Oppo", "Vivo", "Realme", "Google",
                    "Motorola", "Other",
                ],
            ),
            ("Chargers", &["Apple", "Samsung", "OnePlus", "Xiaomi", "Anker", "Belkin", "Sony", "Other"]),
            (
                "Headphones",
                &["Bose", "Sony", "JBL", "Sennheiser", "Beats", "Boat", "Skullcandy", "Other"],
            ),
            ("Batteries", &["Exide", "Duracell", "Amaron", "Eveready", "Luminous", "Other"]),
            ("Circuit Boards", &["Intel", "AMD", "Nvidia", "Asus", "MSI", "Gigabyte", "Other"]),
            ("Cables & Wires", &["Belkin", "Zebronics", "Boat", "AmazonBasics", "Sony", "Other"]),
        ];
        let brands = brand_lists
            .into_iter()
            .map(|(category, names)| {
                (category.to_owned(), names.iter().map(|name| (*name).to_owned()).collect())
            })
            .collect();

        let brand_multipliers = [
            ("Apple", Decimal::new(13, 1)),
            ("Samsung", Decimal::new(12, 1)),
            ("LG", Decimal::new(11, 1)),
            ("Sony", Decimal::new(13, 1)),
            ("Dell", Decimal::new(12, 1)),
            ("HP", Decimal::new(11, 1)),
            ("Intel", Decimal::new(12, 1)),
            ("AMD", Decimal::new(11, 1)),
        ]
        .into_iter()
        .map(|(brand, multiplier)| (brand.to_owned(), multiplier))
        .collect();

        Self {
            base_prices,
            weight_brackets,
            brands,
            brand_multipliers,
            condition_multipliers: default_condition_multipliers(),
        }
    }
}

fn default_condition_multipliers() -> BTreeMap<Condition, Decimal> {
    BTreeMap::from([
        (Condition::New, Decimal::new(15, 1)),
        (Condition::UsedGood, Decimal::ONE),
        (Condition::UsedFair, Decimal::new(7, 1)),
        (Condition::Damaged, Decimal::new(4, 1)),
    ])
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{Condition, PricingTables, PricingTablesError};

    #[test]
    fn condition_parse_accepts_labels_and_compact_forms() {
        for condition in Condition::ALL {
            assert_eq!(Condition::parse(condition.as_str()), Some(condition));
        }
        assert_eq!(Condition::parse("Used-Fair"), Some(Condition::UsedFair));
        assert_eq!(Condition::parse("used_good"), Some(Condition::UsedGood));
        assert_eq!(Condition::parse("broken"), None);
    }

    #[test]
    fn default_tables_cover_every_form_category() {
        let tables = PricingTables::default();
        assert_eq!(tables.categories().count(), 13);
        assert_eq!(tables.base_price("Laptop"), Some(Decimal::from(350)));
        assert!(tables.weight_brackets("Chargers").is_none());
        assert_eq!(tables.weight_brackets("Mobile Phone").map(<[Decimal]>::len), Some(5));
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn unknown_brand_and_missing_condition_price_at_one() {
        let tables = PricingTables::default();
        assert_eq!(tables.brand_multiplier(Some("Generic")), Decimal::ONE);
        assert_eq!(tables.brand_multiplier(None), Decimal::ONE);
        assert_eq!(tables.brand_multiplier(Some("Apple")), Decimal::new(13, 1));
        assert_eq!(tables.condition_multiplier(None), Decimal::ONE);
        assert_eq!(tables.condition_multiplier(Some(Condition::Damaged)), Decimal::new(4, 1));
    }

    #[test]
    fn tables_load_from_toml_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("pricing.toml");
        fs::write(
            &path,
            r#"
[base_prices]
"Solar Panel" = 40

[weight_brackets]
"Solar Panel" = [10, 20]

[brand_multipliers]
Tata = "1.4"
"#,
        )
        .expect("write tables");

        let tables = PricingTables::load(&path).expect("load tables");
        assert_eq!(tables.base_price("Solar Panel"), Some(Decimal::from(40)));
        assert_eq!(tables.brand_multiplier(Some("Tata")), Decimal::new(14, 1));
        assert_eq!(
            tables.condition_multiplier(Some(Condition::New)),
            Decimal::new(15, 1),
            "condition table falls back to defaults"
        );
    }

    #[test]
    fn tables_reject_brackets_for_unpriced_category() {
        let mut tables = PricingTables::default();
        tables.weight_brackets.insert("Toaster".to_owned(), vec![Decimal::ONE]);

        let error = tables.validate().expect_err("unknown category must be rejected");
        assert!(matches!(error, PricingTablesError::Invalid(ref message) if message.contains("Toaster")));
    }
}

//! Synthetic user records.
//!
//! Each field of a record is generated from its own named child of the
//! record's node, and each array element from its own indexed child. Changing
//! one field's generator leaves every other field's values unchanged.

use crate::config::DatasetConfig;
use crate::gen::Gen;
use crate::generators::*;
use anyhow::Result;
use chrono::{Days, NaiveDate};
use nested_random::NestedRandom;
use serde::Serialize;
use uuid::Uuid;

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub signup_date: NaiveDate,
    pub tags: Vec<String>,
    pub addresses: Vec<Address>,
}

/// Generator for [`Address`] values.
pub struct AddressGenerator {
    house_number: Uniform<u32>,
    street: OneOf<&'static str>,
    city: OneOf<&'static str>,
    zip: Uniform<u32>,
}

impl AddressGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            house_number: uniform(1..2000),
            street: one_of(STREETS.to_vec())?,
            city: one_of(CITIES.to_vec())?,
            zip: uniform(10000..100000),
        })
    }
}

impl Gen<Address> for AddressGenerator {
    fn generate(&self, node: &NestedRandom) -> Address {
        let street = format!(
            "{} {}",
            self.house_number.generate(&node.key("street").key("number")),
            self.street.generate(&node.key("street").key("name"))
        );
        Address {
            street,
            city: self.city.generate(&node.key("city")).to_string(),
            zip: format!("{:05}", self.zip.generate(&node.key("zip"))),
        }
    }
}

/// Generator for [`User`] records.
pub struct UserGenerator {
    first_name: OneOf<&'static str>,
    last_name: OneOf<&'static str>,
    email_domain: WeightedChoice<&'static str>,
    email_suffix: Optional<Uniform<u32>, u32>,
    age: Uniform<u32>,
    start_date: NaiveDate,
    signup_offset: Uniform<u64>,
    tags: ArrayOf<Uniform<usize>, OneOf<&'static str>, &'static str>,
    addresses: ArrayOf<Uniform<usize>, AddressGenerator, Address>,
}

impl UserGenerator {
    /// Build the generator; fails if `config` does not validate.
    pub fn new(config: &DatasetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            first_name: one_of(FIRST_NAMES.to_vec())?,
            last_name: one_of(LAST_NAMES.to_vec())?,
            email_domain: weighted_choice(vec![
                ("gmail.com", 0.40),
                ("outlook.com", 0.20),
                ("yahoo.com", 0.15),
                ("icloud.com", 0.10),
                ("example.org", 0.15),
            ])?,
            email_suffix: optional(uniform(1..100), 0.6),
            age: uniform(18..90),
            start_date: config.start_date,
            signup_offset: uniform(0..u64::from(config.days)),
            tags: array_of(uniform(0..config.max_tags + 1), one_of(TAGS.to_vec())?),
            addresses: array_of(
                uniform(0..config.max_addresses + 1),
                AddressGenerator::new()?,
            ),
        })
    }
}

impl Gen<User> for UserGenerator {
    fn generate(&self, node: &NestedRandom) -> User {
        let first = self.first_name.generate(&node.key("name").key("first"));
        let last = self.last_name.generate(&node.key("name").key("last"));

        let email_node = node.key("email");
        let local = match self.email_suffix.generate(&email_node.key("suffix")) {
            Some(n) => format!("{}.{}{}", first, last, n),
            None => format!("{}.{}", first, last),
        };
        let email = format!(
            "{}@{}",
            local.to_lowercase(),
            self.email_domain.generate(&email_node.key("domain"))
        );

        let offset = self.signup_offset.generate(&node.key("signup_date"));
        // In range: `validate` checked `start_date + days` and offset < days.
        let signup_date = self.start_date + Days::new(offset);

        User {
            id: uuid_gen().generate(&node.key("id")),
            name: format!("{} {}", first, last),
            email,
            age: self.age.generate(&node.key("age")),
            signup_date,
            tags: self
                .tags
                .generate(&node.key("tags"))
                .into_iter()
                .map(str::to_string)
                .collect(),
            addresses: self.addresses.generate(&node.key("addresses")),
        }
    }
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Brian", "Carmen", "Chen", "Dana", "Dmitri", "Elena", "Emeka",
    "Fatima", "Felix", "Grace", "Hiro", "Ines", "Jonas", "Kavya", "Liam", "Maya", "Nadia",
    "Omar", "Priya", "Quinn", "Rosa", "Sven", "Tariq", "Uma", "Victor", "Wen", "Yara",
];

const LAST_NAMES: &[&str] = &[
    "Andersen", "Baker", "Costa", "Dubois", "Eze", "Fischer", "Garcia", "Hughes", "Ito",
    "Jensen", "Kowalski", "Lopez", "Murphy", "Nakamura", "Okafor", "Patel", "Quist", "Rossi",
    "Schmidt", "Tanaka", "Usman", "Varga", "Walsh", "Xu", "Yilmaz", "Zhang",
];

const TAGS: &[&str] = &[
    "new", "vip", "churn_risk", "newsletter", "beta", "mobile", "referral", "trial",
    "enterprise", "student",
];

const STREETS: &[&str] = &[
    "Main St", "Oak Ave", "Maple Dr", "Cedar Ln", "Elm St", "Pine Rd", "Lake View",
    "Hill Crest", "River Rd", "Park Pl",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Fairview", "Greenville", "Madison", "Georgetown", "Salem",
    "Franklin", "Clinton", "Arlington",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> UserGenerator {
        UserGenerator::new(&DatasetConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DatasetConfig {
            max_tags: usize::MAX,
            ..Default::default()
        };
        assert!(UserGenerator::new(&config).is_err());

        let config = DatasetConfig {
            start_date: NaiveDate::MAX,
            ..Default::default()
        };
        assert!(UserGenerator::new(&config).is_err());
    }

    #[test]
    fn test_same_node_same_user() {
        let gen = generator();
        let a = gen.generate(&NestedRandom::root(0).key("users").index(5));
        let b = gen.generate(&NestedRandom::root(0).key("users").index(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_neighbouring_users_differ() {
        let gen = generator();
        let users = NestedRandom::root(0).key("users");
        assert_ne!(gen.generate(&users.index(0)).id, gen.generate(&users.index(1)).id);
    }

    #[test]
    fn test_fields_within_bounds() {
        let config = DatasetConfig::default();
        let gen = generator();
        for node in NestedRandom::root(3).key("users").children().take(200) {
            let user = gen.generate(&node);
            assert!((18..90).contains(&user.age));
            assert!(user.tags.len() <= config.max_tags);
            assert!(user.addresses.len() <= config.max_addresses);
            assert!(user.signup_date >= config.start_date);
            assert!(user.signup_date < config.start_date + Days::new(u64::from(config.days)));
            assert!(user.email.contains('@'));
            assert!(user.addresses.iter().all(|a| a.zip.len() == 5));
        }
    }

    #[test]
    fn test_field_depends_only_on_its_path() {
        // Loosening the tag bound must not change any other field.
        let narrow = generator();
        let wide = UserGenerator::new(&DatasetConfig {
            max_tags: 9,
            ..Default::default()
        })
        .unwrap();
        let node = NestedRandom::root(8).key("users").index(42);
        let a = narrow.generate(&node);
        let b = wide.generate(&node);
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.email, b.email);
        assert_eq!(a.addresses, b.addresses);
    }

    #[test]
    fn test_user_serializes_to_json() {
        let user = generator().generate(&NestedRandom::root(0).key("users").index(0));
        let value = serde_json::to_value(&user).unwrap();
        assert!(value["id"].is_string());
        assert!(value["signup_date"].as_str().unwrap().starts_with("20"));
        assert!(value["tags"].is_array());
    }
}

//! Deterministic client name generation for sample data.

use crate::rng::SampleRng;

pub struct NameGenerator;

impl NameGenerator {
    pub fn full_name(rng: &mut SampleRng) -> String {
        format!("{} {}", Self::pick(rng, FIRST_NAMES), Self::pick(rng, LAST_NAMES))
    }

    /// `first.last<n>@<domain>`, lowercased.
    pub fn email_for(full_name: &str, rng: &mut SampleRng) -> String {
        let handle = full_name.to_lowercase().replace(' ', ".");
        let suffix = rng.next_u64_below(100);
        format!("{handle}{suffix}@{}", Self::pick(rng, DOMAINS))
    }

    fn pick(rng: &mut SampleRng, list: &[&'static str]) -> &'static str {
        list[rng.next_u64_below(list.len() as u64) as usize]
    }
}

const FIRST_NAMES: &[&str] = &[
    "Avery", "Bianca", "Caleb", "Dana", "Elias", "Farah", "Gabriel", "Hana",
    "Isaac", "Jolene", "Kenji", "Lucia", "Marcus", "Nadia", "Oscar", "Priya",
    "Quinn", "Rosa", "Samuel", "Tamsin", "Umar", "Valeria", "Wesley", "Ximena",
    "Yusuf", "Zara", "Aaron", "Beatriz", "Connor", "Delphine", "Emeka", "Freya",
];

const LAST_NAMES: &[&str] = &[
    "Abernathy", "Baptiste", "Castillo", "Donovan", "Eriksen", "Fontaine",
    "Greenberg", "Haddad", "Ishikawa", "Jovanovic", "Kowalski", "Lindqvist",
    "Moreau", "Nakamura", "Okafor", "Petrov", "Quintero", "Ramirez",
    "Sorensen", "Takahashi", "Uchenna", "Vasquez", "Whitfield", "Yilmaz",
];

const DOMAINS: &[&str] = &["example.com", "mail.test", "inbox.test"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StreamSlot;

    #[test]
    fn names_are_deterministic() {
        let mut a = SampleRng::new(12345, StreamSlot::Client);
        let mut b = SampleRng::new(12345, StreamSlot::Client);
        assert_eq!(NameGenerator::full_name(&mut a), NameGenerator::full_name(&mut b));
    }

    #[test]
    fn email_is_derived_from_name() {
        let mut rng = SampleRng::new(9, StreamSlot::Client);
        let email = NameGenerator::email_for("Rosa Moreau", &mut rng);
        assert!(email.starts_with("rosa.moreau"), "{email}");
        assert!(email.contains('@'));
    }
}

//! Simulated caller directory.
//!
//! Stands in for a CRM lookup: fabricates a display name for a caller
//! number. A real deployment would query a directory service here.

use rand::seq::SliceRandom;

const FIRST_NAMES: &[&str] = &[
    "Frances", "Dennis", "John", "Peter", "Lucy", "Marie", "Dominic", "Lea", "Grace", "Victor",
];

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Thomas", "Petit", "Robert", "Richard", "Durand", "Dubois", "Moreau",
    "Laurent",
];

/// Resolve a display name for a caller number. The number is ignored by the
/// simulation.
pub fn caller_name(_caller_number: &str) -> String {
    let mut rng = rand::thread_rng();
    let first = FIRST_NAMES.choose(&mut rng).unwrap_or(&"Unknown");
    let last = LAST_NAMES.choose(&mut rng).unwrap_or(&"Caller");
    format!("{} {}", first, last.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_name_is_first_plus_uppercased_last() {
        let name = caller_name("+15550100");
        let (first, last) = name.split_once(' ').expect("two parts");
        assert!(FIRST_NAMES.contains(&first));
        assert!(LAST_NAMES.iter().any(|l| l.to_uppercase() == last));
    }
}

//! `konan-config check`: validate property references.

use anyhow::{bail, Result};
use konan_properties::PropertyStore;

pub fn run(store: &PropertyStore) -> Result<()> {
    let issues = match store.check_references() {
        Ok(()) => {
            println!("{} properties, no reference problems", store.len());
            return Ok(());
        }
        Err(issues) => issues,
    };

    let mut errors = 0;
    for issue in &issues {
        println!("{}: {}", issue.severity, issue.message);
        if issue.severity == "error" {
            errors += 1;
        }
    }
    if errors > 0 {
        bail!("{errors} reference error(s) found");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_store_passes() {
        let store = PropertyStore::parse("a = 1\nb = $a\n").unwrap();
        assert!(run(&store).is_ok());
    }

    #[test]
    fn dangling_reference_is_only_a_warning() {
        let store = PropertyStore::parse("a = $missing\n").unwrap();
        assert!(run(&store).is_ok());
    }

    #[test]
    fn cycle_fails() {
        let store = PropertyStore::parse("a = $b\nb = $a\n").unwrap();
        let err = run(&store).unwrap_err();
        assert_eq!(err.to_string(), "1 reference error(s) found");
    }
}

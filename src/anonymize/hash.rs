//! One-way hashing of identifying attributes.

use sha2::{Digest, Sha256};

use crate::scope::{AttributeValue, Attributes};

use super::substitution::SubstitutionTable;

/// Lowercase hex SHA-256 of `text`.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Replace the values of `keys` with their digests. Other keys, and
/// non-string values, pass through unchanged.
pub fn hash(attributes: &mut Attributes, keys: &[&str], table: &SubstitutionTable) {
    for key in keys {
        let Some(value) = attributes.get_mut(*key) else {
            continue;
        };
        match value {
            AttributeValue::String(s) => *s = table.digest(s),
            AttributeValue::Strings(items) => {
                for item in items.iter_mut() {
                    *item = table.digest(item);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_only_listed_keys() {
        let table = SubstitutionTable::new();
        let mut attributes = Attributes::new();
        attributes.insert("installer".into(), AttributeValue::String("my-app".into()));
        attributes.insert("package".into(), AttributeValue::String("ui".into()));
        attributes.insert(
            "names".into(),
            AttributeValue::Strings(vec!["a".into(), "b".into()]),
        );
        attributes.insert("count".into(), AttributeValue::Number(3.0));

        hash(&mut attributes, &["installer", "names", "count", "absent"], &table);

        assert_eq!(
            attributes["installer"],
            AttributeValue::String(sha256_hex("my-app"))
        );
        assert_eq!(attributes["package"], AttributeValue::String("ui".into()));
        assert_eq!(
            attributes["names"],
            AttributeValue::Strings(vec![sha256_hex("a"), sha256_hex("b")])
        );
        assert_eq!(attributes["count"], AttributeValue::Number(3.0));
    }
}

//! Deterministic, content-derived identifiers for exported records.
//!
//! Identifiers are name-based (version 3) UUIDs over a normalised path string, so exporting the
//! same logical record twice always yields the same identifier.
use uuid::Uuid;

/// Tag used when deriving process identifiers.
///
/// Kept stable so identifiers match previously published archives.
pub const PROCESS_ID_TAG: &str = "ModelType.PROCESS";

/// Tag used as the root of category paths
pub const CATEGORY_ROOT_TAG: &str = "PROCESS";

/// Tag used when deriving the identifiers of product flows
pub const FLOW_ID_TAG: &str = "ModelType.FLOW";

/// Derive an identifier from a sequence of path parts.
///
/// Each part is trimmed, the parts are joined with `/` and the result is lower-cased before
/// hashing.
pub fn content_id<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = parts
        .into_iter()
        .map(|part| part.as_ref().trim().to_string())
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase();

    Uuid::new_v3(&Uuid::NAMESPACE_OID, path.as_bytes()).to_string()
}

/// Path segment hashed in place of a missing category
const NO_CATEGORY: &str = "none";

/// The identifier of a process with the given category path and name.
///
/// An uncategorised process hashes the segment `none` where its category would go.
pub fn process_id(category: Option<&str>, name: &str) -> String {
    content_id([PROCESS_ID_TAG, category.unwrap_or(NO_CATEGORY), name])
}

/// The identifier of the product flow produced by the named process
pub fn product_flow_id(name: &str) -> String {
    content_id([FLOW_ID_TAG, name])
}

/// The identifier of the category at the end of the given path prefix
pub fn category_id<S: AsRef<str>>(path_prefix: &[S]) -> String {
    content_id(std::iter::once(CATEGORY_ROOT_TAG).chain(path_prefix.iter().map(AsRef::as_ref)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn content_id_matches_name_based_uuid() {
        let expected = Uuid::new_v3(&Uuid::NAMESPACE_OID, b"process/a b").to_string();
        assert_eq!(content_id(["PROCESS", " A B "]), expected);
    }

    #[rstest]
    #[case(["Coal", "Mining"], ["coal ", " MINING"])]
    #[case(["22: Utilities", "x"], ["22: utilities", "X"])]
    fn content_id_normalises_parts(#[case] a: [&str; 2], #[case] b: [&str; 2]) {
        assert_eq!(content_id(a), content_id(b));
    }

    #[test]
    fn process_id_is_deterministic() {
        let a = process_id(Some("22: Utilities/Electricity"), "Electricity - COAL");
        let b = process_id(Some("22: Utilities/Electricity"), "Electricity - COAL");
        assert_eq!(a, b);
        assert_ne!(a, process_id(Some("22: Utilities"), "Electricity - COAL"));
        assert_ne!(a, process_id(None, "Electricity - COAL"));
    }

    #[test]
    fn process_id_without_category() {
        let expected = Uuid::new_v3(
            &Uuid::NAMESPACE_OID,
            b"modeltype.process/none/electricity - coal",
        )
        .to_string();
        assert_eq!(process_id(None, "Electricity - COAL"), expected);
        assert_ne!(process_id(Some(""), "Electricity - COAL"), expected);
    }

    #[test]
    fn category_id_depends_on_full_prefix() {
        assert_ne!(category_id(&["a", "b"]), category_id(&["b"]));
        assert_eq!(category_id(&["a", "b "]), category_id(&["A", "b"]));
    }
}

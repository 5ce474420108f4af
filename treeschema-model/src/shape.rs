//! Shape matching (§4.E). A schema shape may use `-1` to mean "any extent
//! at this dimension"; actual shapes are always non-negative.

/// A schema-declared shape; `-1` entries are wildcards.
pub type SchemaShape = Vec<i64>;

/// An actual shape read from a tree node; always non-negative.
pub type ActualShape = Vec<u64>;

/// The wildcard dimension value used in a [`SchemaShape`].
pub const WILDCARD: i64 = -1;

/// Compares a declared shape against an actual shape (§4.E).
///
/// Ranks must match exactly; each dimension must match exactly or be the
/// wildcard. A schema shape of `[]` (rank 0) matches only a scalar dataset.
pub fn shape_matches(schema: &SchemaShape, actual: &ActualShape) -> bool {
    if schema.len() != actual.len() {
        return false;
    }
    schema
        .iter()
        .zip(actual.iter())
        .all(|(&s, &a)| s == WILDCARD || s == a as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_shape_matches_exact_actual() {
        assert!(shape_matches(&vec![100, 50], &vec![100, 50]));
        assert!(!shape_matches(&vec![100, 3], &vec![100, 50]));
    }

    #[test]
    fn wildcard_dimension_matches_any_extent() {
        assert!(shape_matches(&vec![-1, -1], &vec![7, 0]));
        assert!(shape_matches(&vec![-1], &vec![0]));
    }

    #[test]
    fn rank_zero_schema_matches_only_scalar() {
        assert!(shape_matches(&vec![], &vec![]));
        assert!(!shape_matches(&vec![], &vec![1]));
    }

    #[test]
    fn rank_mismatch_never_matches() {
        assert!(!shape_matches(&vec![-1], &vec![1, 2]));
    }

    #[test]
    fn zero_actual_dimension_only_matches_zero_or_wildcard() {
        assert!(shape_matches(&vec![0], &vec![0]));
        assert!(shape_matches(&vec![-1], &vec![0]));
        assert!(!shape_matches(&vec![5], &vec![0]));
    }
}

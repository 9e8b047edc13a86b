//! Folding of flat pragma rows into grouped records.
//!
//! The introspection queries return one row per (group, member) pair, sorted
//! by group key and then by member sequence. Because the sort makes every
//! group contiguous, a single pass that compares each row against the group
//! currently being built is enough.

/// Folds rows sorted by group key into one record per group.
///
/// `same_group` decides whether a row belongs to the last record, `start`
/// builds a new record from the first row of a group, and `append` adds the
/// row's members to the current record. Groups that are not contiguous in
/// `rows` produce separate records.
pub(crate) fn fold_contiguous<R, G>(
    rows: impl IntoIterator<Item = R>,
    same_group: impl Fn(&G, &R) -> bool,
    start: impl Fn(&R) -> G,
    append: impl Fn(&mut G, R),
) -> Vec<G> {
    let mut groups: Vec<G> = Vec::new();

    for row in rows {
        match groups.last_mut() {
            Some(group) if same_group(group, &row) => append(group, row),
            _ => {
                let mut group = start(&row);
                append(&mut group, row);
                groups.push(group);
            }
        }
    }

    groups
}

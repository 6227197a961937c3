use itertools::Itertools;

use crate::field::{FieldId, FieldStore, MAX_FIELD_LEN};

/// Upper bound on a rendered status line. A field can only widen past its
/// byte cap through lossy utf8 replacement characters, and the final
/// truncation below covers that case.
pub const MAX_STATUS_LEN: usize = FieldId::COUNT * (MAX_FIELD_LEN + 1) + 2;

/// Format every field, in declaration order, into the one status line:
/// `[F0 |F1 | ... |F9]`.
pub fn format_status(store: &FieldStore) -> String {
    let mut line =
        format!("[{}]", FieldId::ALL.iter().map(|&id| String::from_utf8_lossy(store.read(id).content())).join(" |"));
    if line.len() > MAX_STATUS_LEN {
        let mut cut = MAX_STATUS_LEN;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
    }
    line
}

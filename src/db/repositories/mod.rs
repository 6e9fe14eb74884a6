pub mod lead;
pub mod login_token;
pub mod settings;
pub mod testimonial;
pub mod user;
pub mod vehicle;

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};

const LIKE_ESCAPE: char = '\\';

/// Escapes `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring match that behaves the same on SQLite and Postgres.
pub(crate) fn contains_ci(column: impl ColumnTrait, needle: &str) -> SimpleExpr {
    let needle = escape_like(&needle.trim().to_lowercase());
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(format!("%{needle}%")).escape(LIKE_ESCAPE))
}

pub(crate) fn equals_ci(column: impl ColumnTrait, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).eq(value.trim().to_lowercase())
}

pub(crate) fn page_count(total: u64, per_page: u64) -> u64 {
    if per_page == 0 { 0 } else { total.div_ceil(per_page) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plug_in"), "plug\\_in");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("golf"), "golf");
    }
}

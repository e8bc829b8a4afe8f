//! Pagination rewriting for SELECT statements.
//!
//! Takes an arbitrary SELECT plus a requested window and produces an
//! executable statement with literal LIMIT/OFFSET clauses, the adjusted
//! bind-parameter list, and a count-query derivative whose result is
//! invariant to the window.
//!
//! The correctness-critical part is placeholder alignment: when a
//! `LIMIT ?` or `OFFSET ?` placeholder is substituted with a literal, the
//! matching entry must be removed from the parameter list at the ordinal
//! position of that placeholder, counted over `?` occurrences that are
//! actual placeholders. The scanner skips string literals, quoted
//! identifiers, and comments, so a `?` inside `'who?'` never shifts the
//! alignment, and only top-level (paren depth 0) LIMIT/OFFSET clauses are
//! touched.

use crate::error::{GatewayError, GatewayResult};
use crate::models::QueryParam;

/// A SELECT statement rewritten for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
    /// Statement with literal LIMIT/OFFSET, ready to execute
    pub exec_sql: String,
    /// Parameters remaining after placeholder substitution
    pub exec_params: Vec<QueryParam>,
    /// Count derivative with pagination clauses stripped
    pub count_sql: String,
    /// Parameters for the count query
    pub count_params: Vec<QueryParam>,
}

/// One scanned position in the SQL text that lies outside literals.
#[derive(Debug, Clone, Copy)]
struct CodePos {
    byte: usize,
    ch: char,
    depth: u32,
}

/// Scan SQL and return every character position outside string literals,
/// backtick identifiers, and comments, annotated with paren depth.
fn scan_code_positions(sql: &str) -> Vec<CodePos> {
    #[derive(PartialEq)]
    enum State {
        Code,
        Single,
        Double,
        Backtick,
        LineComment,
        BlockComment,
    }

    let mut out = Vec::with_capacity(sql.len());
    let mut state = State::Code;
    let mut depth: u32 = 0;
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match state {
            State::Code => match c {
                '\'' => state = State::Single,
                '"' => state = State::Double,
                '`' => state = State::Backtick,
                '-' if matches!(chars.peek(), Some((_, '-'))) => state = State::LineComment,
                '/' if matches!(chars.peek(), Some((_, '*'))) => state = State::BlockComment,
                _ => {
                    if c == '(' {
                        depth += 1;
                    }
                    if c == ')' {
                        depth = depth.saturating_sub(1);
                    }
                    out.push(CodePos {
                        byte: i,
                        ch: c,
                        depth,
                    });
                    continue;
                }
            },
            State::Single => match c {
                '\\' => {
                    chars.next();
                }
                '\'' => state = State::Code,
                _ => {}
            },
            State::Double => match c {
                '\\' => {
                    chars.next();
                }
                '"' => state = State::Code,
                _ => {}
            },
            State::Backtick => {
                if c == '`' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }

    out
}

/// Placeholder ordinal of the `?` at `byte_pos`: how many placeholders
/// precede it in the statement.
fn placeholder_ordinal(positions: &[CodePos], byte_pos: usize) -> usize {
    positions
        .iter()
        .filter(|p| p.ch == '?' && p.byte < byte_pos)
        .count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Find a top-level keyword occurrence (word-boundary, case-insensitive,
/// outside literals, paren depth 0) starting the search at code-position
/// index `from`. Returns the index into `positions` of the keyword start.
fn find_keyword(positions: &[CodePos], keyword: &str, from: usize) -> Option<usize> {
    let kw: Vec<char> = keyword.chars().collect();
    let mut i = from;
    while i + kw.len() <= positions.len() {
        let candidate = &positions[i..i + kw.len()];
        let matches = candidate
            .iter()
            .zip(&kw)
            .all(|(p, k)| p.depth == 0 && p.ch.eq_ignore_ascii_case(k));
        if matches {
            // Word boundaries: the scan drops literal content, so adjacent
            // code positions are the right neighbourhood to check.
            let before_ok = i == 0 || !is_word_char(positions[i - 1].ch);
            let after_ok = i + kw.len() == positions.len()
                || !is_word_char(positions[i + kw.len()].ch);
            if before_ok && after_ok {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Find `<keyword> ?` with only whitespace between keyword and placeholder.
/// Returns (keyword position index, placeholder position index).
fn find_keyword_placeholder(positions: &[CodePos], keyword: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(kw_idx) = find_keyword(positions, keyword, from) {
        let mut j = kw_idx + keyword.len();
        while j < positions.len() && positions[j].ch.is_whitespace() {
            j += 1;
        }
        if j < positions.len() && positions[j].ch == '?' {
            return Some((kw_idx, j));
        }
        from = kw_idx + 1;
    }
    None
}

/// Rewrite `sql` so the requested window is expressed as literal clauses.
///
/// Applies, in order: placeholder-bound `LIMIT ?` substitution, `LIMIT`
/// append when no limit clause exists, placeholder-bound `OFFSET ?`
/// substitution, `OFFSET` append when a limit clause is present without
/// one. Pre-existing literal clauses are left untouched and never
/// duplicated. The count derivative strips the top-level LIMIT/OFFSET
/// tail from the original statement and wraps anything that is not
/// already a `SELECT COUNT` in a counting subquery.
pub fn paginate(
    sql: &str,
    params: &[QueryParam],
    limit: u64,
    offset: u64,
) -> GatewayResult<Paginated> {
    if limit == 0 {
        return Err(GatewayError::validation("limit must be greater than zero"));
    }

    // A trailing semicolon would end up in front of an appended clause.
    let sql = sql.trim().trim_end_matches(';').trim_end();
    if sql.is_empty() {
        return Err(GatewayError::validation("SQL statement must not be empty"));
    }

    let positions = scan_code_positions(sql);

    let placeholder_count = positions.iter().filter(|p| p.ch == '?').count();
    if placeholder_count != params.len() {
        return Err(GatewayError::validation(format!(
            "statement has {} placeholders but {} parameters were provided",
            placeholder_count,
            params.len()
        )));
    }

    // Replacements as (byte_start, byte_end, text), collected before any
    // text is touched so all spans refer to the original statement.
    let mut replacements: Vec<(usize, usize, String)> = Vec::new();
    let mut consumed_ordinals: Vec<usize> = Vec::new();

    let limit_placeholder = find_keyword_placeholder(&positions, "limit");
    let has_limit_clause = find_keyword(&positions, "limit", 0).is_some();
    let offset_placeholder = find_keyword_placeholder(&positions, "offset");
    let has_offset_clause = find_keyword(&positions, "offset", 0).is_some();

    if let Some((kw_idx, q_idx)) = limit_placeholder {
        let start = positions[kw_idx].byte;
        let end = positions[q_idx].byte + 1;
        replacements.push((start, end, format!("LIMIT {}", limit)));
        consumed_ordinals.push(placeholder_ordinal(&positions, positions[q_idx].byte));
    }

    if let Some((kw_idx, q_idx)) = offset_placeholder {
        let start = positions[kw_idx].byte;
        let end = positions[q_idx].byte + 1;
        replacements.push((start, end, format!("OFFSET {}", offset)));
        consumed_ordinals.push(placeholder_ordinal(&positions, positions[q_idx].byte));
    }

    // Apply replacements back to front so earlier spans stay valid.
    replacements.sort_by_key(|(start, _, _)| *start);
    let mut exec_sql = sql.to_string();
    for (start, end, text) in replacements.iter().rev() {
        exec_sql.replace_range(*start..*end, text);
    }

    if !has_limit_clause {
        exec_sql.push_str(&format!(" LIMIT {}", limit));
    }
    if !has_offset_clause {
        exec_sql.push_str(&format!(" OFFSET {}", offset));
    }

    // Remaining parameters, with consumed placeholders excluded at their
    // ordinal positions.
    consumed_ordinals.sort_unstable();
    let mut exec_params = params.to_vec();
    for ordinal in consumed_ordinals.iter().rev() {
        exec_params.remove(*ordinal);
    }

    // Count derivative: truncate at the first top-level LIMIT or OFFSET
    // keyword of the original statement.
    let limit_pos = find_keyword(&positions, "limit", 0).map(|i| positions[i].byte);
    let offset_pos = find_keyword(&positions, "offset", 0).map(|i| positions[i].byte);
    let cut = match (limit_pos, offset_pos) {
        (Some(l), Some(o)) => Some(l.min(o)),
        (Some(l), None) => Some(l),
        (None, Some(o)) => Some(o),
        (None, None) => None,
    };
    let stripped = match cut {
        Some(pos) => sql[..pos].trim_end(),
        None => sql,
    };

    let count_sql = if stripped.to_lowercase().starts_with("select count") {
        stripped.to_string()
    } else {
        format!("SELECT COUNT(*) AS total FROM ({}) AS count_query", stripped)
    };

    let count_params = exec_params.clone();

    Ok(Paginated {
        exec_sql,
        exec_params,
        count_sql,
        count_params,
    })
}

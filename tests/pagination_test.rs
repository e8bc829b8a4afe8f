//! Integration tests for pagination rewriting.
//!
//! These tests exercise the rewriter through its public API with the kind
//! of statements clients actually send, focusing on placeholder alignment
//! and count-query derivation.

use mysql_query_gateway::gateway::paginate;
use mysql_query_gateway::models::{Pagination, QueryParam};

#[test]
fn test_plain_select_gets_window_appended() {
    let p = paginate("SELECT * FROM orders", &[], 50, 100).unwrap();
    assert_eq!(p.exec_sql, "SELECT * FROM orders LIMIT 50 OFFSET 100");
    assert_eq!(
        p.count_sql,
        "SELECT COUNT(*) AS total FROM (SELECT * FROM orders) AS count_query"
    );
}

#[test]
fn test_filter_params_survive_placeholder_substitution() {
    let params = vec![
        QueryParam::String("shipped".into()),
        QueryParam::Int(30),
        QueryParam::Int(60),
    ];
    let p = paginate(
        "SELECT * FROM orders WHERE status = ? LIMIT ? OFFSET ?",
        &params,
        10,
        20,
    )
    .unwrap();
    assert_eq!(
        p.exec_sql,
        "SELECT * FROM orders WHERE status = ? LIMIT 10 OFFSET 20"
    );
    assert_eq!(p.exec_params, vec![QueryParam::String("shipped".into())]);
    assert_eq!(p.count_params, p.exec_params);
}

#[test]
fn test_count_result_invariant_to_window() {
    let a = paginate("SELECT * FROM t WHERE x = ?", &[QueryParam::Int(1)], 10, 0).unwrap();
    let b = paginate("SELECT * FROM t WHERE x = ?", &[QueryParam::Int(1)], 3, 50).unwrap();
    assert_eq!(a.count_sql, b.count_sql);
    assert_eq!(a.count_params, b.count_params);
}

#[test]
fn test_question_mark_inside_literal_is_not_a_placeholder() {
    let params = vec![QueryParam::Int(2)];
    let p = paginate(
        "SELECT * FROM faq WHERE question = 'why?' AND votes > ?",
        &params,
        10,
        0,
    )
    .unwrap();
    // The literal's ? is ignored; the single real placeholder stays bound.
    assert_eq!(p.exec_params, vec![QueryParam::Int(2)]);
    assert!(p.exec_sql.ends_with("LIMIT 10 OFFSET 0"));
}

#[test]
fn test_parameter_count_mismatch_is_rejected_upfront() {
    let err = paginate("SELECT * FROM t WHERE a = ? AND b = ?", &[], 10, 0).unwrap_err();
    assert!(err.to_string().contains("placeholders"));
}

#[test]
fn test_pagination_metadata_matches_window() {
    let p = Pagination::new(101, 25, 50);
    assert_eq!(p.total, 101);
    assert_eq!(p.page, 3);
    assert_eq!(p.total_pages, 5);

    let empty = Pagination::new(0, 25, 0);
    assert_eq!(empty.page, 1);
    assert_eq!(empty.total_pages, 0);
}

#[test]
fn test_rewriting_is_idempotent() {
    let first = paginate("SELECT id FROM t", &[], 7, 14).unwrap();
    let second = paginate(&first.exec_sql, &[], 7, 14).unwrap();
    assert_eq!(first.exec_sql, second.exec_sql);
    let lower = second.exec_sql.to_lowercase();
    assert_eq!(lower.matches("limit").count(), 1);
    assert_eq!(lower.matches("offset").count(), 1);
}

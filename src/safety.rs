//! Read-only guard for dashboard SQL.
//!
//! Every statement sent through the query runner is parsed with sqlparser's
//! MySQL dialect first. Only plain queries pass: data-modifying CTE bodies,
//! DDL and anything unparseable are rejected before a connection is opened.

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

use crate::error::{Result, TrackerError};

/// Returns `Ok(())` when `sql` contains only read-only queries.
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&MySqlDialect {}, sql)
        .map_err(|e| TrackerError::query(format!("SQL parse error: {e}")))?;

    if statements.is_empty() {
        return Err(TrackerError::query("Empty SQL statement"));
    }

    for statement in &statements {
        if !is_read_only_statement(statement) {
            return Err(TrackerError::query(format!(
                "Only read-only queries are allowed, got: {}",
                statement_keyword(statement)
            )));
        }
    }

    Ok(())
}

fn is_read_only_statement(statement: &Statement) -> bool {
    match statement {
        Statement::Query(query) => is_read_only_query(query),
        _ => false,
    }
}

fn is_read_only_query(query: &Query) -> bool {
    let ctes_ok = query
        .with
        .as_ref()
        .map_or(true, |with| with.cte_tables.iter().all(|cte| is_read_only_query(&cte.query)));

    ctes_ok && is_read_only_set_expr(&query.body)
}

fn is_read_only_set_expr(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(select) => is_read_only_select(select),
        SetExpr::Query(query) => is_read_only_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            is_read_only_set_expr(left) && is_read_only_set_expr(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        // INSERT/UPDATE/DELETE bodies
        _ => false,
    }
}

fn is_read_only_select(select: &Select) -> bool {
    select.from.iter().all(is_read_only_table_with_joins)
}

fn is_read_only_table_with_joins(twj: &TableWithJoins) -> bool {
    is_read_only_table_factor(&twj.relation)
        && twj
            .joins
            .iter()
            .all(|join| is_read_only_table_factor(&join.relation))
}

fn is_read_only_table_factor(factor: &TableFactor) -> bool {
    match factor {
        TableFactor::Derived { subquery, .. } => is_read_only_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => is_read_only_table_with_joins(table_with_joins),
        _ => true,
    }
}

/// First keyword of the statement, for the rejection message.
fn statement_keyword(statement: &Statement) -> String {
    let text = statement.to_string();
    let keyword = text.split_whitespace().next().unwrap_or("statement");
    keyword.to_uppercase()
}

//! Return path analysis for function bodies.
//!
//! Works on the syntax tree rather than the emitted code: a statement
//! "returns" when control cannot reach the point after it. Loops whose
//! condition is a non-zero literal (or absent, for `for`) only fall
//! through via a `break` aimed at them.

use stackc_ast::{Expr, LiteralKind, Stmt, SwitchStmt};

/// Whether executing `stmts` in order never falls off the end.
pub fn always_returns(stmts: &[Stmt<'_>]) -> bool {
    stmts.iter().any(stmt_returns)
}

fn stmt_returns(stmt: &Stmt<'_>) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(block) => always_returns(block.stmts),
        Stmt::If(if_stmt) => {
            if_stmt
                .else_branch
                .is_some_and(|else_branch| stmt_returns(if_stmt.then_branch) && stmt_returns(else_branch))
        }
        Stmt::While(while_stmt) => {
            is_always_true(while_stmt.condition) && !breaks_out(while_stmt.body)
        }
        Stmt::DoWhile(do_while) => {
            stmt_returns(do_while.body)
                || (is_always_true(do_while.condition) && !breaks_out(do_while.body))
        }
        Stmt::For(for_stmt) => {
            for_stmt.condition.is_none_or(is_always_true) && !breaks_out(for_stmt.body)
        }
        Stmt::Switch(switch) => switch_returns(switch),
        _ => false,
    }
}

/// A switch returns when it has a `default`, nothing breaks out of it, and
/// its last case returns: every entry point falls through to that case.
fn switch_returns(switch: &SwitchStmt<'_>) -> bool {
    let has_default = switch.cases.iter().any(|case| case.value.is_none());
    let breaks = switch
        .cases
        .iter()
        .any(|case| case.stmts.iter().any(breaks_out));
    has_default
        && !breaks
        && switch
            .cases
            .last()
            .is_some_and(|case| always_returns(case.stmts))
}

/// Whether `stmt` contains a `break` that targets the enclosing construct.
///
/// Nested loops and switches own the breaks inside them.
fn breaks_out(stmt: &Stmt<'_>) -> bool {
    match stmt {
        Stmt::Break(_) => true,
        Stmt::Block(block) => block.stmts.iter().any(breaks_out),
        Stmt::If(if_stmt) => {
            breaks_out(if_stmt.then_branch) || if_stmt.else_branch.is_some_and(breaks_out)
        }
        _ => false,
    }
}

fn is_always_true(expr: &Expr<'_>) -> bool {
    match expr {
        Expr::Literal(lit) => match lit.kind {
            LiteralKind::Int(value) => value != 0,
            LiteralKind::Char(value) => value != 0,
            _ => false,
        },
        _ => false,
    }
}

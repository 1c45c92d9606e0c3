// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AccountBalance, Budget, Rule, StoredTransaction, Transaction};
use crate::pipeline::categorize::{self, MISCELLANEOUS, UserRules, Vocabulary};
use crate::pipeline::signs::normalize_signs;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use directories::ProjectDirs;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Billfold", "billfold"));

/// Environment variable consulted when `--db` is not given.
pub const DB_ENV: &str = "BILLFOLD_DB";

pub fn db_path(override_path: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = override_path.map(str::trim).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(p);
        if let Some(parent) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(path);
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("billfold.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY,
        date TEXT NOT NULL,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        source TEXT NOT NULL,
        category TEXT,
        original_category TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS custom_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS rules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pattern TEXT NOT NULL,
        category TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL,
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        UNIQUE(month, category)
    );

    CREATE TABLE IF NOT EXISTS account_balances(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        balance TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

fn parse_stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, s))
}

/// Selection for [`load_transactions`]. Empty means everything, oldest first.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// `YYYY-MM`
    pub month: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub limit: Option<usize>,
    pub newest_first: bool,
}

/// Append a normalized batch. All rows land or none do; nothing is merged
/// with existing rows.
pub fn append_transactions(conn: &mut Connection, batch: &[Transaction]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO transactions(date, description, amount, source, category, original_category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for t in batch {
            stmt.execute(params![
                t.date.to_string(),
                t.description,
                t.amount.to_string(),
                t.source,
                t.category,
                t.original_category
            ])?;
        }
    }
    tx.commit()?;
    debug!("appended {} transaction(s)", batch.len());
    Ok(batch.len())
}

pub fn load_transactions(
    conn: &Connection,
    filter: &TransactionFilter,
) -> Result<Vec<StoredTransaction>> {
    let mut sql = String::from(
        "SELECT id, date, description, amount, source, category, original_category FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.clone());
    }
    if let Some(start) = filter.start {
        sql.push_str(" AND date>=?");
        params_vec.push(start.to_string());
    }
    if let Some(end) = filter.end {
        sql.push_str(" AND date<=?");
        params_vec.push(end.to_string());
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND category=?");
        params_vec.push(cat.clone());
    }
    if let Some(source) = &filter.source {
        sql.push_str(" AND source=?");
        params_vec.push(source.clone());
    }
    if filter.newest_first {
        sql.push_str(" ORDER BY date DESC, id DESC");
    } else {
        sql.push_str(" ORDER BY date, id");
    }
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut data = Vec::new();
    for row in rows {
        let (id, date, description, amount, source, category, original_category) = row?;
        data.push(StoredTransaction {
            id,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}' in transaction {}", date, id))?,
            description,
            amount: parse_stored_decimal(&amount, "amount")?,
            source,
            category,
            original_category,
        });
    }
    Ok(data)
}

fn load_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let row = conn
        .query_row(
            "SELECT date, description, amount, source, category, original_category FROM transactions WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, Option<String>>(4)?,
                    r.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;
    let Some((date, description, amount, source, category, original_category)) = row else {
        bail!("Transaction {} not found", id);
    };
    Ok(Transaction {
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' in transaction {}", date, id))?,
        description,
        amount: parse_stored_decimal(&amount, "amount")?,
        source,
        category,
        original_category,
    })
}

fn ensure_in_vocabulary(conn: &Connection, category: &str) -> Result<()> {
    let vocab = vocabulary(conn)?;
    if !vocab.contains(category) {
        bail!("Category '{}' not found", category);
    }
    Ok(())
}

fn write_category(conn: &Connection, id: i64, category: &str) -> Result<()> {
    let mut t = load_transaction(conn, id)?;
    t.category = Some(category.to_string());
    let t = normalize_signs(vec![t]).remove(0);
    conn.execute(
        "UPDATE transactions SET category=?1, amount=?2 WHERE id=?3",
        params![category, t.amount.to_string(), id],
    )?;
    Ok(())
}

/// Manual re-categorization. The amount's sign follows the new category.
pub fn update_transaction_category(conn: &Connection, id: i64, category: &str) -> Result<()> {
    let category = category.trim();
    ensure_in_vocabulary(conn, category)?;
    write_category(conn, id, category)
}

fn move_category(conn: &Connection, from: &str, to: &str) -> Result<usize> {
    ensure_in_vocabulary(conn, to)?;
    let ids: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT id FROM transactions WHERE category=?1")?;
        let rows = stmt.query_map(params![from], |r| r.get::<_, i64>(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    for id in &ids {
        write_category(conn, *id, to)?;
    }
    Ok(ids.len())
}

/// Move every transaction in `from` to `to`. Returns how many changed.
pub fn replace_category(conn: &mut Connection, from: &str, to: &str) -> Result<usize> {
    let tx = conn.transaction()?;
    let n = move_category(&tx, from.trim(), to.trim())?;
    tx.commit()?;
    Ok(n)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Transaction {} not found", id);
    }
    Ok(())
}

/// Renumber ids to `1..=n` in (date, id) order.
pub fn reindex_by_date(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
        CREATE TEMP TABLE id_map AS
            SELECT id AS old_id, ROW_NUMBER() OVER (ORDER BY date, id) AS new_id FROM transactions;
        UPDATE transactions SET id = -(SELECT new_id FROM id_map WHERE old_id = transactions.id);
        UPDATE transactions SET id = -id;
        DROP TABLE id_map;
        "#,
    )?;
    let n: i64 = tx.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))?;
    tx.commit()?;
    Ok(n as usize)
}

pub fn custom_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM custom_categories ORDER BY name")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn vocabulary(conn: &Connection) -> Result<Vocabulary> {
    Ok(Vocabulary::with_custom(&custom_categories(conn)?))
}

/// Standard and custom categories, de-duplicated and sorted.
pub fn load_categories(conn: &Connection) -> Result<Vec<String>> {
    Ok(categorize::load_categories(&custom_categories(conn)?))
}

pub fn add_custom_category(conn: &Connection, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Category name must not be empty");
    }
    if categorize::is_standard_category(name) {
        bail!("'{}' is already a standard category", name);
    }
    conn.execute("INSERT INTO custom_categories(name) VALUES (?1)", params![name])
        .with_context(|| format!("Category '{}' already exists", name))?;
    Ok(())
}

/// What [`delete_custom_category`] cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRemoval {
    /// Transactions moved to Miscellaneous.
    pub moved: usize,
    /// Rules that assigned the removed category.
    pub rules_removed: usize,
}

/// Remove a custom category in one SQL transaction: its transactions move to
/// Miscellaneous and the rules pointing at it are deleted.
pub fn delete_custom_category(conn: &mut Connection, name: &str) -> Result<CategoryRemoval> {
    let name = name.trim();
    if categorize::is_standard_category(name) {
        bail!("Standard category '{}' cannot be removed", name);
    }
    let tx = conn.transaction()?;
    let exists: Option<i64> = tx
        .query_row(
            "SELECT id FROM custom_categories WHERE name=?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_none() {
        bail!("Category '{}' not found", name);
    }
    let moved = move_category(&tx, name, MISCELLANEOUS)?;
    let rules_removed = tx.execute("DELETE FROM rules WHERE category=?1", params![name])?;
    tx.execute("DELETE FROM custom_categories WHERE name=?1", params![name])?;
    tx.commit()?;
    debug!(
        "removed category '{}': {} transaction(s) moved, {} rule(s) deleted",
        name, moved, rules_removed
    );
    Ok(CategoryRemoval {
        moved,
        rules_removed,
    })
}

pub fn add_rule(conn: &Connection, pattern: &str, category: &str) -> Result<i64> {
    let pattern = pattern.trim();
    let category = category.trim();
    Regex::new(pattern)
        .map_err(|err| anyhow::anyhow!("Invalid regex pattern '{}': {}", pattern, err))?;
    ensure_in_vocabulary(conn, category)?;
    conn.execute(
        "INSERT INTO rules(pattern, category) VALUES (?1, ?2)",
        params![pattern, category],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest first.
pub fn list_rules(conn: &Connection) -> Result<Vec<Rule>> {
    let mut stmt = conn.prepare("SELECT id, pattern, category FROM rules ORDER BY id DESC")?;
    let rows = stmt.query_map([], |r| {
        Ok(Rule {
            id: r.get(0)?,
            pattern: r.get(1)?,
            category: r.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<_>>()?)
}

pub fn delete_rule(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM rules WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Rule {} not found", id);
    }
    Ok(())
}

pub fn load_user_rules(conn: &Connection) -> Result<UserRules> {
    Ok(UserRules::compile(&list_rules(conn)?)?)
}

pub fn set_budget(conn: &Connection, month: &str, category: &str, amount: Decimal) -> Result<()> {
    let category = category.trim();
    ensure_in_vocabulary(conn, category)?;
    conn.execute(
        "INSERT INTO budgets(month, category, amount) VALUES (?1,?2,?3)
         ON CONFLICT(month, category) DO UPDATE SET amount=excluded.amount",
        params![month, category, amount.to_string()],
    )?;
    Ok(())
}

pub fn list_budgets(conn: &Connection, month: Option<&str>) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT month, category, amount FROM budgets
         WHERE ?1 IS NULL OR month=?1
         ORDER BY month DESC, category",
    )?;
    let rows = stmt.query_map(params![month], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (month, category, amount) = row?;
        data.push(Budget {
            month,
            category,
            amount: parse_stored_decimal(&amount, "budget")?,
        });
    }
    Ok(data)
}

pub fn set_account_balance(conn: &Connection, name: &str, balance: Decimal) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Account name must not be empty");
    }
    conn.execute(
        "INSERT INTO account_balances(name, balance, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(name) DO UPDATE SET balance=excluded.balance, updated_at=excluded.updated_at",
        params![name, balance.to_string()],
    )?;
    Ok(())
}

pub fn list_account_balances(conn: &Connection) -> Result<Vec<AccountBalance>> {
    let mut stmt =
        conn.prepare("SELECT name, balance, updated_at FROM account_balances ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (name, balance, updated_at) = row?;
        data.push(AccountBalance {
            name,
            balance: parse_stored_decimal(&balance, "balance")?,
            updated_at,
        });
    }
    Ok(data)
}

pub fn delete_account_balance(conn: &Connection, name: &str) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM account_balances WHERE name=?1",
        params![name.trim()],
    )?;
    if n == 0 {
        bail!("Account '{}' not found", name.trim());
    }
    Ok(())
}

pub fn total_balance(conn: &Connection) -> Result<Decimal> {
    Ok(list_account_balances(conn)?
        .iter()
        .map(|b| b.balance)
        .sum())
}

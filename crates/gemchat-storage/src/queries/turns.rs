// SPDX-FileCopyrightText: 2026 Gemchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statements for the `chat_log` turn table.
//!
//! Functions take a plain `rusqlite::Connection` so they can run inside
//! `tokio_rusqlite::Connection::call` closures.

use gemchat_core::Turn;
use rusqlite::{Connection, params};

use crate::database::SCHEMA;

/// Creates the table and its index if absent.
pub fn create_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}

/// Inserts one turn; the timestamp is assigned by SQLite.
pub fn insert_turn(
    conn: &Connection,
    username: &str,
    request: &str,
    response: &str,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO chat_log (username, request, response) VALUES (?1, ?2, ?3)",
        params![username, request, response],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Lists every turn in insertion order.
///
/// Timestamps have millisecond resolution, so `id` breaks ties.
pub fn list_turns(conn: &Connection) -> Result<Vec<Turn>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, username, request, response, timestamp
         FROM chat_log ORDER BY timestamp ASC, id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Turn {
            id: row.get(0)?,
            username: row.get(1)?,
            request: row.get(2)?,
            response: row.get(3)?,
            timestamp: row.get(4)?,
        })
    })?;
    rows.collect()
}

/// Deletes all turns for `username`, returning the number removed.
pub fn delete_turns_for_user(conn: &Connection, username: &str) -> Result<usize, rusqlite::Error> {
    conn.execute("DELETE FROM chat_log WHERE username = ?1", params![username])
}

/// Gives every turn in the store to `username`, returning the number changed.
pub fn reassign_turns(conn: &Connection, username: &str) -> Result<usize, rusqlite::Error> {
    conn.execute("UPDATE chat_log SET username = ?1", params![username])
}

/// Counts turns for `username`.
pub fn count_turns_for_user(conn: &Connection, username: &str) -> Result<i64, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM chat_log WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_table(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let conn = conn();
        let a = insert_turn(&conn, "alice", "hi", "hello").unwrap();
        let b = insert_turn(&conn, "alice", "again", "hello again").unwrap();
        assert!(b > a);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let conn = conn();
        for i in 0..5 {
            insert_turn(&conn, "alice", &format!("q{i}"), &format!("a{i}")).unwrap();
        }
        let turns = list_turns(&conn).unwrap();
        let requests: Vec<&str> = turns.iter().map(|t| t.request.as_str()).collect();
        assert_eq!(requests, vec!["q0", "q1", "q2", "q3", "q4"]);
    }

    #[test]
    fn timestamp_is_iso8601_utc() {
        let conn = conn();
        insert_turn(&conn, "alice", "hi", "hello").unwrap();
        let turn = list_turns(&conn).unwrap().remove(0);
        assert_eq!(turn.timestamp.len(), "2026-01-01T00:00:00.000Z".len());
        assert!(turn.timestamp.ends_with('Z'));
        assert_eq!(&turn.timestamp[10..11], "T");
    }

    #[test]
    fn delete_only_touches_named_user() {
        let conn = conn();
        insert_turn(&conn, "alice", "a", "b").unwrap();
        insert_turn(&conn, "bob", "c", "d").unwrap();
        insert_turn(&conn, "alice", "e", "f").unwrap();
        assert_eq!(delete_turns_for_user(&conn, "alice").unwrap(), 2);
        assert_eq!(count_turns_for_user(&conn, "alice").unwrap(), 0);
        assert_eq!(count_turns_for_user(&conn, "bob").unwrap(), 1);
    }

    #[test]
    fn reassign_moves_every_turn() {
        let conn = conn();
        insert_turn(&conn, "erin", "a", "b").unwrap();
        insert_turn(&conn, "erin", "c", "d").unwrap();
        assert_eq!(reassign_turns(&conn, "erin2").unwrap(), 2);
        assert_eq!(count_turns_for_user(&conn, "erin").unwrap(), 0);
        assert_eq!(count_turns_for_user(&conn, "erin2").unwrap(), 2);
    }

    #[test]
    fn list_without_table_errors() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(list_turns(&conn).is_err());
    }
}

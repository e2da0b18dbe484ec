//! SQL schema for the NamedTogether SQLite store.
//!
//! Executed once at connection startup. Each collection is one table keyed by
//! its document id; there are no foreign keys, because the documents only
//! reference each other by id and dangling references are tolerated on read.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id        TEXT PRIMARY KEY,
    email          TEXT NOT NULL,
    display_name   TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    couple_id      TEXT,
    invite_pending INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS couples (
    couple_id  TEXT PRIMARY KEY,
    first_id   TEXT NOT NULL,
    second_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,
    CHECK (first_id != second_id)
);

CREATE TABLE IF NOT EXISTS invites (
    invite_id     TEXT PRIMARY KEY,
    inviter_id    TEXT NOT NULL,
    invitee_email TEXT NOT NULL,   -- lower-cased
    status        TEXT NOT NULL,   -- 'pending' | 'accepted' | 'expired'
    created_at    TEXT NOT NULL,
    accepted_at   TEXT,
    couple_id     TEXT
);

-- Seeded once; never updated afterwards.
CREATE TABLE IF NOT EXISTS names (
    name_id TEXT PRIMARY KEY,
    name    TEXT NOT NULL,
    gender  TEXT NOT NULL,         -- 'male' | 'female' | 'neutral'
    origin  TEXT
);

-- vote_id is '<user_id>_<name_id>'; a re-vote overwrites the row.
CREATE TABLE IF NOT EXISTS votes (
    vote_id     TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    name_id     TEXT NOT NULL,
    decision    TEXT NOT NULL,     -- 'yes' | 'no'
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shortlists (
    couple_id     TEXT PRIMARY KEY,
    matched_names TEXT NOT NULL DEFAULT '[]'   -- JSON array of MatchedName
);

-- Credentials for LocalIdentity. Kept apart from `users`, which holds the
-- profile document the client reads.
CREATE TABLE IF NOT EXISTS accounts (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- lower-cased
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    display_name  TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS invites_email_status_idx ON invites(invitee_email, status);
CREATE INDEX IF NOT EXISTS votes_user_idx           ON votes(user_id);

PRAGMA user_version = 1;
";

//! Initial database migration.
//!
//! Creates the enums, tables, and indexes for the cooperative ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(UNITS_SQL).await?;
        db.execute_unprepared(OPENING_BALANCES_SQL).await?;
        db.execute_unprepared(TARIFFS_SQL).await?;
        db.execute_unprepared(INCOME_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(EXPENSE_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Business unit kinds
CREATE TYPE unit_kind AS ENUM (
    'sports_field',
    'campground',
    'kiosk',
    'water_utility',
    'other'
);

-- Ledger entry direction
CREATE TYPE entry_kind AS ENUM ('income', 'expense');
";

const UNITS_SQL: &str = r"
CREATE TABLE units (
    id UUID PRIMARY KEY,
    name VARCHAR(120) NOT NULL UNIQUE,
    kind unit_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const OPENING_BALANCES_SQL: &str = r"
CREATE TABLE opening_balances (
    id UUID PRIMARY KEY,
    unit_id UUID NOT NULL UNIQUE REFERENCES units(id) ON DELETE CASCADE,
    amount NUMERIC(19, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TARIFFS_SQL: &str = r"
CREATE TABLE tariffs (
    id UUID PRIMARY KEY,
    unit_id UUID NOT NULL REFERENCES units(id) ON DELETE CASCADE,
    category VARCHAR(120) NOT NULL,
    rate NUMERIC(19, 2) NOT NULL CHECK (rate > 0),
    unit_of_measure VARCHAR(50) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INCOME_TRANSACTIONS_SQL: &str = r"
CREATE TABLE income_transactions (
    id UUID PRIMARY KEY,
    unit_id UUID NOT NULL REFERENCES units(id) ON DELETE CASCADE,
    tenant VARCHAR(120) NOT NULL,
    category VARCHAR(120) NOT NULL,
    rate NUMERIC(19, 2) NOT NULL CHECK (rate > 0),
    quantity NUMERIC(19, 4) NOT NULL CHECK (quantity > 0),
    amount NUMERIC(19, 2) NOT NULL CHECK (amount > 0),
    note VARCHAR(500),
    occurred_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const EXPENSE_TRANSACTIONS_SQL: &str = r"
CREATE TABLE expense_transactions (
    id UUID PRIMARY KEY,
    unit_id UUID NOT NULL REFERENCES units(id) ON DELETE CASCADE,
    category VARCHAR(120) NOT NULL,
    description VARCHAR(500) NOT NULL,
    amount NUMERIC(19, 2) NOT NULL CHECK (amount > 0),
    occurred_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    unit_id UUID NOT NULL REFERENCES units(id) ON DELETE CASCADE,
    kind entry_kind NOT NULL,
    source_id UUID NOT NULL,
    balance_before NUMERIC(19, 2) NOT NULL,
    balance_after NUMERIC(19, 2) NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    -- Income must raise the balance, expense must lower it
    CONSTRAINT chk_entry_direction CHECK (
        (kind = 'income' AND balance_after >= balance_before) OR
        (kind = 'expense' AND balance_after <= balance_before)
    )
);
";

const INDEXES_SQL: &str = r"
-- Chain ordering per unit
CREATE INDEX idx_ledger_entries_unit_chain
    ON ledger_entries (unit_id, occurred_at, id);
CREATE UNIQUE INDEX idx_ledger_entries_source
    ON ledger_entries (source_id);

CREATE INDEX idx_income_unit_occurred
    ON income_transactions (unit_id, occurred_at);
CREATE INDEX idx_expense_unit_occurred
    ON expense_transactions (unit_id, occurred_at);

-- Current tariff lookup
CREATE INDEX idx_tariffs_unit_category
    ON tariffs (unit_id, category, created_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS expense_transactions CASCADE;
DROP TABLE IF EXISTS income_transactions CASCADE;
DROP TABLE IF EXISTS tariffs CASCADE;
DROP TABLE IF EXISTS opening_balances CASCADE;
DROP TABLE IF EXISTS units CASCADE;
DROP TYPE IF EXISTS entry_kind;
DROP TYPE IF EXISTS unit_kind;
";

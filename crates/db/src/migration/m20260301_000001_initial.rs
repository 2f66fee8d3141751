//! Initial schema: staff, customers, orders and their 1:1 records,
//! the approval audit trail and recharge history.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;

        // ============================================================
        // PART 3: ORDERS
        // ============================================================
        db.execute_unprepared(ORDERS_SQL).await?;

        // ============================================================
        // PART 4: AUDIT
        // ============================================================
        db.execute_unprepared(HISTORY_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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
CREATE TYPE order_status AS ENUM ('pending', 'confirmed', 'rejected', 'returned');
CREATE TYPE payment_method AS ENUM ('direct', 'balance');
CREATE TYPE payment_status AS ENUM ('pending', 'paid', 'failed', 'refunded');
CREATE TYPE approval_action AS ENUM ('approve', 'reject', 'status_change');
";

const MEMBERS_SQL: &str = r"
CREATE TABLE internal_members (
    id BIGSERIAL PRIMARY KEY,
    account VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    role VARCHAR(32) NOT NULL DEFAULT 'staff',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    phone VARCHAR(32),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE customer_financial_info (
    customer_id BIGINT PRIMARY KEY REFERENCES customers(id) ON DELETE CASCADE,
    total_real_charge NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_consumption NUMERIC(14, 2) NOT NULL DEFAULT 0,
    current_balance NUMERIC(14, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_non_negative CHECK (current_balance >= 0)
);

CREATE TABLE customer_preferences (
    customer_id BIGINT PRIMARY KEY REFERENCES customers(id) ON DELETE CASCADE,
    exclusive_discount_ratio INTEGER NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE customer_recharge_history (
    id BIGSERIAL PRIMARY KEY,
    customer_id BIGINT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
    real_amount NUMERIC(14, 2) NOT NULL,
    gift_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_amount NUMERIC(14, 2) NOT NULL,
    balance_after NUMERIC(14, 2) NOT NULL,
    payment_channel VARCHAR(32),
    transaction_ref VARCHAR(128),
    notes TEXT,
    operator_id BIGINT NOT NULL REFERENCES internal_members(id),
    recharged_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_recharge_positive CHECK (real_amount > 0 AND gift_amount >= 0)
);

CREATE INDEX idx_recharge_history_customer ON customer_recharge_history(customer_id, recharged_at DESC);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE order_categories (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id BIGSERIAL PRIMARY KEY,
    reporter_id BIGINT NOT NULL REFERENCES internal_members(id),
    customer_id BIGINT NOT NULL REFERENCES customers(id),
    order_category_id BIGINT NOT NULL REFERENCES order_categories(id),
    project_category VARCHAR(100) NOT NULL,
    start_time TIMESTAMPTZ NOT NULL,
    end_time TIMESTAMPTZ NOT NULL,
    duration_hours NUMERIC(8, 2) NOT NULL,
    service_additional_info TEXT,
    internal_notes TEXT,
    order_notes TEXT,
    report_time TIMESTAMPTZ NOT NULL DEFAULT now(),
    use_balance_payment BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_order_schedule CHECK (end_time > start_time),
    CONSTRAINT chk_order_duration CHECK (duration_hours > 0)
);

CREATE INDEX idx_orders_customer ON orders(customer_id);
CREATE INDEX idx_orders_reporter ON orders(reporter_id);
CREATE INDEX idx_orders_report_time ON orders(report_time DESC);

CREATE TABLE order_pricing (
    order_id BIGINT PRIMARY KEY REFERENCES orders(id) ON DELETE CASCADE,
    unit_price NUMERIC(12, 2) NOT NULL,
    total_price NUMERIC(14, 2) NOT NULL,
    discount_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    final_price NUMERIC(14, 2) NOT NULL,
    exclusive_discount BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_pricing_final CHECK (final_price = total_price - discount_amount)
);

CREATE TABLE order_workflow (
    order_id BIGINT PRIMARY KEY REFERENCES orders(id) ON DELETE CASCADE,
    status order_status NOT NULL DEFAULT 'pending',
    approver_id BIGINT REFERENCES internal_members(id),
    approval_time TIMESTAMPTZ,
    rejection_reason TEXT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_order_workflow_status ON order_workflow(status);
CREATE INDEX idx_order_workflow_approval_time ON order_workflow(approval_time DESC);

CREATE TABLE order_payment_info (
    order_id BIGINT PRIMARY KEY REFERENCES orders(id) ON DELETE CASCADE,
    payment_amount NUMERIC(14, 2) NOT NULL,
    payment_method payment_method,
    payment_status payment_status NOT NULL DEFAULT 'pending',
    payment_time TIMESTAMPTZ,
    transaction_id VARCHAR(128),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const HISTORY_SQL: &str = r"
CREATE TABLE order_approval_history (
    id BIGSERIAL PRIMARY KEY,
    order_id BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    operator_id BIGINT NOT NULL REFERENCES internal_members(id),
    operator_name VARCHAR(100) NOT NULL,
    action approval_action NOT NULL,
    from_status order_status NOT NULL,
    to_status order_status NOT NULL,
    reason TEXT,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_approval_history_order ON order_approval_history(order_id, created_at DESC);
CREATE INDEX idx_approval_history_operator ON order_approval_history(operator_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_history_modification
-- The approval trail is append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_history_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Approval history is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_approval_history_immutable
BEFORE UPDATE ON order_approval_history
FOR EACH ROW
EXECUTE FUNCTION prevent_history_modification();

-- ============================================================
-- FUNCTION: touch_updated_at
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_orders_updated_at BEFORE UPDATE ON orders
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_order_pricing_updated_at BEFORE UPDATE ON order_pricing
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_order_workflow_updated_at BEFORE UPDATE ON order_workflow
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_order_payment_info_updated_at BEFORE UPDATE ON order_payment_info
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
CREATE TRIGGER trg_customer_financial_info_updated_at BEFORE UPDATE ON customer_financial_info
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS order_approval_history CASCADE;
DROP TABLE IF EXISTS order_payment_info CASCADE;
DROP TABLE IF EXISTS order_workflow CASCADE;
DROP TABLE IF EXISTS order_pricing CASCADE;
DROP TABLE IF EXISTS orders CASCADE;
DROP TABLE IF EXISTS order_categories CASCADE;
DROP TABLE IF EXISTS customer_recharge_history CASCADE;
DROP TABLE IF EXISTS customer_preferences CASCADE;
DROP TABLE IF EXISTS customer_financial_info CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS internal_members CASCADE;
DROP FUNCTION IF EXISTS prevent_history_modification() CASCADE;
DROP FUNCTION IF EXISTS touch_updated_at() CASCADE;
DROP TYPE IF EXISTS approval_action;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS order_status;
";

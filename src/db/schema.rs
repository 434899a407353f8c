use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS pack_sizes (
  size BIGINT PRIMARY KEY,
  created_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS orders (
  order_id TEXT PRIMARY KEY,
  amount BIGINT NOT NULL,
  total_items BIGINT NOT NULL,
  total_packs BIGINT NOT NULL,
  packs_json TEXT NOT NULL,
  cache_hit BOOLEAN NOT NULL,
  created_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_orders_created_ms ON orders(created_ms);"#)
        .execute(pool)
        .await?;

    Ok(())
}

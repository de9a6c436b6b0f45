//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::entities::{
    Link, LinkSummary, LinkWithStyle, NewLink, NewTransition, QrStyle, Transition,
};
use crate::domain::repositories::{LinkStore, LinkStoreTx};
use crate::error::AppError;

/// PostgreSQL store for links, QR styles, and transitions.
///
/// Uses bound parameters throughout for SQL injection protection. Multi-step
/// writes run inside [`PgLinkStoreTx`]; the hash unique constraint on `links`
/// is the backstop for allocation races and surfaces as
/// [`AppError::Conflict`].
pub struct PgLinkStore {
    pool: PgPool,
}

impl PgLinkStore {
    /// Creates a new store over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_link(row: &PgRow) -> Result<Link, AppError> {
    Ok(Link::new(
        row.try_get("id")?,
        row.try_get("user_id")?,
        row.try_get("original_url")?,
        row.try_get("hash")?,
        row.try_get("name")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
    ))
}

fn map_summary(row: &PgRow) -> Result<LinkSummary, AppError> {
    Ok(LinkSummary {
        id: row.try_get("id")?,
        original_url: row.try_get("original_url")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        transitions: row.try_get("transitions")?,
    })
}

fn map_transition(row: &PgRow) -> Result<Transition, AppError> {
    Ok(Transition {
        id: row.try_get("id")?,
        link_id: row.try_get("link_id")?,
        country: row.try_get("country")?,
        city: row.try_get("city")?,
        referer: row.try_get("referer")?,
        user_agent: row.try_get("user_agent")?,
        browser: row.try_get("browser")?,
        os: row.try_get("os")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn begin(&self) -> Result<Box<dyn LinkStoreTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLinkStoreTx { tx: Some(tx) }))
    }

    async fn get_link_by_hash(&self, hash: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, original_url, hash, name, created_at, updated_at
            FROM links
            WHERE hash = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_link).transpose()
    }

    async fn get_link_with_style(
        &self,
        link_id: i64,
        user_id: i64,
    ) -> Result<Option<LinkWithStyle>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT l.id, l.original_url, l.hash, l.name, l.created_at, l.updated_at,
                   q.color, q.background, q.smoothing
            FROM links l
            JOIN qr_codes q ON q.link_id = l.id
            WHERE l.id = $1 AND l.user_id = $2
            "#,
        )
        .bind(link_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(LinkWithStyle {
                id: r.try_get("id")?,
                original_url: r.try_get("original_url")?,
                hash: r.try_get("hash")?,
                name: r.try_get("name")?,
                created_at: r.try_get("created_at")?,
                updated_at: r.try_get("updated_at")?,
                style: QrStyle::new(
                    r.try_get("id")?,
                    r.try_get("color")?,
                    r.try_get("background")?,
                    r.try_get("smoothing")?,
                ),
            })
        })
        .transpose()
    }

    async fn get_links_by_user(&self, user_id: i64) -> Result<Vec<LinkSummary>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.original_url, l.name, l.created_at,
                   COUNT(t.id) AS transitions
            FROM links l
            LEFT JOIN transitions t ON t.link_id = l.id
            WHERE l.user_id = $1
            GROUP BY l.id, l.original_url, l.name, l.created_at
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_summary).collect()
    }

    async fn search_links_by_name(
        &self,
        user_id: i64,
        query: &str,
    ) -> Result<Vec<LinkSummary>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.original_url, l.name, l.created_at,
                   COUNT(t.id) AS transitions
            FROM links l
            LEFT JOIN transitions t ON t.link_id = l.id
            WHERE l.user_id = $1 AND l.name ILIKE '%' || $2 || '%'
            GROUP BY l.id, l.original_url, l.name, l.created_at
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_summary).collect()
    }

    async fn create_transition(&self, transition: NewTransition) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO transitions (link_id, country, city, referer, user_agent, browser, os)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(transition.link_id)
        .bind(transition.country)
        .bind(transition.city)
        .bind(transition.referer)
        .bind(transition.user_agent)
        .bind(transition.browser)
        .bind(transition.os)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_transitions_by_link(
        &self,
        link_id: i64,
        user_id: i64,
    ) -> Result<Vec<Transition>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.link_id, t.country, t.city, t.referer, t.user_agent,
                   t.browser, t.os, t.created_at
            FROM transitions t
            JOIN links l ON l.id = t.link_id
            WHERE t.link_id = $1 AND l.user_id = $2
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(link_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_transition).collect()
    }
}

/// One open PostgreSQL transaction.
///
/// Dropping the handle without committing rolls the transaction back, which
/// is what guarantees "no partial state" for multi-step writes.
pub struct PgLinkStoreTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgLinkStoreTx {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction already consumed", json!({})))
    }
}

#[async_trait]
impl LinkStoreTx for PgLinkStoreTx {
    async fn hash_exists(&mut self, hash: &str) -> Result<bool, AppError> {
        let tx = self.tx()?;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM links WHERE hash = $1)",
        )
        .bind(hash)
        .fetch_one(&mut **tx)
        .await?;

        Ok(exists)
    }

    async fn insert_link(&mut self, link: NewLink) -> Result<Link, AppError> {
        let tx = self.tx()?;
        let row = sqlx::query(
            r#"
            INSERT INTO links (user_id, original_url, hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, original_url, hash, name, created_at, updated_at
            "#,
        )
        .bind(link.user_id)
        .bind(link.original_url)
        .bind(link.hash)
        .bind(link.name)
        .fetch_one(&mut **tx)
        .await?;

        map_link(&row)
    }

    async fn insert_qr_style(&mut self, style: QrStyle) -> Result<(), AppError> {
        let tx = self.tx()?;
        sqlx::query(
            r#"
            INSERT INTO qr_codes (link_id, color, background, smoothing)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(style.link_id)
        .bind(style.color)
        .bind(style.background)
        .bind(style.smoothing)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn update_link_url(
        &mut self,
        link_id: i64,
        user_id: i64,
        original_url: &str,
    ) -> Result<u64, AppError> {
        let tx = self.tx()?;
        let result = sqlx::query(
            r#"
            UPDATE links
            SET original_url = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(original_url)
        .bind(link_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn update_qr_style(&mut self, style: QrStyle) -> Result<(), AppError> {
        let tx = self.tx()?;
        sqlx::query(
            r#"
            UPDATE qr_codes
            SET color = $2, background = $3, smoothing = $4
            WHERE link_id = $1
            "#,
        )
        .bind(style.link_id)
        .bind(style.color)
        .bind(style.background)
        .bind(style.smoothing)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn link_owned_by(&mut self, link_id: i64, user_id: i64) -> Result<bool, AppError> {
        let tx = self.tx()?;
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM links WHERE id = $1 AND user_id = $2)",
        )
        .bind(link_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(exists)
    }

    async fn delete_transitions(&mut self, link_id: i64) -> Result<(), AppError> {
        let tx = self.tx()?;
        sqlx::query("DELETE FROM transitions WHERE link_id = $1")
            .bind(link_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn delete_qr_style(&mut self, link_id: i64) -> Result<(), AppError> {
        let tx = self.tx()?;
        sqlx::query("DELETE FROM qr_codes WHERE link_id = $1")
            .bind(link_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn delete_link(&mut self, link_id: i64, user_id: i64) -> Result<u64, AppError> {
        let tx = self.tx()?;
        let result = sqlx::query("DELETE FROM links WHERE id = $1 AND user_id = $2")
            .bind(link_id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed", json!({})))?;
        tx.commit().await?;
        Ok(())
    }
}

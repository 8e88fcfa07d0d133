use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tierlens_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

const TABLE_SELECT: &str = r#"
    select
      t.id as id,
      t.name as name,
      t.description as description,
      l.name as layer,
      l.display_order as layer_rank
    from tables t
    join layers l on l.id = t.layer_id
"#;

const RELATIONSHIP_SELECT: &str = r#"
    select
      r.id as id,
      r.relationship_type as kind,
      r.description as description,
      r.confidence_score as confidence,
      s.id as source_id,
      s.name as source_name,
      s.description as source_description,
      sl.name as source_layer,
      sl.display_order as source_rank,
      g.id as target_id,
      g.name as target_name,
      g.description as target_description,
      gl.name as target_layer,
      gl.display_order as target_rank
    from table_relationships r
    join tables s on s.id = r.source_table_id
    join layers sl on sl.id = s.layer_id
    join tables g on g.id = r.target_table_id
    join layers gl on gl.id = g.layer_id
"#;

const TRANSFORMATION_SELECT: &str = r#"
    select
      x.id as id,
      x.name as name,
      x.description as description,
      x.transformation_type as kind,
      x.script as script,
      x.status as status,
      x.created_at as created_at,
      s.id as source_id,
      s.name as source_name,
      s.description as source_description,
      sl.name as source_layer,
      sl.display_order as source_rank,
      g.id as target_id,
      g.name as target_name,
      g.description as target_description,
      gl.name as target_layer,
      gl.display_order as target_rank
    from transformations x
    join tables s on s.id = x.source_table_id
    join layers sl on sl.id = s.layer_id
    join tables g on g.id = x.target_table_id
    join layers gl on gl.id = g.layer_id
"#;

#[derive(sqlx::FromRow)]
pub struct RawLayer {
    pub id: i64,
    pub name: String,
    pub display_order: i32,
    pub description: Option<String>,
}

#[derive(sqlx::FromRow)]
pub struct RawTable {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub layer: String,
    pub layer_rank: i32,
}

#[derive(sqlx::FromRow)]
pub struct RawColumn {
    pub id: i64,
    pub table_id: i64,
    pub name: String,
    pub data_type: String,
    pub is_key: bool,
    pub is_nullable: bool,
}

#[derive(sqlx::FromRow)]
pub struct RawColumnMatch {
    pub id: i64,
    pub table_id: i64,
    pub name: String,
    pub data_type: String,
    pub is_key: bool,
    pub is_nullable: bool,
    pub table_name: String,
    pub layer: String,
}

/// Source and target endpoint columns shared by both edge queries.
#[derive(sqlx::FromRow)]
pub struct RawEndpoints {
    pub source_id: i64,
    pub source_name: String,
    pub source_description: Option<String>,
    pub source_layer: String,
    pub source_rank: i32,
    pub target_id: i64,
    pub target_name: String,
    pub target_description: Option<String>,
    pub target_layer: String,
    pub target_rank: i32,
}

#[derive(sqlx::FromRow)]
pub struct RawRelationship {
    pub id: i64,
    pub kind: String,
    pub description: Option<String>,
    pub confidence: f64,
    #[sqlx(flatten)]
    pub endpoints: RawEndpoints,
}

#[derive(sqlx::FromRow)]
pub struct RawTransformation {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub script: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub endpoints: RawEndpoints,
}

/// Wrap a user pattern for `ilike`, escaping the wildcard characters.
pub fn like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub async fn list_layers(pool: &PgPool) -> Result<Vec<RawLayer>> {
    sqlx::query_as::<_, RawLayer>(
        r#"
        select id, name, display_order, description
        from layers
        order by display_order, name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn list_tables(pool: &PgPool, layer: Option<&str>) -> Result<Vec<RawTable>> {
    let sql = format!(
        "{TABLE_SELECT} where ($1::text is null or lower(l.name) = lower($1)) \
         order by l.display_order, t.name, t.id"
    );
    sqlx::query_as::<_, RawTable>(&sql)
        .bind(layer)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

pub async fn find_table(pool: &PgPool, name: &str, layer: &str) -> Result<Option<RawTable>> {
    let sql = format!("{TABLE_SELECT} where t.name = $1 and lower(l.name) = lower($2)");
    sqlx::query_as::<_, RawTable>(&sql)
        .bind(name)
        .bind(layer)
        .fetch_optional(pool)
        .await
        .map_err(db_error)
}

pub async fn find_tables_named(pool: &PgPool, name: &str) -> Result<Vec<RawTable>> {
    let sql = format!("{TABLE_SELECT} where t.name = $1 order by l.display_order, t.id");
    sqlx::query_as::<_, RawTable>(&sql)
        .bind(name)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

pub async fn table_by_id(pool: &PgPool, id: i64) -> Result<Option<RawTable>> {
    let sql = format!("{TABLE_SELECT} where t.id = $1");
    sqlx::query_as::<_, RawTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error)
}

pub async fn list_columns(pool: &PgPool, table_id: i64) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select id, table_id, name, data_type, is_key, is_nullable
        from columns
        where table_id = $1
        order by id
        "#,
    )
    .bind(table_id)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn count_columns(pool: &PgPool, table_id: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("select count(*) from columns where table_id = $1")
        .bind(table_id)
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

fn side_column(outgoing: bool, alias: &str) -> String {
    if outgoing {
        format!("{alias}.source_table_id")
    } else {
        format!("{alias}.target_table_id")
    }
}

pub async fn relationships(
    pool: &PgPool,
    table_ids: &[i64],
    outgoing: bool,
) -> Result<Vec<RawRelationship>> {
    let sql = format!(
        "{RELATIONSHIP_SELECT} where {} = any($1) order by r.id",
        side_column(outgoing, "r")
    );
    sqlx::query_as::<_, RawRelationship>(&sql)
        .bind(table_ids)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

pub async fn transformations(
    pool: &PgPool,
    table_ids: &[i64],
    outgoing: bool,
) -> Result<Vec<RawTransformation>> {
    let sql = format!(
        "{TRANSFORMATION_SELECT} where {} = any($1) order by x.id",
        side_column(outgoing, "x")
    );
    sqlx::query_as::<_, RawTransformation>(&sql)
        .bind(table_ids)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

pub async fn transformations_between(
    pool: &PgPool,
    source_layer: Option<&str>,
    target_layer: Option<&str>,
) -> Result<Vec<RawTransformation>> {
    let sql = format!(
        "{TRANSFORMATION_SELECT} \
         where ($1::text is null or lower(sl.name) = lower($1)) \
           and ($2::text is null or lower(gl.name) = lower($2)) \
         order by x.created_at desc, x.id"
    );
    sqlx::query_as::<_, RawTransformation>(&sql)
        .bind(source_layer)
        .bind(target_layer)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

pub async fn search_tables(pool: &PgPool, pattern: &str, limit: i64) -> Result<Vec<RawTable>> {
    let sql = format!(
        "{TABLE_SELECT} where t.name ilike $1 or t.description ilike $1 \
         order by l.display_order, t.name, t.id limit $2"
    );
    sqlx::query_as::<_, RawTable>(&sql)
        .bind(like_pattern(pattern))
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

pub async fn search_columns(
    pool: &PgPool,
    pattern: &str,
    limit: i64,
) -> Result<Vec<RawColumnMatch>> {
    sqlx::query_as::<_, RawColumnMatch>(
        r#"
        select
          c.id, c.table_id, c.name, c.data_type, c.is_key, c.is_nullable,
          t.name as table_name,
          l.name as layer
        from columns c
        join tables t on t.id = c.table_id
        join layers l on l.id = t.layer_id
        where c.name ilike $1 or c.data_type ilike $1
        order by c.id
        limit $2
        "#,
    )
    .bind(like_pattern(pattern))
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn search_transformations(
    pool: &PgPool,
    pattern: &str,
    limit: i64,
) -> Result<Vec<RawTransformation>> {
    let sql = format!(
        "{TRANSFORMATION_SELECT} \
         where x.name ilike $1 or x.description ilike $1 or x.transformation_type ilike $1 \
         order by x.created_at desc, x.id limit $2"
    );
    sqlx::query_as::<_, RawTransformation>(&sql)
        .bind(like_pattern(pattern))
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

use sqlx::PgPool;

/// Pool-backed executor for the query structs in [`crate::entities`].
///
/// Every query is a plain struct with a `Processor<Query>` impl on this
/// type, so call sites read as `processor.process(GetPlayerById { .. })`.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

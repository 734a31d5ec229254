// Repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` and a `&mut Transaction`.

pub mod vocabulary;

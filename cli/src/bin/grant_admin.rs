use std::env;

use riziq_cli::{init_tracing, Config};
use riziq_store::db::init_pool;
use riziq_store::SqliteDirectory;
use riziq_types::Fields;
use serde_json::Value;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load()?;
    let email = env::args().nth(1).unwrap_or_else(|| config.admin_email.clone());

    let pool = init_pool(&config.database_url).await?;
    let directory = SqliteDirectory::new(pool);
    let user = directory.get_user_by_email(&email).await?;

    let mut claims = Fields::new();
    claims.insert("admin".to_string(), Value::Bool(true));
    directory.set_custom_claims(&user.uid, &claims).await?;

    println!("Granted admin to {} ({})", user.email, user.uid);
    Ok(())
}

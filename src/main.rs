use recipe_api::{api, app, db, users, AppState};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Creates a staff + superuser account; there is no HTTP endpoint for
/// this on purpose.
fn create_superuser_and_exit(email: &str, password: &str) -> ExitCode {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&database_url);
    let mut conn = pool.get().expect("Failed to get DB connection");

    match users::create_superuser(&mut conn, email, password) {
        Ok(user) => {
            println!("Created superuser {} ({})", user.email, user.id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to create superuser: {e}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    // Dump the OpenAPI spec and exit
    if args.iter().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json().unwrap();
        println!("{}", spec);
        return ExitCode::SUCCESS;
    }

    if let Some(pos) = args.iter().position(|arg| arg == "--create-superuser") {
        match (args.get(pos + 1), args.get(pos + 2)) {
            (Some(email), Some(password)) => {
                return create_superuser_and_exit(email, password);
            }
            _ => {
                eprintln!("Usage: recipe-api --create-superuser <email> <password>");
                return ExitCode::FAILURE;
            }
        }
    }

    init_telemetry();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool: AppState = Arc::new(db::create_pool(&database_url));

    let app = app(pool);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at http://localhost:3000/swagger-ui/");
    tracing::info!("OpenAPI spec available at http://localhost:3000/api-docs/openapi.json");

    axum::serve(listener, app).await.unwrap();

    ExitCode::SUCCESS
}

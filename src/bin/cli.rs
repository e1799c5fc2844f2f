use clap::{Parser, Subcommand};
use cohortly::cli::seeder::{self, SeedConfig};
use cohortly::utils::password::hash_password;
use dialoguer::Password;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "cohortly-cli")]
#[command(about = "Cohortly CLI - Administrative tools for Cohortly", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with fake courses, batches, teachers and students
    Seed {
        /// Number of courses to create
        #[arg(short = 'c', long, default_value = "3")]
        courses: usize,

        /// Number of modules per course
        #[arg(long, default_value = "4")]
        modules: usize,

        /// Number of lessons per module
        #[arg(long, default_value = "3")]
        lessons: usize,

        /// Number of batches per course
        #[arg(long, default_value = "2")]
        batches: usize,

        /// Number of teachers
        #[arg(long, default_value = "5")]
        teachers: usize,

        /// Number of students
        #[arg(long, default_value = "40")]
        students: usize,
    },
    /// Clear all seeded data
    ClearSeed,
    /// Generate a bcrypt hash for SUPERADMIN_PASSWORD_HASH
    HashPassword {
        /// Password (prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            courses,
            modules,
            lessons,
            batches,
            teachers,
            students,
        } => {
            let pool = connect().await;
            let config = SeedConfig {
                courses,
                modules_per_course: modules,
                lessons_per_module: lessons,
                batches_per_course: batches,
                teachers,
                students,
            };

            if let Err(e) = seeder::seed_all(&pool, config).await {
                eprintln!("❌ Error seeding database: {}", e);
                std::process::exit(1);
            }
        }
        Commands::ClearSeed => {
            let pool = connect().await;
            if let Err(e) = seeder::clear_all(&pool).await {
                eprintln!("❌ Error clearing seeded data: {}", e);
                std::process::exit(1);
            }
        }
        Commands::HashPassword { password } => {
            let password = password.unwrap_or_else(|| {
                Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()
                    .expect("Failed to read password")
            });

            match hash_password(&password) {
                Ok(hash) => {
                    println!("SUPERADMIN_PASSWORD_HASH={}", hash);
                }
                Err(e) => {
                    eprintln!("❌ Error hashing password: {}", e.error);
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn connect() -> sqlx::postgres::PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

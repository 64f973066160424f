use clap::Parser;
use std::env;

use crate::types::pagination::QUESTIONS_PER_PAGE;

/// Trivia web service API
#[derive(Parser, Debug, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    /// Which errors we want to log (info, warn or error)
    #[clap(short, long, default_value = "warn")]
    pub log_level: String,
    /// Which PORT the server is listening to
    #[clap(short, long, default_value = "8080")]
    pub port: u16,
    /// Database user
    #[clap(long, default_value = "postgres")]
    pub db_user: String,
    /// Database password
    #[clap(long, default_value = "postgres")]
    pub db_password: String,
    /// URL for the postgres database
    #[clap(long, default_value = "localhost")]
    pub db_host: String,
    /// PORT number for the database connection
    #[clap(long, default_value = "5432")]
    pub db_port: u16,
    /// Database name
    #[clap(long, default_value = "trivia")]
    pub db_name: String,
    /// How many questions a listing page holds
    #[clap(long, default_value_t = QUESTIONS_PER_PAGE)]
    pub questions_per_page: usize,
    /// Serve from a seeded in-memory question bank instead of postgres
    #[clap(long)]
    pub in_memory: bool,
}

impl Config {
    pub fn new() -> Result<Config, handle_errors::Error> {
        Config::parse().with_env_overrides()
    }

    /// Environment variables win over command line flags.
    pub fn with_env_overrides(self) -> Result<Config, handle_errors::Error> {
        let port = env::var("PORT")
            .ok()
            .map(|val| val.parse::<u16>())
            .unwrap_or(Ok(self.port))
            .map_err(handle_errors::Error::ParseError)?;

        let db_user = env::var("POSTGRES_USER").unwrap_or(self.db_user);
        let db_password = env::var("POSTGRES_PASSWORD").unwrap_or(self.db_password);
        let db_host = env::var("POSTGRES_HOST").unwrap_or(self.db_host);
        let db_port = env::var("POSTGRES_PORT").unwrap_or(self.db_port.to_string());
        let db_name = env::var("POSTGRES_DB").unwrap_or(self.db_name);
        let questions_per_page = env::var("QUESTIONS_PER_PAGE")
            .ok()
            .map(|val| val.parse::<usize>())
            .unwrap_or(Ok(self.questions_per_page))
            .map_err(handle_errors::Error::ParseError)?;

        if questions_per_page == 0 {
            return Err(handle_errors::Error::InvalidRequest(
                "questions per page must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            log_level: self.log_level,
            port,
            db_user,
            db_password,
            db_host,
            db_port: db_port
                .parse::<u16>()
                .map_err(handle_errors::Error::ParseError)?,
            db_name,
            questions_per_page,
            in_memory: self.in_memory,
        })
    }
}

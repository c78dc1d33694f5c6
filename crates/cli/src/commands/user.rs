//! User management commands.

use vieux_carre_auth::db::{PgUserRepository, RepositoryError, UserRepository, create_pool};
use vieux_carre_auth::models::NewUser;
use vieux_carre_auth::services::auth::{AuthError, hash_password, validate_password};
use vieux_carre_core::{Email, UserId, UserRole, display_name_from_email};

use super::{CliError, database_url};

/// Validated input for a new credential user.
#[derive(Debug)]
struct UserInput {
    email: Email,
    name: String,
    role: UserRole,
}

fn parse_input(email: &str, name: Option<&str>, role: &str) -> Result<UserInput, CliError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(AuthError::from)?;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| display_name_from_email(&email), str::to_owned);

    Ok(UserInput { email, name, role })
}

/// Create a credential user.
///
/// # Returns
///
/// The ID issued by the database.
///
/// # Errors
///
/// Returns `CliError` for invalid input, a taken email or database failures.
pub async fn create(
    email: &str,
    name: Option<&str>,
    password: &str,
    role: &str,
) -> Result<UserId, CliError> {
    let input = parse_input(email, name, role)?;
    validate_password(password)?;

    let pool = create_pool(&database_url()?).await?;
    let users = PgUserRepository::new(pool);

    tracing::info!("Creating user: {} ({})", input.email, input.role);

    let email = input.email.clone();
    let user = users
        .create(NewUser {
            name: input.name,
            email: input.email,
            password_hash: Some(hash_password(password)?),
            role: input.role,
            image: None,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CliError::UserExists(email.to_string()),
            other => CliError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id)
}

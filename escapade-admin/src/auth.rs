use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
};
use log::info;
use rand::rngs::OsRng;
use thiserror::Error;
use tokio::task::spawn_blocking;
use validator::Validate;

use crate::{
    validation::first_violation, DatabaseError, NewUser, Principal, Role, SharedDatabase,
};

/// Verified when the email is unknown, so both failures take as long
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
    AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

const REGISTRATION_FIELDS: [&str; 4] = ["name", "email", "password", "confirm_password"];

/// Checks credentials and creates accounts
pub struct Auth {
    db: SharedDatabase,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// A field of the registration is invalid
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    DuplicateUser,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Validate)]
pub struct Registration {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub confirm_password: String,
}

impl Auth {
    pub fn new(db: &SharedDatabase) -> Self {
        Self::with_params(db, Params::default())
    }

    /// Uses custom hashing costs, which lets tests hash quickly
    pub fn with_params(db: &SharedDatabase, params: Params) -> Self {
        Self {
            db: db.clone(),
            argon: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    /// Checks the credentials, returning the principal they belong to.
    ///
    /// An unknown email and a wrong password fail the same way.
    pub async fn login(&self, credentials: Credentials) -> Result<Principal, AuthError> {
        let email = normalize_email(&credentials.email);

        let user = match self.db.user_by_email(&email).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound { .. }) => {
                let _ = self
                    .verify_password(credentials.password, DUMMY_HASH.to_string())
                    .await;

                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Db(e)),
        };

        if !self
            .verify_password(credentials.password, user.password.clone())
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        info!("{} logged in", user.email);
        Ok(Principal::from(&user))
    }

    /// Creates an account. The very first account becomes the admin.
    pub async fn register(&self, registration: Registration) -> Result<Principal, AuthError> {
        let registration = Registration {
            name: registration.name.trim().to_string(),
            email: normalize_email(&registration.email),
            ..registration
        };

        registration
            .validate()
            .map_err(|e| AuthError::Validation(first_violation(&e, &REGISTRATION_FIELDS)))?;

        match self.db.user_by_email(&registration.email).await {
            Ok(_) => return Err(AuthError::DuplicateUser),
            Err(DatabaseError::NotFound { .. }) => {}
            Err(e) => return Err(AuthError::Db(e)),
        }

        let role = match self.db.user_count().await.map_err(AuthError::Db)? {
            0 => Role::Admin,
            _ => Role::User,
        };

        let password = self.hash_password(registration.password).await?;

        let user = self
            .db
            .create_user(NewUser {
                name: registration.name,
                email: registration.email,
                password,
                role,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict { .. } => AuthError::DuplicateUser,
                e => AuthError::Db(e),
            })?;

        info!("Registered {} as {}", user.email, user.role);
        Ok(Principal::from(&user))
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let argon = self.argon.clone();

        spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);

            argon
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::HashError(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::HashError(e.to_string()))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let argon = self.argon.clone();

        spawn_blocking(move || {
            let stored = PasswordHash::parse(&hash, Encoding::default())
                .map_err(|e| AuthError::HashError(e.to_string()))?;

            Ok(argon.verify_password(password.as_bytes(), &stored).is_ok())
        })
        .await
        .map_err(|e| AuthError::HashError(e.to_string()))?
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Database, MemoryDatabase};

    fn auth() -> (Auth, SharedDatabase) {
        let db: SharedDatabase = Arc::new(MemoryDatabase::new());
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();

        (Auth::with_params(&db, params), db)
    }

    fn registration(email: &str) -> Registration {
        Registration {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
        }
    }

    #[tokio::test]
    async fn first_user_is_admin() {
        let (auth, _) = auth();

        let first = auth.register(registration("a@example.com")).await.unwrap();
        let second = auth.register(registration("b@example.com")).await.unwrap();

        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::User);
    }

    #[tokio::test]
    async fn password_is_hashed() {
        let (auth, db) = auth();
        auth.register(registration("a@example.com")).await.unwrap();

        let stored = db.user_by_email("a@example.com").await.unwrap();

        assert_ne!(stored.password, "hunter22");
        assert!(stored.password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let (auth, db) = auth();

        let result = auth
            .register(Registration {
                confirm_password: "hunter23".to_string(),
                ..registration("a@example.com")
            })
            .await;

        assert!(matches!(result, Err(AuthError::Validation(ref m)) if m == "Passwords don't match"));
        assert_eq!(db.user_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn first_invalid_field_is_reported() {
        let (auth, _) = auth();

        let result = auth
            .register(Registration {
                name: "A".to_string(),
                email: "nope".to_string(),
                ..registration("")
            })
            .await;

        assert!(
            matches!(result, Err(AuthError::Validation(ref m)) if m == "Name must be at least 2 characters")
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (auth, db) = auth();

        let first = auth.register(registration("a@example.com")).await.unwrap();
        let result = auth
            .register(Registration {
                name: "Somebody Else".to_string(),
                ..registration("A@Example.com ")
            })
            .await;

        assert!(matches!(result, Err(AuthError::DuplicateUser)));

        let stored = db.user_by_email("a@example.com").await.unwrap();
        assert_eq!(stored.name, first.name);
        assert_eq!(db.user_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_returns_the_principal() {
        let (auth, _) = auth();
        let registered = auth.register(registration("a@example.com")).await.unwrap();

        let principal = auth
            .login(Credentials {
                email: "a@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(principal, registered);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (auth, _) = auth();
        auth.register(registration("a@example.com")).await.unwrap();

        let wrong_password = auth
            .login(Credentials {
                email: "a@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();

        let unknown_email = auth
            .login(Credentials {
                email: "nobody@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }
}

use crate::{
    auth::{
        generate_token, hash_password, verify_password, CurrentUser, LoginRequest,
        RegisterRequest, TokenResponse,
    },
    error::AppError,
    models::PublicUser,
    state::AppState,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user.
///
/// Normalizes and validates the payload, hashes the password, and stores
/// the user. Uniqueness is left to the store: a concurrent registration
/// with the same email loses on the database constraint, not on a
/// check-then-insert in here.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = register_data.into_inner().normalize();
    register_data.validate()?;

    log::info!("register attempt email={}", register_data.email);

    let password_hash = hash_password(&register_data.password, state.auth.bcrypt_cost)?;
    let user = state
        .users
        .create(&register_data.email, &password_hash)
        .await?;

    log::info!("user registered id={} email={}", user.id, user.email);

    Ok(HttpResponse::Created().json(PublicUser::from(user)))
}

/// Login with email and password.
///
/// Unknown email and wrong password deliberately share one outcome; the
/// response must not reveal which credential was wrong.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let login_data = login_data.into_inner().normalize();
    login_data.validate()?;

    log::info!("login attempt email={}", login_data.email);

    let user = match state.users.get_by_email(&login_data.email).await? {
        Some(user) => user,
        None => {
            log::warn!("login failed (invalid credentials)");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&login_data.password, &user.password_hash) {
        log::warn!("login failed (invalid credentials)");
        return Err(AppError::InvalidCredentials);
    }

    let token = generate_token(user.id, &state.auth)?;
    log::info!("login successful id={}", user.id);

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Return the authenticated caller's public profile.
#[get("/me")]
pub async fn me(user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(PublicUser::from(user.0)))
}
